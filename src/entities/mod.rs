pub mod prelude;

pub mod comparison_favs;
pub mod comparisons;
pub mod customers;
pub mod prompt_favs;
pub mod prompts;
