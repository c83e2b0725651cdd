pub use super::comparison_favs::Entity as ComparisonFavs;
pub use super::comparisons::Entity as Comparisons;
pub use super::customers::Entity as Customers;
pub use super::prompt_favs::Entity as PromptFavs;
pub use super::prompts::Entity as Prompts;
