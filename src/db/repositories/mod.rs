pub mod comparison;
pub mod customer;
pub mod prompt;

/// Ranking applied to the shared browse lists.
///
/// `None` from [`SharedOrder::parse`] means an unrecognized value was sent
/// and the rows are returned in whatever order the database yields them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedOrder {
    /// Most recently created first.
    Latest,
    /// Highest `added_count` first.
    Added,
    /// Most favorites first.
    Fav,
}

impl SharedOrder {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "latest" => Some(Self::Latest),
            "added" => Some(Self::Added),
            "fav" => Some(Self::Fav),
            _ => None,
        }
    }
}
