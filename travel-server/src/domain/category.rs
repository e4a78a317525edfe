//! Travel categories.

use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown travel category: {0}")]
pub struct InvalidCategory(String);

/// The kind of a travel leg.
///
/// Legs of different categories live in separate stores, so a leg id is
/// only unique within its category. Categories carry no behavior beyond
/// identification; every leg has the same shape regardless of kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Flight,
    Rail,
    Coach,
    Ferry,
}

impl Category {
    /// Every category, in a fixed order.
    pub const ALL: [Category; 4] = [
        Category::Flight,
        Category::Rail,
        Category::Coach,
        Category::Ferry,
    ];

    /// Returns the lower-case name of this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Flight => "flight",
            Category::Rail => "rail",
            Category::Coach => "coach",
            Category::Ferry => "ferry",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Category::Flight => 0,
            Category::Rail => 1,
            Category::Coach => 2,
            Category::Ferry => 3,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = InvalidCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flight" => Ok(Category::Flight),
            "rail" => Ok(Category::Rail),
            "coach" => Ok(Category::Coach),
            "ferry" => Ok(Category::Ferry),
            _ => Err(InvalidCategory(s.to_string())),
        }
    }
}
