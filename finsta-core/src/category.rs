//! Category labels assigned to movements.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A category assigned by the rule set.
///
/// Serialized as its label; `Uncategorized` is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// No rule matched
    #[default]
    Uncategorized,
    Named(String),
}

impl Category {
    /// Build from a label; the empty label is `Uncategorized`.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        if label.is_empty() {
            Category::Uncategorized
        } else {
            Category::Named(label)
        }
    }

    /// Label as written in the category list.
    pub fn label(&self) -> &str {
        match self {
            Category::Uncategorized => "",
            Category::Named(label) => label,
        }
    }

    pub fn is_uncategorized(&self) -> bool {
        matches!(self, Category::Uncategorized)
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Category::new(label)
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Category::new(label)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Uncategorized => String::new(),
            Category::Named(label) => label,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
