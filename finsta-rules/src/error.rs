//! Errors for rule tables and category ordering.

use std::path::PathBuf;

/// Rule table or category list could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("rule row {row}: amount filter '{value}' is not an integer")]
    InvalidAmount { row: usize, value: String },

    #[error("category '{0}' appears more than once in the category list")]
    DuplicateCategory(String),
}

/// A category label is missing from the reference list.
///
/// Means the rule table assigns a category the category list does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("category '{label}' is not present in the category list")]
pub struct LookupError {
    pub label: String,
}
