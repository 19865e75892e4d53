//! Flattened movement rows handed to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::{Category, Movement};

/// Date format used in rendered rows and the statement summary.
pub const DISPLAY_DATE_FORMAT: &str = "%d.%m %Y";

/// Text shown when a movement has neither identifier nor message.
pub const NO_DESCRIPTION: &str = "(no description)";

/// One rendered movement line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRow {
    pub date: String,
    pub account: String,
    pub description: String,
    pub amount: f64,
    /// Category label, empty when uncategorized
    pub category: String,
    /// Excluded from the sums; toggled by the user after rendering
    pub ignore: bool,
}

impl MovementRow {
    pub fn new(movement: &Movement, category: &Category) -> Self {
        Self {
            date: movement.date.format(DISPLAY_DATE_FORMAT).to_string(),
            account: movement.counter_account.clone(),
            description: movement.description().unwrap_or(NO_DESCRIPTION).to_string(),
            amount: movement.amount,
            category: category.label().to_string(),
            ignore: false,
        }
    }

    pub fn with_ignore(mut self, ignore: bool) -> Self {
        self.ignore = ignore;
        self
    }
}
