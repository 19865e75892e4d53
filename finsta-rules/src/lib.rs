//! finsta-rules: category rules, rule tables, category ordering and the
//! categorization engine.

pub mod engine;
pub mod error;
pub mod ordering;
pub mod rule;
pub mod table;

pub use engine::{categorize, CategoryGroup, RuleSet};
pub use error::{ConfigurationError, LookupError};
pub use ordering::CategoryOrder;
pub use rule::{MessageClause, MessageMatcher, Rule};
