//! finsta-core: statement, movement and category types shared by the pipeline

pub mod category;
pub mod row;
pub mod statement;

pub use category::Category;
pub use row::{MovementRow, DISPLAY_DATE_FORMAT, NO_DESCRIPTION};
pub use statement::{MessageFragments, Movement, Statement, MESSAGE_SLOTS};
