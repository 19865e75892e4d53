//! Bank-specific statement parsers.

pub mod finsta;
pub mod values;

pub use finsta::parse_finsta;
