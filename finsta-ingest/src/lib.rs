//! finsta-ingest: FINSTA03 statement decoding and multi-file consolidation.

pub mod encoding;
pub mod error;
pub mod parsers;

pub use error::{Location, ParseError};
pub use parsers::parse_finsta;

use finsta_core::Statement;
use std::path::Path;

/// Largest header/movement balance difference accepted without a warning.
const BALANCE_TOLERANCE: f64 = 0.005;

/// Parse a statement from raw file bytes, honoring the declared encoding.
pub fn parse_statement_bytes(bytes: &[u8]) -> Result<Statement, ParseError> {
    let text = encoding::decode_document(bytes);
    parse_finsta(&text)
}

/// Parse one statement file. Errors carry the file path.
pub fn parse_statement_file(path: impl AsRef<Path>) -> Result<Statement, ParseError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let statement = parse_statement_bytes(&bytes).map_err(|e| e.in_file(path))?;
    let drift = statement.derived_closing_balance() - statement.closing_balance();
    if drift.abs() > BALANCE_TOLERANCE {
        tracing::warn!(
            path = %path.display(),
            header = statement.closing_balance(),
            movements = statement.derived_closing_balance(),
            "movement totals do not match the statement header"
        );
    }
    tracing::debug!(
        path = %path.display(),
        movements = statement.movements.len(),
        "parsed statement"
    );
    Ok(statement)
}

/// Parse a primary statement plus supplementary ones.
///
/// Header fields come from the primary file. Movements are concatenated:
/// primary first, then each additional file in the given order.
pub fn load_statements<P: AsRef<Path>>(
    primary: impl AsRef<Path>,
    additional: &[P],
) -> Result<Statement, ParseError> {
    let mut statement = parse_statement_file(primary)?;
    for path in additional {
        statement.append(parse_statement_file(path)?);
    }
    Ok(statement)
}
