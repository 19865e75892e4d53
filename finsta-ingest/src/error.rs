//! Errors raised while decoding a statement document.

use std::fmt;
use std::path::PathBuf;

/// Where in the document a field was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Header,
    /// Zero-based index of the movement record
    Movement(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Header => f.write_str("statement header"),
            Location::Movement(i) => write!(f, "movement #{}", i + 1),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("element '{0}' has not been found in the document")]
    MissingRoot(&'static str),

    #[error("malformed document at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("{location}: required field {field} is missing or empty")]
    MissingField {
        field: &'static str,
        location: Location,
    },

    #[error("{location}: field {field} value '{value}' is not a valid {expected}")]
    InvalidField {
        field: &'static str,
        value: String,
        expected: &'static str,
        location: Location,
    },

    #[error("{path}: {source}")]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    pub(crate) fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            // io errors already name the file
            e @ ParseError::Io { .. } => e,
            e => ParseError::InFile {
                path: path.into(),
                source: Box::new(e),
            },
        }
    }
}
