//! Character-set handling for statement files.
//!
//! Statements are usually exported as `windows-1250`; the XML declaration
//! tells us which. A BOM wins over the declaration.

use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;

/// How far into the document we look for the XML declaration.
const DECLARATION_WINDOW: usize = 256;

/// Encoding label from `<?xml ... encoding="..."?>`, if any.
fn declared_label(bytes: &[u8]) -> Option<&str> {
    let head = &bytes[..bytes.len().min(DECLARATION_WINDOW)];
    let end = head.windows(2).position(|w| w == b"?>")?;
    let decl = &head[..end];
    let at = decl.windows(8).position(|w| w == b"encoding")?;
    let rest = &decl[at + 8..];
    let eq = rest.iter().position(|&b| b == b'=')?;
    let rest = rest[eq + 1..].trim_ascii_start();
    let quote = *rest.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let value = &rest[1..];
    let close = value.iter().position(|&b| b == quote)?;
    std::str::from_utf8(&value[..close]).ok()
}

/// Decode raw document bytes into text.
pub fn decode_document(bytes: &[u8]) -> Cow<'_, str> {
    let encoding = declared_label(bytes)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!(encoding = used.name(), "statement contains undecodable bytes");
    }
    text
}
