//! Conversions of raw field text into typed values.
//!
//! Each function returns `None` when the text cannot be converted; the
//! caller attaches field and record context.

use chrono::NaiveDate;

const DATE_FORMATS: &[&str] = &["%d.%m.%Y", "%Y-%m-%d"];

/// Parse `dd.mm.yyyy` or `yyyy-mm-dd`; a trailing time part is ignored.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().split(['T', ' ']).next()?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
}

/// Parse a signed decimal amount with `,` or `.` as decimal separator.
///
/// Spaces (including no-break spaces) used as digit grouping are ignored.
/// When both separators occur, the last one is the decimal separator.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let compact: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .collect();
    if compact.is_empty() {
        return None;
    }

    let normalized = match (compact.rfind(','), compact.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => compact.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => compact.replace(',', ""),
        (Some(_), None) => compact.replace(',', "."),
        _ => compact,
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a header total; any prefix up to the first `=` is dropped.
pub fn parse_total(raw: &str) -> Option<f64> {
    let value = raw.split_once('=').map(|(_, v)| v).unwrap_or(raw);
    parse_amount(value)
}

/// Parse a reference symbol. `Some(None)` means the symbol is absent.
pub fn parse_symbol(raw: &str) -> Option<Option<u64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(None);
    }
    raw.parse::<u64>().ok().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dates() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(parse_date("01.02.2024"), Some(d));
        assert_eq!(parse_date("1.2.2024"), Some(d));
        assert_eq!(parse_date("2024-02-01"), Some(d));
        assert_eq!(parse_date("01.02.2024 00:00:00"), Some(d));
        assert_eq!(parse_date("31.02.2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_amounts() {
        assert_eq!(parse_amount("-250,00"), Some(-250.0));
        assert_eq!(parse_amount("1 234,56"), Some(1234.56));
        assert_eq!(parse_amount("1\u{a0}234.5"), Some(1234.5));
        assert_eq!(parse_amount("1.234,50"), Some(1234.5));
        assert_eq!(parse_amount("1,234.50"), Some(1234.5));
        assert_eq!(parse_amount("+12"), Some(12.0));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_totals_strip_prefix() {
        assert_eq!(parse_total("K=15000,50"), Some(15000.5));
        assert_eq!(parse_total("15000,50"), Some(15000.5));
        assert_eq!(parse_total("D="), None);
    }

    #[test]
    fn test_symbols() {
        assert_eq!(parse_symbol(""), Some(None));
        assert_eq!(parse_symbol(" 0308 "), Some(Some(308)));
        assert_eq!(parse_symbol("12a"), None);
        assert_eq!(parse_symbol("-1"), None);
    }
}
