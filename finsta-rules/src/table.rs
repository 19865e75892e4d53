//! Decoding of the rule table and category list.
//!
//! Both come from a spreadsheet range or a CSV file as rows of strings.
//! The rule table has four columns and a header row:
//!   Account, Message, Amount, Category
//! The category list has one label per row; an empty row is the empty
//! (uncategorized) label.

use std::path::Path;

use crate::engine::RuleSet;
use crate::error::ConfigurationError;
use crate::rule::Rule;

/// Build one rule from its four cells. `row` is the 1-based table row.
///
/// Every cell is trimmed, so stray spaces never end up in a needle.
pub fn rule_from_cells(
    account: &str,
    message: &str,
    amount: &str,
    category: &str,
    row: usize,
) -> Result<Rule, ConfigurationError> {
    let mut rule = Rule::new(category.trim());

    let account = account.trim();
    if !account.is_empty() {
        rule = rule.with_account(account);
    }

    let message = message.trim();
    if !message.is_empty() {
        rule = rule.with_message(message);
    }

    let amount = amount.trim();
    if !amount.is_empty() {
        let threshold = amount
            .parse::<i64>()
            .map_err(|_| ConfigurationError::InvalidAmount {
                row,
                value: amount.to_string(),
            })?;
        rule = rule.with_amount(threshold);
    }

    Ok(rule)
}

/// Decode rule rows; the first row is a header and is skipped.
///
/// Short rows are padded with empty cells, extra cells are ignored.
/// Rows whose four cells are all blank are skipped: as a rule they would
/// be an uncategorized catch-all shadowing every rule below them.
pub fn rules_from_rows<R, S>(rows: &[R]) -> Result<RuleSet, ConfigurationError>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let rules = rows
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(i, row)| {
            let row = row.as_ref();
            let cell = |c: usize| row.get(c).map_or("", |s| s.as_ref());
            if (0..4).all(|c| cell(c).trim().is_empty()) {
                tracing::debug!(row = i + 1, "skipping blank rule row");
                return None;
            }
            Some(rule_from_cells(cell(0), cell(1), cell(2), cell(3), i + 1))
        })
        .collect::<Result<RuleSet, _>>()?;

    tracing::debug!(rules = rules.len(), "loaded rule table");
    Ok(rules)
}

/// First cell of every row, trimmed; an empty row yields the empty label.
pub fn labels_from_rows<R, S>(rows: &[R]) -> Vec<String>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    rows.iter()
        .map(|row| {
            row.as_ref()
                .first()
                .map_or_else(String::new, |s| s.as_ref().trim().to_string())
        })
        .collect()
}

/// Read every record of a header-less CSV file as a row of strings.
pub fn read_csv_rows(path: impl AsRef<Path>) -> Result<Vec<Vec<String>>, ConfigurationError> {
    let path = path.as_ref();
    let read_err = |source| ConfigurationError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path)
        .map_err(read_err)?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(read_err)?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Load the rule table from a CSV file (header row included).
pub fn read_rules_csv(path: impl AsRef<Path>) -> Result<RuleSet, ConfigurationError> {
    rules_from_rows(&read_csv_rows(path)?)
}

/// Load a single-column label list (categories, own accounts) from CSV.
pub fn read_labels_csv(path: impl AsRef<Path>) -> Result<Vec<String>, ConfigurationError> {
    Ok(labels_from_rows(&read_csv_rows(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use finsta_core::{Category, Movement};
    use std::fs;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    fn mv(amount: f64) -> Movement {
        Movement::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), amount)
    }

    #[test]
    fn test_header_row_is_skipped() {
        let table = rows(&[
            &["Account", "Message", "Amount", "Category"],
            &["123", "", "", "Rent"],
            &["", "coffee", "-1", "Food"],
        ]);
        let rules = rules_from_rows(&table).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.rules()[0].category(), &Category::new("Rent"));
        assert_eq!(rules.assign(&mv(-10.0).with_counter_account("123")), &Category::new("Rent"));
        assert_eq!(rules.assign(&mv(-10.0).with_messages(["Coffee bar"])), &Category::new("Food"));
        assert_eq!(rules.assign(&mv(10.0).with_messages(["Coffee bar"])), &Category::Uncategorized);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = rows(&[&["h"], &["123"], &["", "", "", "Misc"]]);
        let rules = rules_from_rows(&table).unwrap();
        assert_eq!(rules.len(), 2);
        // account only, empty category
        assert_eq!(rules.rules()[0].category(), &Category::Uncategorized);
        assert!(!rules.rules()[0].is_catch_all());
        assert!(rules.rules()[1].is_catch_all());
    }

    #[test]
    fn test_blank_rows_do_not_shadow_later_rules() {
        let table: Vec<Vec<String>> = vec![
            vec!["Account".into(), "Message".into(), "Amount".into(), "Category".into()],
            vec!["".into(), "lidl".into(), "".into(), "Food".into()],
            vec![],
            vec![" ".into(), "".into(), "  ".into()],
            vec!["".into(), "shell".into(), "".into(), "Fuel".into()],
            vec!["".into(), "".into(), "x".into(), "".into()],
        ];
        let err = rules_from_rows(&table).unwrap_err();
        // row numbers still count the skipped rows
        assert!(matches!(err, ConfigurationError::InvalidAmount { row: 6, .. }));

        let rules = rules_from_rows(&table[..5]).unwrap();
        assert_eq!(rules.len(), 2);
        assert!(!rules.rules().iter().any(|r| r.is_catch_all()));
        assert_eq!(
            rules.assign(&mv(-40.0).with_messages(["SHELL 0123"])),
            &Category::new("Fuel")
        );
    }

    #[test]
    fn test_message_cell_is_trimmed() {
        let table = rows(&[&["h"], &["", "  lidl ", "", "Food"]]);
        let rules = rules_from_rows(&table).unwrap();
        assert_eq!(
            rules.assign(&mv(-10.0).with_messages(["LIDL DEKUJE"])),
            &Category::new("Food")
        );
    }

    #[test]
    fn test_bad_amount_names_row() {
        let table = rows(&[&["h"], &["", "", "-100", "A"], &["", "", "ten", "B"]]);
        let err = rules_from_rows(&table).unwrap_err();
        match err {
            ConfigurationError::InvalidAmount { row, value } => {
                assert_eq!(row, 3);
                assert_eq!(value, "ten");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_labels_keep_empty_rows() {
        let table: Vec<Vec<String>> = vec![vec![], vec!["Salary".to_string()], vec![" Food ".to_string()]];
        assert_eq!(labels_from_rows(&table), vec!["", "Salary", "Food"]);
    }

    #[test]
    fn test_read_csv_sources() {
        let dir = tempfile::tempdir().unwrap();
        let rules_path = dir.path().join("rules.csv");
        let cats_path = dir.path().join("categories.csv");
        fs::write(
            &rules_path,
            "account,message,amount,category\n2171532,,,Rent\n,\"lidl|albert\",-1,Food\n,,1,Income\n",
        )
        .unwrap();
        fs::write(&cats_path, "\"\"\nIncome\nRent\nFood\n").unwrap();

        let rules = read_rules_csv(&rules_path).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.assign(&mv(-80.0).with_messages(["ALBERT 123"])), &Category::new("Food"));

        let labels = read_labels_csv(&cats_path).unwrap();
        assert_eq!(labels, vec!["", "Income", "Rent", "Food"]);
    }

    #[test]
    fn test_missing_csv_is_read_error() {
        let err = read_rules_csv("/nonexistent/rules.csv").unwrap_err();
        assert!(matches!(err, ConfigurationError::Read { .. }));
        assert!(err.to_string().contains("rules.csv"));
    }
}
