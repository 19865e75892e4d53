//! Statement and movement types produced by the statement parser.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of message slots a single movement record carries.
pub const MESSAGE_SLOTS: usize = 8;

/// Ordered message fragments of one movement.
///
/// Built from the fixed message slots of a record; empty slots are dropped
/// and the remaining fragments keep their slot order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageFragments(Vec<String>);

impl MessageFragments {
    /// Build from optional slot values, keeping only non-empty ones.
    pub fn from_slots<I, S>(slots: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self(
            slots
                .into_iter()
                .flatten()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a MessageFragments {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().map(String::as_str as fn(&'a String) -> &'a str)
    }
}

/// One bank transaction line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub date: NaiveDate,
    /// Positive = credit, negative = debit
    pub amount: f64,
    /// Counterpart account number (may be empty)
    pub counter_account: String,
    /// Counterpart bank code (may be empty)
    pub counter_bank: String,
    /// Free-text counterpart identifier (may be empty)
    pub identifier: String,
    pub specific_symbol: Option<u64>,
    pub variable_symbol: Option<u64>,
    pub messages: MessageFragments,
}

impl Movement {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self {
            date,
            amount,
            counter_account: String::new(),
            counter_bank: String::new(),
            identifier: String::new(),
            specific_symbol: None,
            variable_symbol: None,
            messages: MessageFragments::default(),
        }
    }

    pub fn with_counter_account(mut self, account: impl Into<String>) -> Self {
        self.counter_account = account.into();
        self
    }

    pub fn with_counter_bank(mut self, bank: impl Into<String>) -> Self {
        self.counter_bank = bank.into();
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn with_symbols(mut self, specific: Option<u64>, variable: Option<u64>) -> Self {
        self.specific_symbol = specific;
        self.variable_symbol = variable;
        self
    }

    pub fn with_messages<I, S>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.messages = MessageFragments::from_slots(messages.into_iter().map(Some));
        self
    }

    /// Human-readable text: the identifier, else the first message fragment.
    pub fn description(&self) -> Option<&str> {
        if self.identifier.is_empty() {
            self.messages.first()
        } else {
            Some(&self.identifier)
        }
    }

    pub fn is_credit(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_debit(&self) -> bool {
        self.amount < 0.0
    }
}

/// A parsed bank statement: header totals plus its movements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Account holder short name
    pub holder: String,
    pub account: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub opening_balance: f64,
    /// Sum of credits, positive
    pub credits: f64,
    /// Sum of debits, stored negative
    pub debits: f64,
    pub movements: Vec<Movement>,
}

impl Statement {
    /// Closing balance from the header totals.
    pub fn closing_balance(&self) -> f64 {
        self.opening_balance + self.credits + self.debits
    }

    /// Sum of the positive movement amounts.
    pub fn movement_credits(&self) -> f64 {
        self.movements
            .iter()
            .filter(|m| m.is_credit())
            .map(|m| m.amount)
            .sum()
    }

    /// Sum of the negative movement amounts.
    pub fn movement_debits(&self) -> f64 {
        self.movements
            .iter()
            .filter(|m| m.is_debit())
            .map(|m| m.amount)
            .sum()
    }

    /// Closing balance re-derived from the movements instead of the header.
    pub fn derived_closing_balance(&self) -> f64 {
        self.opening_balance + self.movement_credits() + self.movement_debits()
    }

    /// Append the movements of a supplementary statement after our own.
    ///
    /// Header fields stay those of `self`.
    pub fn append(&mut self, other: Statement) {
        self.movements.extend(other.movements);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn statement(movements: Vec<Movement>) -> Statement {
        Statement {
            holder: "NOVAK JAN".to_string(),
            account: "123456789".to_string(),
            period_start: date(1),
            period_end: date(31),
            opening_balance: 1000.0,
            credits: 500.0,
            debits: -300.0,
            movements,
        }
    }

    #[test]
    fn test_fragments_drop_empty_slots() {
        let fragments =
            MessageFragments::from_slots(vec![Some(""), Some("first"), None, Some(""), Some("second")]);
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments.iter().collect::<Vec<_>>(), vec!["first", "second"]);
        assert_eq!(fragments.first(), Some("first"));
    }

    #[test]
    fn test_fragments_are_restartable() {
        let fragments = MessageFragments::from_slots(vec![Some("a"), Some("b")]);
        let once: Vec<&str> = (&fragments).into_iter().collect();
        let twice: Vec<&str> = (&fragments).into_iter().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_description_prefers_identifier() {
        let mv = Movement::new(date(2), -10.0)
            .with_identifier("ALBERT")
            .with_messages(["card payment"]);
        assert_eq!(mv.description(), Some("ALBERT"));

        let mv = Movement::new(date(2), -10.0).with_messages(["card payment", "other"]);
        assert_eq!(mv.description(), Some("card payment"));

        let mv = Movement::new(date(2), -10.0);
        assert_eq!(mv.description(), None);
    }

    #[test]
    fn test_balances() {
        let st = statement(vec![
            Movement::new(date(2), 500.0),
            Movement::new(date(3), -100.0),
            Movement::new(date(4), -200.0),
        ]);
        assert_eq!(st.closing_balance(), 1200.0);
        assert_eq!(st.movement_credits(), 500.0);
        assert_eq!(st.movement_debits(), -300.0);
        assert_eq!(st.derived_closing_balance(), st.closing_balance());
    }

    #[test]
    fn test_append_keeps_primary_first() {
        let mut primary = statement(vec![Movement::new(date(2), 1.0), Movement::new(date(5), 2.0)]);
        let extra = statement(vec![Movement::new(date(1), 3.0)]);
        primary.append(extra);
        let amounts: Vec<f64> = primary.movements.iter().map(|m| m.amount).collect();
        assert_eq!(amounts, vec![1.0, 2.0, 3.0]);
        assert_eq!(primary.opening_balance, 1000.0);
    }

    #[test]
    fn test_movement_serializes_fragments_as_list() {
        let mv = Movement::new(date(2), -1.0).with_messages(["x", "", "y"]);
        let json = serde_json::to_value(&mv).unwrap();
        assert_eq!(json["messages"], serde_json::json!(["x", "y"]));
    }
}
