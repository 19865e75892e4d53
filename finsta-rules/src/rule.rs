//! Category rules: a conjunction of optional clauses bound to a category.
//!
//! A rule matches a movement when every clause it carries passes:
//! - account: exact match on the counter-account
//! - message: any fragment contains the text (case-insensitive), or matches it as a regex
//! - amount: threshold < 0 means "below the threshold", otherwise "at least the threshold"
//!
//! A rule without clauses matches everything.

use finsta_core::{Category, Movement};
use regex::{Regex, RegexBuilder};

/// Regex side of the message clause, compiled once when the rule is built.
#[derive(Debug, Clone)]
pub enum MessageMatcher {
    /// Pattern did not compile; only substring matching applies
    Uncompiled,
    Compiled(Regex),
}

#[derive(Debug, Clone)]
pub struct MessageClause {
    needle: String,
    matcher: MessageMatcher,
}

impl MessageClause {
    pub fn new(pattern: &str) -> Self {
        let matcher = match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(re) => MessageMatcher::Compiled(re),
            Err(err) => {
                tracing::warn!(pattern, error = %err, "message filter is not a valid regex, using substring match only");
                MessageMatcher::Uncompiled
            }
        };
        Self {
            needle: pattern.to_lowercase(),
            matcher,
        }
    }

    pub fn matcher(&self) -> &MessageMatcher {
        &self.matcher
    }

    pub fn matches(&self, movement: &Movement) -> bool {
        if movement
            .messages
            .iter()
            .any(|m| m.to_lowercase().contains(&self.needle))
        {
            return true;
        }
        match &self.matcher {
            MessageMatcher::Compiled(re) => movement.messages.iter().any(|m| re.is_match(m)),
            MessageMatcher::Uncompiled => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    account: Option<String>,
    message: Option<MessageClause>,
    amount: Option<i64>,
    category: Category,
}

impl Rule {
    /// A catch-all rule for `category`; narrow it with the `with_*` methods.
    pub fn new(category: impl Into<Category>) -> Self {
        Self {
            account: None,
            message: None,
            amount: None,
            category: category.into(),
        }
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_message(mut self, pattern: &str) -> Self {
        self.message = Some(MessageClause::new(pattern));
        self
    }

    pub fn with_amount(mut self, threshold: i64) -> Self {
        self.amount = Some(threshold);
        self
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn message(&self) -> Option<&MessageClause> {
        self.message.as_ref()
    }

    pub fn is_catch_all(&self) -> bool {
        self.account.is_none() && self.message.is_none() && self.amount.is_none()
    }

    pub fn matches(&self, movement: &Movement) -> bool {
        if let Some(account) = &self.account {
            if *account != movement.counter_account {
                return false;
            }
        }

        if let Some(message) = &self.message {
            if !message.matches(movement) {
                return false;
            }
        }

        if let Some(threshold) = self.amount {
            let threshold = threshold as f64;
            let ok = if threshold < 0.0 {
                movement.amount < threshold
            } else {
                movement.amount >= threshold
            };
            if !ok {
                return false;
            }
        }

        true
    }
}
