//! Categorization engine: first-match rule scan, grouping and ordering.

use finsta_core::{Category, Movement};
use std::collections::HashMap;

use crate::error::LookupError;
use crate::ordering::CategoryOrder;
use crate::rule::Rule;

static UNCATEGORIZED: Category = Category::Uncategorized;

/// Rules in evaluation order. Order is significant: the first match wins.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Category of the first matching rule, or `Uncategorized`.
    pub fn assign(&self, movement: &Movement) -> &Category {
        self.rules
            .iter()
            .find(|rule| rule.matches(movement))
            .map(Rule::category)
            .unwrap_or(&UNCATEGORIZED)
    }

    /// True when some rule has no clauses, so no movement stays uncategorized.
    pub fn has_catch_all(&self) -> bool {
        self.rules.iter().any(Rule::is_catch_all)
    }

    /// Categories assigned by some rule but absent from `order`, with the
    /// zero-based index of the first rule naming each.
    pub fn unknown_categories(&self, order: &CategoryOrder) -> Vec<(usize, &Category)> {
        let mut seen = Vec::<&Category>::new();
        let mut unknown = Vec::new();
        for (i, rule) in self.rules.iter().enumerate() {
            let category = rule.category();
            if !order.contains(category) && !seen.contains(&category) {
                seen.push(category);
                unknown.push((i, category));
            }
        }
        unknown
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Movements sharing one category, in their original relative order.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub category: Category,
    pub movements: Vec<&'a Movement>,
}

impl CategoryGroup<'_> {
    pub fn len(&self) -> usize {
        self.movements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }

    /// Signed sum of the group's amounts.
    pub fn total(&self) -> f64 {
        self.movements.iter().map(|m| m.amount).sum()
    }
}

/// Group movements by assigned category, groups in first-encounter order.
pub fn group<'a>(movements: &'a [Movement], rules: &RuleSet) -> Vec<CategoryGroup<'a>> {
    let mut groups: Vec<CategoryGroup<'a>> = Vec::new();
    let mut slots: HashMap<&Category, usize> = HashMap::new();

    for movement in movements {
        let category = rules.assign(movement);
        let slot = *slots.entry(category).or_insert_with(|| {
            groups.push(CategoryGroup {
                category: category.clone(),
                movements: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].movements.push(movement);
    }

    groups
}

/// Categorize, group and order movements for presentation.
///
/// Fails if a produced category is missing from `order`; nothing is
/// returned in that case.
pub fn categorize<'a>(
    movements: &'a [Movement],
    rules: &RuleSet,
    order: &CategoryOrder,
) -> Result<Vec<CategoryGroup<'a>>, LookupError> {
    let mut groups = group(movements, rules);
    order.sort_by_category(&mut groups, |g| &g.category)?;

    tracing::debug!(
        movements = movements.len(),
        rules = rules.len(),
        groups = groups.len(),
        uncategorized = groups
            .iter()
            .find(|g| g.category.is_uncategorized())
            .map_or(0, CategoryGroup::len),
        "categorized movements"
    );

    Ok(groups)
}
