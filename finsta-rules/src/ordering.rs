//! Display order of categories, taken from the reference category list.

use finsta_core::Category;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::{ConfigurationError, LookupError};

/// Label -> position map built once from the reference list.
///
/// The list must contain the empty label to place uncategorized movements.
#[derive(Debug, Clone)]
pub struct CategoryOrder {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl CategoryOrder {
    pub fn new<I, S>(labels: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), i).is_some() {
                return Err(ConfigurationError::DuplicateCategory(label.clone()));
            }
        }
        Ok(Self { labels, index })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, category: &Category) -> bool {
        self.index.contains_key(category.label())
    }

    pub fn position(&self, category: &Category) -> Result<usize, LookupError> {
        self.index
            .get(category.label())
            .copied()
            .ok_or_else(|| LookupError {
                label: category.label().to_string(),
            })
    }

    pub fn compare(&self, a: &Category, b: &Category) -> Result<Ordering, LookupError> {
        Ok(self.position(a)?.cmp(&self.position(b)?))
    }

    /// Stable sort of `items` by the category each one carries.
    ///
    /// Every key is looked up before anything moves, so on error `items`
    /// is left untouched.
    pub fn sort_by_category<T>(
        &self,
        items: &mut [T],
        key: impl Fn(&T) -> &Category,
    ) -> Result<(), LookupError> {
        for item in items.iter() {
            self.position(key(item))?;
        }
        items.sort_by_key(|item| self.index.get(key(item).label()).copied().unwrap_or(usize::MAX));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats(labels: &[&str]) -> Vec<Category> {
        labels.iter().map(|l| Category::new(*l)).collect()
    }

    #[test]
    fn test_sorts_by_reference_position() {
        let order = CategoryOrder::new(["A", "B", "C"]).unwrap();
        let mut keys = cats(&["C", "A"]);
        order.sort_by_category(&mut keys, |c| c).unwrap();
        assert_eq!(keys, cats(&["A", "C"]));
    }

    #[test]
    fn test_uncategorized_follows_listed_position() {
        let order = CategoryOrder::new(["Salary", "", "Food"]).unwrap();
        let mut keys = cats(&["Food", "", "Salary"]);
        order.sort_by_category(&mut keys, |c| c).unwrap();
        assert_eq!(keys, vec![Category::new("Salary"), Category::Uncategorized, Category::new("Food")]);
        assert_eq!(order.position(&Category::Uncategorized), Ok(1));
    }

    #[test]
    fn test_unknown_label_fails_loudly() {
        let order = CategoryOrder::new(["A", "B"]).unwrap();
        let err = order
            .compare(&Category::new("A"), &Category::new("Z"))
            .unwrap_err();
        assert_eq!(err.label, "Z");

        let mut keys = cats(&["B", "Z", "A"]);
        assert!(order.sort_by_category(&mut keys, |c| c).is_err());
        assert_eq!(keys, cats(&["B", "Z", "A"]));
    }

    #[test]
    fn test_uncategorized_requires_empty_label() {
        let order = CategoryOrder::new(["A"]).unwrap();
        let err = order.position(&Category::Uncategorized).unwrap_err();
        assert_eq!(err.label, "");
    }

    #[test]
    fn test_compare_is_total_order() {
        let order = CategoryOrder::new(["", "A", "B"]).unwrap();
        let all = cats(&["", "A", "B"]);
        for a in &all {
            assert_eq!(order.compare(a, a), Ok(Ordering::Equal));
            for b in &all {
                let ab = order.compare(a, b).unwrap();
                let ba = order.compare(b, a).unwrap();
                assert_eq!(ab, ba.reverse());
            }
        }
        assert_eq!(order.compare(&Category::Uncategorized, &Category::new("B")), Ok(Ordering::Less));
    }

    #[test]
    fn test_sort_is_stable() {
        let order = CategoryOrder::new(["A", "B"]).unwrap();
        let mut items: Vec<(Category, i32)> = [("B", 1), ("A", 2), ("B", 3), ("A", 4)]
            .into_iter()
            .map(|(l, n)| (Category::new(l), n))
            .collect();
        order.sort_by_category(&mut items, |(c, _)| c).unwrap();
        let ns: Vec<i32> = items.iter().map(|(_, n)| *n).collect();
        assert_eq!(ns, vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_duplicate_label_is_configuration_error() {
        let err = CategoryOrder::new(["A", "", "A"]).unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateCategory(ref l) if l == "A"));
    }
}
