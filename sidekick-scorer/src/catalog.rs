//! The closed universe of recommendable items, ranked by popularity.
//!
//! Items are stored in popularity order, so an item's position is also its
//! 0-based popularity rank. The other tables key their rows by that
//! position.
#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sidekick_core::{Category, CategoryRules, ItemName};

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Display name, as first seen in the training orders.
    pub name: ItemName,
    /// Category assigned by the keyword rules.
    pub category: Category,
    /// Number of training orders containing the item.
    pub order_count: u32,
}

/// Items seen in training data, most popular first.
///
/// Lookups ignore case, so `Ranch Dip` and `ranch dip` resolve to the same
/// entry.
///
/// # Examples
/// ```
/// use sidekick_core::{CategoryRules, ItemName};
/// use sidekick_scorer::Catalog;
///
/// let name = |raw: &str| ItemName::new(raw).unwrap();
/// let catalog = Catalog::from_counts(
///     [(name("cola"), 4), (name("wings"), 9)],
///     &CategoryRules::default(),
/// );
/// assert_eq!(catalog.position(&name("Wings")), Some(0));
/// assert_eq!(catalog.position(&name("cola")), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    index: BTreeMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from per-item order counts.
    ///
    /// Items sort by descending count with ties broken by name. Names that
    /// differ only in case merge into the first spelling seen, summing their
    /// counts.
    pub fn from_counts<I>(counts: I, rules: &CategoryRules) -> Self
    where
        I: IntoIterator<Item = (ItemName, u32)>,
    {
        let mut merged: BTreeMap<String, (ItemName, u32)> = BTreeMap::new();
        for (name, count) in counts {
            merged
                .entry(name.folded())
                .and_modify(|(_, total)| *total = total.saturating_add(count))
                .or_insert((name, count));
        }
        let mut items: Vec<CatalogItem> = merged
            .into_values()
            .map(|(name, order_count)| CatalogItem {
                category: rules.categorise(&name),
                name,
                order_count,
            })
            .collect();
        items.sort_by(|left, right| {
            right
                .order_count
                .cmp(&left.order_count)
                .then_with(|| left.name.folded().cmp(&right.name.folded()))
                .then_with(|| left.name.cmp(&right.name))
        });
        let index = items
            .iter()
            .enumerate()
            .map(|(position, item)| (item.name.folded(), position))
            .collect();
        Self { items, index }
    }

    /// Position, and therefore popularity rank, of `name`.
    #[must_use]
    pub fn position(&self, name: &ItemName) -> Option<usize> {
        self.index.get(&name.folded()).copied()
    }

    /// Entry at `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&CatalogItem> {
        self.items.get(position)
    }

    /// Report whether `name` is in the catalog.
    #[must_use]
    pub fn contains(&self, name: &ItemName) -> bool {
        self.position(name).is_some()
    }

    /// Popularity signal for the item at `position`: `(N - rank) / N`.
    ///
    /// The most popular item scores `1.0`; positions outside the catalog
    /// score `0.0`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "popularity is a rank ratio over a catalog far smaller than 2^24"
    )]
    pub fn popularity(&self, position: usize) -> f32 {
        let size = self.items.len();
        if position >= size {
            return 0.0_f32;
        }
        (size - position) as f32 / size as f32
    }

    /// Iterate over entries, most popular first.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter()
    }

    /// Number of items.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    /// Report whether the catalog is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use sidekick_core::test_support::item;

    fn sample() -> Catalog {
        Catalog::from_counts(
            [
                (item("fries"), 10),
                (item("cola"), 10),
                (item("Ranch Dip"), 5),
                (item("wings"), 15),
            ],
            &CategoryRules::default(),
        )
    }

    #[rstest]
    fn orders_by_count_then_name() {
        let names: Vec<_> = sample().iter().map(|entry| entry.name.to_string()).collect();
        assert_eq!(names, vec!["wings", "cola", "fries", "Ranch Dip"]);
    }

    #[rstest]
    fn ties_ignore_case() {
        let catalog = Catalog::from_counts(
            [(item("Fries"), 10), (item("cola"), 10), (item("Ranch"), 10), (item("dip"), 10)],
            &CategoryRules::default(),
        );
        let names: Vec<_> = catalog.iter().map(|entry| entry.name.to_string()).collect();
        assert_eq!(names, vec!["cola", "dip", "Fries", "Ranch"]);
    }

    #[rstest]
    #[case(0, 1.0)]
    #[case(1, 0.75)]
    #[case(3, 0.25)]
    #[case(4, 0.0)]
    fn popularity_is_a_rank_ratio(#[case] position: usize, #[case] expected: f32) {
        assert!((sample().popularity(position) - expected).abs() < f32::EPSILON);
    }

    #[rstest]
    fn case_variants_merge() {
        let catalog = Catalog::from_counts(
            [(item("Cola"), 2), (item("cola"), 3), (item("wings"), 4)],
            &CategoryRules::default(),
        );
        assert_eq!(catalog.len(), 2);
        let cola = catalog.get(0).expect("cola entry");
        assert_eq!(cola.name.as_str(), "Cola");
        assert_eq!(cola.order_count, 5);
        assert_eq!(cola.category, Category::Drinks);
    }

    #[rstest]
    fn lookups_ignore_case() {
        let catalog = sample();
        assert_eq!(catalog.position(&item("RANCH DIP")), Some(3));
        assert!(!catalog.contains(&item("mystery")));
    }
}
