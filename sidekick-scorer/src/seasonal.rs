//! Month-keyed calendar of items worth promoting.
#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use chrono::Month;
use serde::{Deserialize, Serialize};
use sidekick_core::{Category, ItemName};

use crate::Catalog;

/// Something the calendar promotes in a given month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalEntry {
    /// A specific menu item.
    Item(ItemName),
    /// Every catalog item in a category, most popular first.
    Category(Category),
}

/// Calendar of seasonal promotions keyed by month number (`1..=12`).
///
/// # Examples
/// ```
/// use chrono::Month;
/// use sidekick_core::Category;
/// use sidekick_scorer::{SeasonalCalendar, SeasonalEntry};
///
/// let calendar = SeasonalCalendar::default();
/// assert!(calendar.entries(Month::July).contains(&SeasonalEntry::Category(Category::Drinks)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalCalendar {
    months: BTreeMap<u32, Vec<SeasonalEntry>>,
}

impl SeasonalCalendar {
    /// Calendar with no promotions.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            months: BTreeMap::new(),
        }
    }

    /// Append `entries` to `month`, enabling chaining.
    #[must_use]
    pub fn with_month<I>(mut self, month: Month, entries: I) -> Self
    where
        I: IntoIterator<Item = SeasonalEntry>,
    {
        self.months
            .entry(month.number_from_month())
            .or_default()
            .extend(entries);
        self
    }

    /// Promotions configured for `month`.
    #[must_use]
    pub fn entries(&self, month: Month) -> &[SeasonalEntry] {
        self.months
            .get(&month.number_from_month())
            .map_or(&[], Vec::as_slice)
    }

    /// Catalog positions promoted in `month`, in calendar order and without
    /// duplicates. Items missing from the catalog are skipped.
    #[must_use]
    pub fn resolve(&self, month: Month, catalog: &Catalog) -> Vec<usize> {
        let mut positions = Vec::new();
        for entry in self.entries(month) {
            match entry {
                SeasonalEntry::Item(name) => positions.extend(catalog.position(name)),
                SeasonalEntry::Category(category) => positions.extend(
                    catalog
                        .iter()
                        .enumerate()
                        .filter(|(_, item)| item.category == *category)
                        .map(|(position, _)| position),
                ),
            }
        }
        let mut seen = Vec::with_capacity(positions.len());
        positions.retain(|position| {
            if seen.contains(position) {
                false
            } else {
                seen.push(*position);
                true
            }
        });
        positions
    }
}

impl Default for SeasonalCalendar {
    fn default() -> Self {
        use Month::{
            April, August, December, February, January, July, June, March, May, November,
            October, September,
        };
        use SeasonalEntry::Category as Promote;

        let winter = [Promote(Category::Desserts), Promote(Category::Combos)];
        let spring = [Promote(Category::Sides)];
        let summer = [Promote(Category::Drinks)];
        let autumn = [Promote(Category::Combos)];

        [December, January, February]
            .into_iter()
            .fold(Self::empty(), |calendar, month| calendar.with_month(month, winter.clone()))
            .with_month(March, spring.clone())
            .with_month(April, spring.clone())
            .with_month(May, spring)
            .with_month(June, summer.clone())
            .with_month(July, summer.clone())
            .with_month(August, summer)
            .with_month(September, autumn.clone())
            .with_month(October, autumn.clone())
            .with_month(November, autumn)
    }
}
