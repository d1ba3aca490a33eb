//! Daily item sales used to spot trending items.
#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Default look-back for trending detection.
pub const DEFAULT_TRENDING_DAYS: i64 = 14;

/// Per-day count of orders containing each catalog item.
///
/// # Examples
/// ```
/// use chrono::{NaiveDate, TimeDelta};
/// use sidekick_scorer::ItemTimeline;
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
/// let mut timeline = ItemTimeline::default();
/// timeline.record(day, &[0, 1]);
/// timeline.record(day, &[1]);
/// let as_of = day.and_hms_opt(23, 0, 0).unwrap();
/// assert_eq!(timeline.trending(as_of, TimeDelta::days(14)), vec![1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemTimeline {
    daily: BTreeMap<NaiveDate, BTreeMap<usize, u32>>,
}

impl ItemTimeline {
    /// Count one order on `date` containing `items`.
    pub fn record(&mut self, date: NaiveDate, items: &[usize]) {
        let day = self.daily.entry(date).or_default();
        for &item in items {
            let count = day.entry(item).or_insert(0);
            *count = count.saturating_add(1);
        }
    }

    /// Orders per item on days inside the window ending at `as_of`.
    #[must_use]
    pub fn counts_in_window(&self, as_of: NaiveDateTime, window: TimeDelta) -> BTreeMap<usize, u32> {
        let until = as_of.date();
        let since = (as_of - window).date();
        let mut totals: BTreeMap<usize, u32> = BTreeMap::new();
        for (_, day) in self
            .daily
            .range(since..=until)
            .filter(|(date, _)| **date > since)
        {
            for (&item, &count) in day {
                let total = totals.entry(item).or_insert(0);
                *total = total.saturating_add(count);
            }
        }
        totals
    }

    /// The top decile, and at least one, of items sold inside the window,
    /// best-selling first with ties broken by popularity rank.
    #[must_use]
    pub fn trending(&self, as_of: NaiveDateTime, window: TimeDelta) -> Vec<usize> {
        let mut ranked: Vec<(usize, u32)> = self
            .counts_in_window(as_of, window)
            .into_iter()
            .filter(|&(_, count)| count > 0)
            .collect();
        ranked.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(&right.0)));
        let keep = ranked.len().div_ceil(10).max(1);
        ranked.into_iter().take(keep).map(|(item, _)| item).collect()
    }

    /// Number of days with recorded orders.
    #[must_use]
    pub fn days(&self) -> usize {
        self.daily.len()
    }
}
