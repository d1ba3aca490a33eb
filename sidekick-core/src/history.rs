//! Per-customer record of recently recommended items.
//!
//! History is the one structure that changes while a batch runs: every
//! delivered recommendation is appended so the freshness filter can avoid
//! repeating itself on the customer's next order.

use std::collections::HashMap;

use chrono::{NaiveDateTime, TimeDelta};

use crate::{CustomerId, ItemName};

/// Default rolling window for anti-repetition.
pub const DEFAULT_HISTORY_DAYS: i64 = 7;

/// A single recommendation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Item that was recommended.
    pub item: ItemName,
    /// When it was recommended.
    pub recommended_at: NaiveDateTime,
}

impl HistoryEntry {
    /// Build an entry.
    #[must_use]
    pub const fn new(item: ItemName, recommended_at: NaiveDateTime) -> Self {
        Self {
            item,
            recommended_at,
        }
    }
}

/// Time-ordered recommendation history keyed by customer.
///
/// # Examples
/// ```
/// use chrono::{NaiveDate, TimeDelta};
/// use sidekick_core::{CustomerId, ItemName, RecommendationHistory};
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 3, d)
///     .and_then(|date| date.and_hms_opt(12, 0, 0))
///     .unwrap();
/// let customer = CustomerId::new("c-1");
/// let mut history = RecommendationHistory::new();
/// history.record(&customer, [ItemName::new("cola").unwrap()], day(1));
/// assert_eq!(history.recent(&customer, day(3), TimeDelta::days(7)).len(), 1);
/// assert!(history.recent(&customer, day(20), TimeDelta::days(7)).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationHistory {
    entries: HashMap<CustomerId, Vec<HistoryEntry>>,
}

impl RecommendationHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append recommendation events for `customer`, keeping entries sorted
    /// by time.
    pub fn record<I>(&mut self, customer: &CustomerId, items: I, at: NaiveDateTime)
    where
        I: IntoIterator<Item = ItemName>,
    {
        let entries = self.entries.entry(customer.clone()).or_default();
        entries.extend(items.into_iter().map(|item| HistoryEntry::new(item, at)));
        entries.sort_by_key(|entry| entry.recommended_at);
    }

    /// Entries for `customer` inside the window ending at `as_of`.
    ///
    /// Events later than `as_of` are ignored so replaying a batch at an
    /// earlier date is not influenced by its own future.
    #[must_use]
    pub fn recent(
        &self,
        customer: &CustomerId,
        as_of: NaiveDateTime,
        window: TimeDelta,
    ) -> Vec<&HistoryEntry> {
        let since = as_of - window;
        self.entries
            .get(customer)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.recommended_at > since && entry.recommended_at <= as_of)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Time since `item` was last recommended to `customer` within the
    /// window, if at all.
    #[must_use]
    pub fn last_recommended(
        &self,
        customer: &CustomerId,
        item: &ItemName,
        as_of: NaiveDateTime,
        window: TimeDelta,
    ) -> Option<TimeDelta> {
        self.recent(customer, as_of, window)
            .into_iter()
            .filter(|entry| &entry.item == item)
            .map(|entry| as_of - entry.recommended_at)
            .min()
    }

    /// Drop entries older than the window ending at `as_of`, and customers
    /// left without entries.
    pub fn prune(&mut self, as_of: NaiveDateTime, window: TimeDelta) {
        let since = as_of - window;
        self.entries.retain(|_, entries| {
            entries.retain(|entry| entry.recommended_at > since);
            !entries.is_empty()
        });
    }

    /// Total number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Report whether no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
