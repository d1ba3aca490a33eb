//! Ranked recommendation results.

use crate::{ItemName, OrderId};

/// Why an item made it into a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RecommendationKind {
    /// Ranked by the fused basket signals.
    #[default]
    Personalised,
    /// Injected because it is selling well right now.
    Trending,
    /// Injected from the seasonal calendar.
    Seasonal,
    /// Padding from the popularity ranking.
    Fallback,
}

impl RecommendationKind {
    /// Return the kind as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Personalised => "personalised",
            Self::Trending => "trending",
            Self::Seasonal => "seasonal",
            Self::Fallback => "fallback",
        }
    }
}

/// A single recommended item.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendedItem {
    /// The recommended catalog item.
    pub item: ItemName,
    /// Fused score in `0.0..=1.0`.
    pub score: f32,
    /// How the item was selected.
    pub kind: RecommendationKind,
}

impl RecommendedItem {
    /// Build a recommended item.
    #[must_use]
    pub const fn new(item: ItemName, score: f32, kind: RecommendationKind) -> Self {
        Self { item, score, kind }
    }
}

/// Ordered recommendations for one partial order.
///
/// `flagged` marks rows that could not be scored on their own basket, such
/// as queries with no known items, and were answered from popularity alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// Query this answers.
    pub query: OrderId,
    /// Best first.
    pub items: Vec<RecommendedItem>,
    /// Whether the row fell back to popularity.
    pub flagged: bool,
}

impl Recommendation {
    /// Build an unflagged recommendation.
    #[must_use]
    pub const fn new(query: OrderId, items: Vec<RecommendedItem>) -> Self {
        Self {
            query,
            items,
            flagged: false,
        }
    }

    /// Mark the recommendation as a popularity fallback.
    #[must_use]
    pub const fn flagged(mut self) -> Self {
        self.flagged = true;
        self
    }

    /// Iterate over the recommended item names, best first.
    pub fn names(&self) -> impl Iterator<Item = &ItemName> {
        self.items.iter().map(|rec| &rec.item)
    }

    /// Report whether `item` appears among the first `k` recommendations,
    /// comparing trimmed, lower-cased names.
    ///
    /// # Examples
    /// ```
    /// use sidekick_core::{ItemName, OrderId, Recommendation, RecommendationKind, RecommendedItem};
    ///
    /// let cola = ItemName::new("Cola").unwrap();
    /// let rec = Recommendation::new(
    ///     OrderId::new("o-1"),
    ///     vec![RecommendedItem::new(cola, 0.9, RecommendationKind::Personalised)],
    /// );
    /// assert!(rec.hits(&ItemName::new(" cola ").unwrap(), 3));
    /// ```
    #[must_use]
    pub fn hits(&self, item: &ItemName, k: usize) -> bool {
        let folded = item.folded();
        self.names().take(k).any(|name| name.folded() == folded)
    }

    /// Names padded with empty strings to exactly `slots` entries.
    #[must_use]
    pub fn slot_names(&self, slots: usize) -> Vec<String> {
        let mut names: Vec<String> = self
            .names()
            .take(slots)
            .map(|name| name.as_str().to_owned())
            .collect();
        names.resize(slots, String::new());
        names
    }

    /// Number of recommended items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Report whether nothing was recommended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::item;

    fn sample() -> Recommendation {
        Recommendation::new(
            OrderId::new("o-1"),
            vec![
                RecommendedItem::new(item("cola"), 0.8, RecommendationKind::Personalised),
                RecommendedItem::new(item("fries"), 0.6, RecommendationKind::Trending),
            ],
        )
    }

    #[test]
    fn hits_respects_cutoff() {
        let rec = sample();
        assert!(rec.hits(&item("Fries"), 2));
        assert!(!rec.hits(&item("fries"), 1));
    }

    #[test]
    fn slot_names_pad_missing_slots() {
        assert_eq!(sample().slot_names(3), vec!["cola", "fries", ""]);
    }

    #[test]
    fn flagged_marks_fallback_rows() {
        let rec = sample().flagged();
        assert!(rec.flagged);
        assert_eq!(rec.len(), 2);
    }
}
