//! Directional association rules mined from co-occurrence counts.
#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::CooccurrenceTable;

/// Minimum pair count a rule needs to be kept.
pub const DEFAULT_MIN_SUPPORT: u32 = 2;

/// Confidence of `A → B`, i.e. the share of orders containing `A` that also
/// contain `B`.
///
/// Rules are directional: `confidence(a, b)` and `confidence(b, a)` differ
/// whenever the two items appear in different numbers of orders. Self-rules
/// are never produced.
///
/// # Examples
/// ```
/// use sidekick_scorer::{AssociationRules, CooccurrenceTable};
///
/// let baskets = vec![vec![0, 1], vec![0, 1], vec![0], vec![0]];
/// let rules = AssociationRules::mine(&CooccurrenceTable::build(&baskets, 2), 2);
/// assert!((rules.confidence(0, 1) - 0.5).abs() < f32::EPSILON);
/// assert!((rules.confidence(1, 0) - 1.0).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssociationRules {
    consequents: Vec<BTreeMap<usize, f32>>,
    min_support: u32,
}

impl AssociationRules {
    /// Derive rules from `table`, discarding pairs seen in fewer than
    /// `min_support` orders.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "confidence is a ratio of order counts"
    )]
    pub fn mine(table: &CooccurrenceTable, min_support: u32) -> Self {
        let consequents = (0..table.item_count())
            .map(|antecedent| {
                let base = table.orders_containing(antecedent);
                if base == 0 {
                    return BTreeMap::new();
                }
                table
                    .neighbours(antecedent)
                    .filter(|&(consequent, count)| {
                        consequent != antecedent && count >= min_support.max(1)
                    })
                    .map(|(consequent, count)| (consequent, count as f32 / base as f32))
                    .collect()
            })
            .collect();
        Self {
            consequents,
            min_support,
        }
    }

    /// Confidence of `antecedent → consequent`, or `0.0` when no rule exists.
    #[must_use]
    pub fn confidence(&self, antecedent: usize, consequent: usize) -> f32 {
        self.consequents
            .get(antecedent)
            .and_then(|row| row.get(&consequent))
            .copied()
            .unwrap_or(0.0_f32)
    }

    /// Rules with `antecedent` on the left-hand side.
    pub fn rules_from(&self, antecedent: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.consequents
            .get(antecedent)
            .into_iter()
            .flat_map(|row| row.iter().map(|(&consequent, &confidence)| (consequent, confidence)))
    }

    /// Total number of rules kept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.consequents.iter().map(BTreeMap::len).sum()
    }

    /// Report whether no rule survived the support threshold.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Support threshold the rules were mined with.
    #[must_use]
    pub const fn min_support(&self) -> u32 {
        self.min_support
    }
}
