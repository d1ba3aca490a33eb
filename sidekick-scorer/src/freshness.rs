//! Re-rank candidates so customers are not shown the same items twice.
//!
//! Recently recommended items are penalised in proportion to how recently
//! they were shown. Selection then prefers items outside the history and
//! only falls back to history items when nothing else with a score is left.
//! A final pass can swap in one trending and one seasonal item.
#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use chrono::TimeDelta;
use sidekick_core::{DEFAULT_HISTORY_DAYS, RecommendationKind};

use crate::{DEFAULT_TRENDING_DAYS, FusionError, ScoredCandidate};

/// Settings for the freshness filter and post-processing injection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreshnessPolicy {
    /// How far back recommendations count as recent.
    pub window: TimeDelta,
    /// Share of the score removed for an item shown just now, in `0.0..=1.0`.
    pub strength: f32,
    /// Look-back for trending detection.
    pub trending_window: TimeDelta,
    /// Swap in a trending item when none was selected.
    pub inject_trending: bool,
    /// Swap in a seasonal item when none was selected.
    pub inject_seasonal: bool,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            window: TimeDelta::days(DEFAULT_HISTORY_DAYS),
            strength: 0.9_f32,
            trending_window: TimeDelta::days(DEFAULT_TRENDING_DAYS),
            inject_trending: true,
            inject_seasonal: true,
        }
    }
}

/// An item chosen by the filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreshPick {
    /// Catalog position.
    pub index: usize,
    /// Score after the freshness penalty.
    pub score: f32,
    /// Why the item was chosen.
    pub kind: RecommendationKind,
}

impl FreshPick {
    const fn is_injected(&self) -> bool {
        matches!(
            self.kind,
            RecommendationKind::Trending | RecommendationKind::Seasonal
        )
    }
}

static NO_HISTORY: BTreeMap<usize, TimeDelta> = BTreeMap::new();

/// Inputs describing what the filter must avoid and what it may inject.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessContext<'a> {
    /// Catalog positions already in the basket.
    pub known: &'a [usize],
    /// Age of the latest recommendation of each recently shown item.
    pub recent: &'a BTreeMap<usize, TimeDelta>,
    /// Trending items, best first.
    pub trending: &'a [usize],
    /// Seasonal items, best first.
    pub seasonal: &'a [usize],
}

impl Default for FreshnessContext<'_> {
    fn default() -> Self {
        Self {
            known: &[],
            recent: &NO_HISTORY,
            trending: &[],
            seasonal: &[],
        }
    }
}

impl FreshnessPolicy {
    /// Policy with both injections switched off.
    #[must_use]
    pub const fn without_injection(self) -> Self {
        Self {
            inject_trending: false,
            inject_seasonal: false,
            ..self
        }
    }

    /// Check the windows are positive and the strength is a finite share.
    ///
    /// # Errors
    /// Returns [`FusionError::InvalidFreshness`] naming the rejected setting.
    pub fn validate(&self) -> Result<(), FusionError> {
        if self.window <= TimeDelta::zero() {
            return Err(FusionError::InvalidFreshness {
                reason: "history window must be positive",
            });
        }
        if self.trending_window <= TimeDelta::zero() {
            return Err(FusionError::InvalidFreshness {
                reason: "trending window must be positive",
            });
        }
        if !self.strength.is_finite() || !(0.0_f32..=1.0_f32).contains(&self.strength) {
            return Err(FusionError::InvalidFreshness {
                reason: "strength must lie in 0.0..=1.0",
            });
        }
        Ok(())
    }

    /// Score after penalising an item last shown `age` ago.
    ///
    /// `recency` falls linearly from `1.0` for an item shown now to `0.0` at
    /// the window edge, and the score is scaled by `1 - strength * recency`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "the penalty is a linear decay over the window"
    )]
    pub fn penalise(&self, score: f32, age: TimeDelta) -> f32 {
        let window = self.window.num_seconds();
        if window <= 0 {
            return score;
        }
        let elapsed = age.num_seconds().max(0);
        let recency = (1.0_f32 - elapsed as f32 / window as f32).clamp(0.0_f32, 1.0_f32);
        score * (1.0_f32 - self.strength * recency)
    }

    /// Choose `count` items from `candidates`, which must already be sorted
    /// best first.
    #[must_use]
    pub fn select(
        &self,
        candidates: &[ScoredCandidate],
        context: &FreshnessContext<'_>,
        count: usize,
    ) -> Vec<FreshPick> {
        let mut rescored: Vec<(FreshPick, bool)> = candidates
            .iter()
            .filter(|candidate| !context.known.contains(&candidate.index))
            .map(|candidate| {
                let age = context.recent.get(&candidate.index);
                let score = age.map_or(candidate.score, |&shown| self.penalise(candidate.score, shown));
                let pick = FreshPick {
                    index: candidate.index,
                    score,
                    kind: candidate.kind(),
                };
                (pick, age.is_some())
            })
            .collect();
        rescored.sort_by(|(left, _), (right, _)| {
            right
                .score
                .total_cmp(&left.score)
                .then_with(|| left.index.cmp(&right.index))
        });

        let (preferred, rest): (Vec<_>, Vec<_>) = rescored
            .into_iter()
            .partition(|(pick, in_history)| !in_history && pick.score > 0.0_f32);
        let mut selected: Vec<FreshPick> = preferred
            .into_iter()
            .chain(rest)
            .map(|(pick, _)| pick)
            .take(count)
            .collect();

        if self.inject_trending {
            inject(&mut selected, context, context.trending, RecommendationKind::Trending, count);
        }
        if self.inject_seasonal {
            inject(&mut selected, context, context.seasonal, RecommendationKind::Seasonal, count);
        }
        selected
    }
}

fn inject(
    selected: &mut Vec<FreshPick>,
    context: &FreshnessContext<'_>,
    pool: &[usize],
    kind: RecommendationKind,
    count: usize,
) {
    if count == 0 || selected.iter().any(|pick| pool.contains(&pick.index)) {
        return;
    }
    let Some(&index) = pool.iter().find(|&&index| {
        !context.known.contains(&index)
            && !context.recent.contains_key(&index)
            && selected.iter().all(|pick| pick.index != index)
    }) else {
        return;
    };
    let injected = FreshPick {
        index,
        score: 0.0_f32,
        kind,
    };
    if selected.len() < count {
        selected.push(injected);
        return;
    }
    let weakest = selected
        .iter()
        .enumerate()
        .filter(|(_, pick)| !pick.is_injected())
        .min_by(|(left_slot, left), (right_slot, right)| {
            left.score
                .total_cmp(&right.score)
                .then_with(|| right_slot.cmp(left_slot))
        })
        .map(|(slot, _)| slot);
    if let Some(slot) = weakest
        && let Some(target) = selected.get_mut(slot)
    {
        *target = FreshPick {
            score: target.score,
            ..injected
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    use crate::Signals;

    fn candidate(index: usize, score: f32) -> ScoredCandidate {
        ScoredCandidate {
            index,
            score,
            signals: Signals {
                cooccurrence: score,
                ..Signals::default()
            },
        }
    }

    #[fixture]
    fn candidates() -> Vec<ScoredCandidate> {
        vec![
            candidate(1, 0.9_f32),
            candidate(2, 0.8_f32),
            candidate(3, 0.5_f32),
            candidate(4, 0.0_f32),
        ]
    }

    fn indices(picks: &[FreshPick]) -> Vec<usize> {
        picks.iter().map(|pick| pick.index).collect()
    }

    #[rstest]
    #[case(TimeDelta::zero(), 0.1_f32)]
    #[case(TimeDelta::days(7), 1.0_f32)]
    #[case(TimeDelta::days(30), 1.0_f32)]
    #[expect(clippy::float_arithmetic, reason = "test compares float scores")]
    fn penalty_decays_over_the_window(#[case] age: TimeDelta, #[case] expected: f32) {
        let policy = FreshnessPolicy::default();
        assert!((policy.penalise(1.0_f32, age) - expected).abs() < 1e-5_f32);
    }

    #[rstest]
    fn history_items_give_way(candidates: Vec<ScoredCandidate>) {
        let recent = BTreeMap::from([(1, TimeDelta::days(1)), (2, TimeDelta::days(1))]);
        let context = FreshnessContext {
            recent: &recent,
            ..FreshnessContext::default()
        };
        let picks = FreshnessPolicy::default()
            .without_injection()
            .select(&candidates, &context, 3);
        assert_eq!(indices(&picks).first(), Some(&3));
        assert_eq!(picks.len(), 3);
    }

    #[rstest]
    fn history_items_fill_cold_starts(candidates: Vec<ScoredCandidate>) {
        let recent = BTreeMap::from([
            (1, TimeDelta::days(1)),
            (2, TimeDelta::days(1)),
            (3, TimeDelta::days(1)),
        ]);
        let context = FreshnessContext {
            recent: &recent,
            ..FreshnessContext::default()
        };
        let picks = FreshnessPolicy::default()
            .without_injection()
            .select(&candidates, &context, 3);
        assert_eq!(indices(&picks), vec![1, 2, 3]);
    }

    #[rstest]
    fn trending_replaces_the_weakest(candidates: Vec<ScoredCandidate>) {
        let recent = BTreeMap::new();
        let context = FreshnessContext {
            recent: &recent,
            trending: &[4],
            ..FreshnessContext::default()
        };
        let policy = FreshnessPolicy {
            inject_seasonal: false,
            ..FreshnessPolicy::default()
        };
        let picks = policy.select(&candidates, &context, 3);
        assert_eq!(indices(&picks), vec![1, 2, 4]);
        assert_eq!(picks.last().map(|pick| pick.kind), Some(RecommendationKind::Trending));
    }

    #[rstest]
    fn selected_trending_items_need_no_injection(candidates: Vec<ScoredCandidate>) {
        let recent = BTreeMap::new();
        let context = FreshnessContext {
            recent: &recent,
            trending: &[2, 4],
            seasonal: &[3],
            ..FreshnessContext::default()
        };
        let picks = FreshnessPolicy::default().select(&candidates, &context, 3);
        assert_eq!(indices(&picks), vec![1, 2, 3]);
    }

    #[rstest]
    fn injections_skip_known_and_history_items(candidates: Vec<ScoredCandidate>) {
        let recent = BTreeMap::from([(5, TimeDelta::days(2))]);
        let context = FreshnessContext {
            known: &[6],
            recent: &recent,
            trending: &[6, 5, 7],
            seasonal: &[8],
        };
        let picks = FreshnessPolicy::default().select(&candidates, &context, 3);
        assert_eq!(indices(&picks), vec![1, 8, 7]);
        let kinds: Vec<_> = picks.iter().map(|pick| pick.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RecommendationKind::Personalised,
                RecommendationKind::Seasonal,
                RecommendationKind::Trending
            ]
        );
    }

    #[rstest]
    fn short_lists_grow_instead_of_replacing() {
        let recent = BTreeMap::new();
        let context = FreshnessContext {
            recent: &recent,
            trending: &[9],
            ..FreshnessContext::default()
        };
        let picks = FreshnessPolicy::default().select(&[candidate(1, 0.5_f32)], &context, 3);
        assert_eq!(indices(&picks), vec![1, 9]);
    }

    #[rstest]
    #[case(FreshnessPolicy { window: TimeDelta::zero(), ..FreshnessPolicy::default() })]
    #[case(FreshnessPolicy { trending_window: TimeDelta::days(-1), ..FreshnessPolicy::default() })]
    #[case(FreshnessPolicy { strength: 1.5_f32, ..FreshnessPolicy::default() })]
    #[case(FreshnessPolicy { strength: f32::NAN, ..FreshnessPolicy::default() })]
    fn rejects_unusable_policies(#[case] policy: FreshnessPolicy) {
        assert!(matches!(
            policy.validate(),
            Err(FusionError::InvalidFreshness { .. })
        ));
    }
}
