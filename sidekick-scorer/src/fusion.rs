//! Score fusion over co-occurrence, rules, complementarity and popularity.
//!
//! For a basket `K` each catalog item `c` outside `K` receives four signals:
//! - **co-occurrence**: `Σ count(k, c)` over `k ∈ K`, divided by the largest
//!   such sum among this query's candidates;
//! - **confidence**: the strongest rule `k → c`;
//! - **complement**: `1.0` when `c`'s category complements the category of
//!   any basket item;
//! - **popularity**: `(N - rank) / N`.
//!
//! The blended score is the weighted mean of the signals. Candidates sort by
//! score and then popularity rank, so output is deterministic.
#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use log::debug;
use sidekick_core::{
    Category, ComplementMap, PartialOrderQuery, Recommendation, RecommendationKind,
    RecommendedItem, Recommender,
};

use crate::{FusionError, FusionWeights, ModelTables};

/// Raw signals computed for one candidate, each in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Signals {
    /// Normalised co-occurrence with the basket.
    pub cooccurrence: f32,
    /// Strongest association rule from a basket item.
    pub confidence: f32,
    /// Category complementarity.
    pub complement: f32,
    /// Global popularity.
    pub popularity: f32,
}

impl Signals {
    /// Signals in the order [`FusionWeights::blend`] expects.
    #[must_use]
    pub const fn as_array(&self) -> [f32; 4] {
        [
            self.cooccurrence,
            self.confidence,
            self.complement,
            self.popularity,
        ]
    }

    /// Report whether anything in the basket supports this candidate.
    #[must_use]
    pub fn has_basket_evidence(&self) -> bool {
        self.cooccurrence > 0.0_f32 || self.confidence > 0.0_f32 || self.complement > 0.0_f32
    }
}

/// A candidate and its fused score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    /// Catalog position of the candidate.
    pub index: usize,
    /// Fused score in `0.0..=1.0`.
    pub score: f32,
    /// Signals the score was blended from.
    pub signals: Signals,
}

impl ScoredCandidate {
    /// Kind reported for this candidate when recommended as-is.
    #[must_use]
    pub fn kind(&self) -> RecommendationKind {
        if self.signals.has_basket_evidence() {
            RecommendationKind::Personalised
        } else {
            RecommendationKind::Fallback
        }
    }
}

/// Every candidate for a query, best first, and whether the query fell back
/// to popularity.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedQuery {
    /// Catalog positions of the query's known items.
    pub known: Vec<usize>,
    /// Candidates outside the basket, best first.
    pub candidates: Vec<ScoredCandidate>,
    /// Set when the basket was invalid or had no catalog items.
    pub flagged: bool,
}

/// Recommend complements by blending the learned tables with static
/// category knowledge.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use chrono::NaiveDate;
/// use sidekick_core::{
///     ComplementMap, ItemName, LineItem, Order, OrderId, PartialOrderQuery, Recommender,
/// };
/// use sidekick_scorer::{FusionRecommender, FusionWeights, ModelTables, TablesConfig};
///
/// let at = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// let name = |raw: &str| ItemName::new(raw).unwrap();
/// let basket = |id: &str, items: &[&str]| {
///     let lines = items.iter().map(|raw| LineItem::new(name(*raw), 1, None)).collect();
///     Order::new(OrderId::new(id), None, None, at, lines).unwrap()
/// };
/// let orders = vec![basket("o-1", &["wings", "cola"]), basket("o-2", &["wings", "cola"])];
/// let tables = Arc::new(ModelTables::build(&orders, &TablesConfig::default()));
/// let recommender =
///     FusionRecommender::new(tables, ComplementMap::default(), FusionWeights::default())
///         .unwrap();
///
/// let query = PartialOrderQuery::new(OrderId::new("q-1"), vec![name("wings")]);
/// let recommendation = recommender.recommend(&query, 3);
/// assert_eq!(recommendation.items[0].item.as_str(), "cola");
/// ```
#[derive(Debug, Clone)]
pub struct FusionRecommender {
    tables: Arc<ModelTables>,
    complements: ComplementMap,
    weights: FusionWeights,
}

impl FusionRecommender {
    /// Create a recommender over shared tables.
    ///
    /// # Errors
    /// Returns [`FusionError::InvalidWeights`] when `weights` are unusable.
    pub fn new(
        tables: Arc<ModelTables>,
        complements: ComplementMap,
        weights: FusionWeights,
    ) -> Result<Self, FusionError> {
        weights.validate()?;
        Ok(Self {
            tables,
            complements,
            weights,
        })
    }

    /// Tables the recommender scores against.
    #[must_use]
    pub fn tables(&self) -> &ModelTables {
        &self.tables
    }

    /// Default weights used by [`Recommender::recommend`].
    #[must_use]
    pub const fn weights(&self) -> FusionWeights {
        self.weights
    }

    /// Catalog positions of `query`'s known items, in basket order and
    /// without duplicates. Items outside the catalog are dropped.
    #[must_use]
    pub fn known_positions(&self, query: &PartialOrderQuery) -> Vec<usize> {
        let mut seen = BTreeSet::new();
        query
            .known
            .iter()
            .filter_map(|item| self.tables.catalog.position(item))
            .filter(|position| seen.insert(*position))
            .collect()
    }

    /// Score and order every candidate for `query` under `weights`.
    ///
    /// Invalid queries and baskets without catalog items are ranked by
    /// popularity alone and flagged.
    #[must_use]
    pub fn rank_query(&self, query: &PartialOrderQuery, weights: &FusionWeights) -> RankedQuery {
        if let Err(err) = query.validate() {
            debug!("{err}; falling back to popularity");
            return RankedQuery {
                known: Vec::new(),
                candidates: self.rank_by_popularity(&[]),
                flagged: true,
            };
        }
        let known = self.known_positions(query);
        if known.is_empty() {
            debug!(
                "query {} has no catalog items; falling back to popularity",
                query.id
            );
            return RankedQuery {
                known,
                candidates: self.rank_by_popularity(&[]),
                flagged: true,
            };
        }
        let candidates = self.rank_candidates(&known, weights);
        RankedQuery {
            known,
            candidates,
            flagged: false,
        }
    }

    /// Score every catalog item outside `known`, best first.
    #[must_use]
    pub fn rank_candidates(&self, known: &[usize], weights: &FusionWeights) -> Vec<ScoredCandidate> {
        let catalog = &self.tables.catalog;
        let present: Vec<Category> = known
            .iter()
            .filter_map(|&position| catalog.get(position).map(|entry| entry.category))
            .collect();

        let raw: Vec<(usize, u32)> = (0..catalog.len())
            .filter(|position| !known.contains(position))
            .map(|candidate| {
                let total = known.iter().fold(0_u32, |sum, &basket_item| {
                    sum.saturating_add(self.tables.cooccurrence.count(basket_item, candidate))
                });
                (candidate, total)
            })
            .collect();
        let max_cooccurrence = raw.iter().map(|&(_, total)| total).max().unwrap_or(0);

        let mut scored: Vec<ScoredCandidate> = raw
            .into_iter()
            .map(|(index, total)| {
                let signals = Signals {
                    cooccurrence: normalise(total, max_cooccurrence),
                    confidence: known
                        .iter()
                        .map(|&basket_item| self.tables.rules.confidence(basket_item, index))
                        .fold(0.0_f32, f32::max),
                    complement: complement_signal(
                        &self.complements,
                        &present,
                        catalog.get(index).map(|entry| entry.category),
                    ),
                    popularity: catalog.popularity(index),
                };
                ScoredCandidate {
                    index,
                    score: <Self as Recommender>::sanitise(weights.blend(signals.as_array())),
                    signals,
                }
            })
            .collect();
        sort_candidates(&mut scored);
        scored
    }

    /// Catalog items outside `known` scored by popularity alone.
    #[must_use]
    pub fn rank_by_popularity(&self, known: &[usize]) -> Vec<ScoredCandidate> {
        let catalog = &self.tables.catalog;
        (0..catalog.len())
            .filter(|position| !known.contains(position))
            .map(|index| {
                let popularity = catalog.popularity(index);
                ScoredCandidate {
                    index,
                    score: popularity,
                    signals: Signals {
                        popularity,
                        ..Signals::default()
                    },
                }
            })
            .collect()
    }

    /// Materialise the catalog item at `index` as a recommended item of `kind`.
    #[must_use]
    pub fn to_item(&self, index: usize, score: f32, kind: RecommendationKind) -> Option<RecommendedItem> {
        self.tables.catalog.get(index).map(|entry| {
            RecommendedItem::new(
                entry.name.clone(),
                <Self as Recommender>::sanitise(score),
                kind,
            )
        })
    }

    /// Recommend `count` items for `query` under `weights`.
    #[must_use]
    pub fn recommend_with(
        &self,
        query: &PartialOrderQuery,
        count: usize,
        weights: &FusionWeights,
    ) -> Recommendation {
        let ranked = self.rank_query(query, weights);
        let items = ranked
            .candidates
            .iter()
            .take(count)
            .filter_map(|candidate| {
                let kind = if ranked.flagged {
                    RecommendationKind::Fallback
                } else {
                    candidate.kind()
                };
                self.to_item(candidate.index, candidate.score, kind)
            })
            .collect();
        let recommendation = Recommendation::new(query.id.clone(), items);
        if ranked.flagged {
            recommendation.flagged()
        } else {
            recommendation
        }
    }
}

impl Recommender for FusionRecommender {
    fn recommend(&self, query: &PartialOrderQuery, count: usize) -> Recommendation {
        self.recommend_with(query, count, &self.weights)
    }
}

/// Sort by descending score, then ascending popularity rank.
pub(crate) fn sort_candidates(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(|left, right| {
        right
            .score
            .total_cmp(&left.score)
            .then_with(|| left.index.cmp(&right.index))
    });
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "co-occurrence is normalised by the per-query maximum"
)]
fn normalise(total: u32, max: u32) -> f32 {
    if max == 0 {
        return 0.0_f32;
    }
    total as f32 / max as f32
}

fn complement_signal(map: &ComplementMap, present: &[Category], candidate: Option<Category>) -> f32 {
    match candidate {
        Some(category) if map.complements_any(present, category) => 1.0_f32,
        _ => 0.0_f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use sidekick_core::test_support::{query, repeated_orders};

    use crate::TablesConfig;

    #[fixture]
    fn recommender() -> FusionRecommender {
        let mut orders = repeated_orders(0, 10, 1, &["wings", "fries", "cola"]);
        orders.extend(repeated_orders(10, 5, 1, &["wings", "ranch dip"]));
        orders.extend(repeated_orders(15, 1, 1, &["brownie"]));
        let tables = Arc::new(ModelTables::build(&orders, &TablesConfig::default()));
        FusionRecommender::new(tables, ComplementMap::default(), FusionWeights::default())
            .expect("default weights are valid")
    }

    fn names(recommendation: &Recommendation) -> Vec<String> {
        recommendation.names().map(ToString::to_string).collect()
    }

    #[rstest]
    fn wings_pull_in_their_companions(recommender: FusionRecommender) {
        let recommendation = recommender.recommend(&query("q-1", &["wings"]), 3);
        assert_eq!(names(&recommendation), vec!["cola", "fries", "ranch dip"]);
        assert!(!recommendation.flagged);
        assert!(
            recommendation
                .items
                .iter()
                .all(|item| item.kind == RecommendationKind::Personalised)
        );
    }

    #[rstest]
    fn capitalised_names_do_not_win_ties() {
        let mut orders = repeated_orders(0, 10, 1, &["wings", "Fries", "cola"]);
        orders.extend(repeated_orders(10, 5, 1, &["wings", "ranch"]));
        let tables = Arc::new(ModelTables::build(&orders, &TablesConfig::default()));
        let recommender =
            FusionRecommender::new(tables, ComplementMap::default(), FusionWeights::default())
                .expect("default weights are valid");
        let recommendation = recommender.recommend(&query("q-1", &["wings"]), 3);
        assert_eq!(names(&recommendation), vec!["cola", "Fries", "ranch"]);
    }

    #[rstest]
    fn unknown_baskets_fall_back_to_popularity(recommender: FusionRecommender) {
        let recommendation = recommender.recommend(&query("q-2", &["mystery meat"]), 3);
        assert_eq!(names(&recommendation), vec!["wings", "cola", "fries"]);
        assert!(recommendation.flagged);
    }

    #[rstest]
    fn empty_baskets_are_flagged(recommender: FusionRecommender) {
        let recommendation = recommender.recommend(&query("q-3", &[]), 3);
        assert!(recommendation.flagged);
        assert_eq!(recommendation.len(), 3);
    }

    #[rstest]
    fn known_items_are_never_recommended(recommender: FusionRecommender) {
        let recommendation = recommender.recommend(&query("q-4", &["wings", "cola", "fries"]), 3);
        assert_eq!(names(&recommendation), vec!["ranch dip", "brownie"]);
    }

    #[rstest]
    fn unknown_items_add_no_signal(recommender: FusionRecommender) {
        let plain = recommender.recommend(&query("q-5", &["wings"]), 3);
        let noisy = recommender.recommend(&query("q-6", &["wings", "mystery meat"]), 3);
        assert_eq!(names(&plain), names(&noisy));
        assert!(!noisy.flagged);
    }

    #[rstest]
    #[expect(clippy::float_arithmetic, reason = "test compares float signals")]
    fn co_occurrence_is_normalised_per_query(recommender: FusionRecommender) {
        let known = recommender.known_positions(&query("q-7", &["wings"]));
        let ranked = recommender.rank_candidates(&known, &FusionWeights::default());
        let top = ranked.first().expect("candidates");
        assert!((top.signals.cooccurrence - 1.0_f32).abs() < f32::EPSILON);
        assert!(ranked.iter().all(|candidate| (0.0_f32..=1.0_f32).contains(&candidate.score)));
    }

    #[rstest]
    fn popularity_only_weights_follow_rank(recommender: FusionRecommender) {
        let weights = FusionWeights::new(0.0_f32, 0.0_f32, 0.0_f32, 1.0_f32).expect("valid");
        let recommendation = recommender.recommend_with(&query("q-8", &["cola"]), 3, &weights);
        assert_eq!(names(&recommendation), vec!["wings", "fries", "ranch dip"]);
    }
}
