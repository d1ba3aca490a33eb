//! Complete partial orders.
//!
//! The `Recommender` trait predicts the items most likely missing from a
//! [`PartialOrderQuery`](crate::PartialOrderQuery).

use crate::{PartialOrderQuery, Recommendation};

/// Predict missing items for a partial order.
///
/// Implementations must be thread-safe (`Send` + `Sync`) because the
/// statistics they read are immutable once built. The method is infallible:
/// queries that cannot be scored on their basket are answered from a
/// fallback and returned with [`Recommendation::flagged`] set.
///
/// Implementations must:
/// - Return at most `count` distinct items, none of which are in the
///   query's known items.
/// - Return exactly `count` items whenever the catalog holds that many items
///   outside the basket.
/// - Produce finite scores in `0.0..=1.0`; use [`Recommender::sanitise`].
///
/// # Examples
///
/// ```rust
/// use sidekick_core::{
///     ItemName, OrderId, PartialOrderQuery, Recommendation, RecommendationKind,
///     RecommendedItem, Recommender,
/// };
///
/// struct AlwaysCola;
///
/// impl Recommender for AlwaysCola {
///     fn recommend(&self, query: &PartialOrderQuery, _count: usize) -> Recommendation {
///         let cola = ItemName::new("cola").unwrap();
///         let items = vec![RecommendedItem::new(cola, 1.0, RecommendationKind::Fallback)];
///         Recommendation::new(query.id.clone(), items)
///     }
/// }
///
/// let query = PartialOrderQuery::new(OrderId::new("o-1"), vec![ItemName::new("wings").unwrap()]);
/// assert_eq!(AlwaysCola.recommend(&query, 3).len(), 1);
/// ```
pub trait Recommender: Send + Sync {
    /// Return up to `count` recommendations for `query`, best first.
    fn recommend(&self, query: &PartialOrderQuery, count: usize) -> Recommendation;

    /// Clamp and validate a raw score.
    ///
    /// Returns `0.0` for non-finite values and clamps to `0.0..=1.0`.
    fn sanitise(score: f32) -> f32
    where
        Self: Sized,
    {
        if !score.is_finite() {
            return 0.0;
        }
        score.clamp(0.0, 1.0)
    }
}
