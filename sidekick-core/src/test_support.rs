//! Test-only builders and an in-memory `Recommender` used by unit and
//! behaviour tests.

use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    CustomerId, ItemName, LineItem, Order, OrderId, PartialOrderQuery, Recommendation,
    RecommendationKind, RecommendedItem, Recommender,
};

/// Canonical item name from a literal.
///
/// # Panics
/// Panics when `raw` is blank or a placeholder.
#[must_use]
pub fn item(raw: &str) -> ItemName {
    ItemName::new(raw).expect("test item names are valid")
}

/// Noon on the given day of March 2024.
///
/// # Panics
/// Panics when `day` is not a valid day of March.
#[must_use]
pub fn noon(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .expect("valid March date")
}

/// Single-quantity order placed at noon on `day` of March 2024.
///
/// # Panics
/// Panics when `items` is empty.
#[must_use]
pub fn order(id: &str, day: u32, items: &[&str]) -> Order {
    let lines = items
        .iter()
        .map(|raw| LineItem::new(item(raw), 1, None))
        .collect();
    Order::new(OrderId::new(id), None, None, noon(day), lines).expect("valid test order")
}

/// Like [`order`] but placed by `customer`.
///
/// # Panics
/// Panics when `items` is empty.
#[must_use]
pub fn customer_order(id: &str, customer: &str, day: u32, items: &[&str]) -> Order {
    let lines = items
        .iter()
        .map(|raw| LineItem::new(item(raw), 1, None))
        .collect();
    Order::new(
        OrderId::new(id),
        Some(CustomerId::new(customer)),
        None,
        noon(day),
        lines,
    )
    .expect("valid test order")
}

/// `count` copies of the same basket, numbered from `first_id`.
#[must_use]
pub fn repeated_orders(first_id: usize, count: usize, day: u32, items: &[&str]) -> Vec<Order> {
    (first_id..first_id + count)
        .map(|n| order(&format!("o-{n}"), day, items))
        .collect()
}

/// Query for `items` with the given identifier.
#[must_use]
pub fn query(id: &str, items: &[&str]) -> PartialOrderQuery {
    PartialOrderQuery::new(OrderId::new(id), items.iter().map(|raw| item(raw)).collect())
}

/// `Recommender` returning a fixed list minus the query's known items.
#[derive(Debug, Clone, Default)]
pub struct FixedRecommender {
    items: Vec<ItemName>,
}

impl FixedRecommender {
    /// Recommend `items` in order.
    #[must_use]
    pub fn new(items: &[&str]) -> Self {
        Self {
            items: items.iter().map(|raw| item(raw)).collect(),
        }
    }
}

impl Recommender for FixedRecommender {
    fn recommend(&self, query: &PartialOrderQuery, count: usize) -> Recommendation {
        let items = self
            .items
            .iter()
            .filter(|candidate| !query.contains(candidate))
            .take(count)
            .map(|candidate| {
                RecommendedItem::new(candidate.clone(), 1.0, RecommendationKind::Fallback)
            })
            .collect();
        Recommendation::new(query.id.clone(), items)
    }
}
