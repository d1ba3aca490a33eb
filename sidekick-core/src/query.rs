//! Partial orders awaiting completion.

use thiserror::Error;

use crate::{CustomerId, ItemName, OrderId, StoreId};

/// A partial order whose missing items we are asked to predict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialOrderQuery {
    /// Order identifier, echoed in the output.
    pub id: OrderId,
    /// Customer placing the order, when known.
    pub customer: Option<CustomerId>,
    /// Store the order is placed at, when known.
    pub store: Option<StoreId>,
    /// Items already in the basket, in input column order.
    pub known: Vec<ItemName>,
    /// Held-out item used for evaluation only.
    pub expected_missing: Option<ItemName>,
}

/// Errors returned by [`PartialOrderQuery::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The query listed no usable items.
    #[error("query {id} has no known items")]
    EmptyKnownItems {
        /// Identifier of the offending query.
        id: OrderId,
    },
}

impl PartialOrderQuery {
    /// Create a query without customer, store or ground truth.
    #[must_use]
    pub const fn new(id: OrderId, known: Vec<ItemName>) -> Self {
        Self {
            id,
            customer: None,
            store: None,
            known,
            expected_missing: None,
        }
    }

    /// Attach a customer.
    #[must_use]
    pub fn with_customer(mut self, customer: CustomerId) -> Self {
        self.customer = Some(customer);
        self
    }

    /// Attach a store.
    #[must_use]
    pub fn with_store(mut self, store: StoreId) -> Self {
        self.store = Some(store);
        self
    }

    /// Attach the held-out item.
    #[must_use]
    pub fn with_expected_missing(mut self, item: ItemName) -> Self {
        self.expected_missing = Some(item);
        self
    }

    /// Check the query can be scored on its own items.
    ///
    /// Callers that receive an error still produce an output row, falling
    /// back to popularity, so every input row is answered.
    ///
    /// # Errors
    /// Returns [`QueryError::EmptyKnownItems`] when `known` is empty.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.known.is_empty() {
            return Err(QueryError::EmptyKnownItems {
                id: self.id.clone(),
            });
        }
        Ok(())
    }

    /// Report whether `item` is already in the basket, ignoring case.
    #[must_use]
    pub fn contains(&self, item: &ItemName) -> bool {
        let folded = item.folded();
        self.known.iter().any(|known| known.folded() == folded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::item;

    #[test]
    fn empty_queries_fail_validation() {
        let query = PartialOrderQuery::new(OrderId::new("q-1"), Vec::new());
        assert_eq!(
            query.validate(),
            Err(QueryError::EmptyKnownItems {
                id: OrderId::new("q-1")
            })
        );
    }

    #[test]
    fn contains_ignores_case() {
        let query = PartialOrderQuery::new(OrderId::new("q-2"), vec![item("Ranch Dip")]);
        assert!(query.validate().is_ok());
        assert!(query.contains(&item("ranch dip")));
        assert!(!query.contains(&item("cola")));
    }

    #[test]
    fn builders_attach_optional_fields() {
        let query = PartialOrderQuery::new(OrderId::new("q-3"), vec![item("wings")])
            .with_customer(CustomerId::new("c-1"))
            .with_store(StoreId::new("42"))
            .with_expected_missing(item("cola"));
        assert_eq!(query.customer, Some(CustomerId::new("c-1")));
        assert_eq!(query.store, Some(StoreId::new("42")));
        assert_eq!(query.expected_missing, Some(item("cola")));
    }
}
