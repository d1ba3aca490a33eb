//! Core domain types for the Sidekick recommendation engine.
//!
//! These models describe historical orders, the items they contain and the
//! partial orders we are asked to complete. Constructors validate their
//! input and return `Result` so malformed data surfaces early, before any
//! statistics are built from it.
//!
//! The [`Recommender`] trait is the seam between these types and the scoring
//! engine in `sidekick-scorer`.

#![forbid(unsafe_code)]

pub mod category;
pub mod complement;
pub mod customer;
pub mod history;
pub mod item;
pub mod order;
pub mod query;
pub mod recommendation;
pub mod recommender;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use category::{Category, CategoryRules};
pub use complement::ComplementMap;
pub use customer::{
    Channel, CustomerDirectory, CustomerId, CustomerProfile, CustomerType, Persona, StoreId,
    StoreProfile,
};
pub use history::{DEFAULT_HISTORY_DAYS, HistoryEntry, RecommendationHistory};
pub use item::{ItemName, ItemNameError};
pub use order::{LineItem, Order, OrderError, OrderId};
pub use query::{PartialOrderQuery, QueryError};
pub use recommendation::{Recommendation, RecommendationKind, RecommendedItem};
pub use recommender::Recommender;

/// Number of recommendations written for every evaluated order.
pub const RECOMMENDATION_SLOTS: usize = 3;
