//! Facade crate for the Sidekick recommendation engine.
//!
//! This crate re-exports the domain types, the scoring engine and, behind the
//! `data` feature, the CSV and history-log adapters.

#![forbid(unsafe_code)]

pub use sidekick_core::{
    Category, CategoryRules, Channel, ComplementMap, CustomerDirectory, CustomerId,
    CustomerProfile, ItemName, Order, OrderId, PartialOrderQuery, Persona, Recommendation,
    RecommendationHistory, RecommendationKind, RecommendedItem, Recommender, StoreId,
};

pub use sidekick_scorer::{
    EvaluationReport, Evaluator, FreshnessPolicy, FusionRecommender, FusionWeights, ModelTables,
    PersonaWeights, ProductionConfig, ProductionRecommender, TablesConfig, read_tables,
    write_tables,
};

#[cfg(feature = "data")]
pub use sidekick_data::{
    HistoryLog, QueryBatch, QueryLayout, RecommendationRow, read_customers, read_orders,
    read_queries, read_stores, write_recommendations,
};
