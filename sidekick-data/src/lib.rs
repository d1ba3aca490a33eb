//! Data access for the Sidekick recommendation engine.
//!
//! Responsibilities:
//! - Load orders, customers, stores and partial-order queries from CSV.
//! - Write the recommendation table.
//! - Persist delivered recommendations in a `SQLite` log.
//!
//! Boundaries:
//! - Do not encode scoring rules (live in `sidekick-scorer`).
//! - Domain validation lives in `sidekick-core`; this crate only maps cells
//!   onto its constructors.
//!
//! Invariants:
//! - A malformed row never aborts a load; it is logged and counted.
//! - No global mutable state.
#![forbid(unsafe_code)]

pub mod history_log;
pub mod ingest;
pub mod output;

pub use history_log::{HistoryLog, HistoryLogError};
pub use ingest::{
    IngestError, IngestReport, IngestSummary, QueryBatch, QueryLayout, QueryRow, parse_timestamp,
    read_customers,
    read_customers_from, read_orders, read_orders_from, read_queries, read_queries_from,
    read_stores, read_stores_from,
};
pub use output::{OutputError, RecommendationRow, write_recommendations, write_recommendations_to};
