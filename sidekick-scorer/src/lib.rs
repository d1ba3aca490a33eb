//! Scoring engine for Sidekick complementary-item recommendations.
//!
//! The crate has two phases:
//! - **Offline table building** walks training orders once and produces
//!   immutable [`ModelTables`]: a popularity-ranked [`Catalog`], symmetric
//!   pair counts, directional association rules and a daily sales timeline.
//!   Tables can be persisted to `tables.bin` via `bincode`.
//! - **Request-time scoring** blends four signals per candidate in
//!   [`FusionRecommender`], which implements the
//!   [`Recommender`](sidekick_core::Recommender) trait. The
//!   [`ProductionRecommender`] layers persona weights, a freshness filter
//!   over the customer's recent recommendations, trending and seasonal
//!   injection, and per-channel list sizes on top.
//!
//! [`Evaluator`] measures Recall@k against held-out items and writes a JSON
//! report.
//!
//! # Examples
//!
//! ```no_run
//! use camino::Utf8Path;
//! use sidekick_scorer::{ModelTables, TablesConfig, write_tables};
//!
//! let orders = Vec::new();
//! let tables = ModelTables::build(&orders, &TablesConfig::default());
//! write_tables(Utf8Path::new("artifacts/tables.bin"), &tables).expect("persist tables");
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod catalog;
mod cooccurrence;
mod error;
mod evaluation;
mod freshness;
mod fusion;
mod platform;
mod production;
mod rules;
mod seasonal;
mod tables;
mod trending;
mod weights;

pub use catalog::{Catalog, CatalogItem};
pub use cooccurrence::CooccurrenceTable;
pub use error::{EvaluationError, FusionError, TablesError};
pub use evaluation::{EvaluationReport, Evaluator, ItemFrequency, TOP_RECOMMENDED, write_report};
pub use freshness::{FreshPick, FreshnessContext, FreshnessPolicy};
pub use fusion::{FusionRecommender, RankedQuery, ScoredCandidate, Signals};
pub use platform::PlatformProfiles;
pub use production::{DEFAULT_LOYAL_ORDER_THRESHOLD, ProductionConfig, ProductionRecommender};
pub use rules::{AssociationRules, DEFAULT_MIN_SUPPORT};
pub use seasonal::{SeasonalCalendar, SeasonalEntry};
pub use tables::{ModelTables, TablesConfig, read_tables, write_tables};
pub use trending::{DEFAULT_TRENDING_DAYS, ItemTimeline};
pub use weights::{FusionWeights, PersonaWeights};

/// Public helper exposing the bincode configuration used for tables files.
#[must_use]
pub fn tables_bincode_options() -> impl bincode::Options {
    tables::bincode_options()
}
