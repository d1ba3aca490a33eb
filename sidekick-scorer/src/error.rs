//! Error types raised while building, persisting and configuring the scorer.
#![forbid(unsafe_code)]

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while persisting or loading the model tables artefact.
#[derive(Debug, Error)]
pub enum TablesError {
    /// Writing the tables artefact failed.
    #[error("failed to write tables file at {path}")]
    WriteFile {
        /// Target file path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// Reading the tables artefact failed.
    #[error("failed to read tables file at {path}")]
    ReadFile {
        /// Path to the tables artefact.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// Serialising the tables to `bincode` failed.
    #[error("failed to serialise model tables into {path}")]
    Serialise {
        /// Target file path.
        path: Utf8PathBuf,
        /// Source error from `bincode`.
        #[source]
        source: bincode::Error,
    },
    /// Decoding the tables artefact failed.
    #[error("failed to decode tables file at {path}")]
    Decode {
        /// Path to the tables artefact.
        path: Utf8PathBuf,
        /// Source error from `bincode`.
        #[source]
        source: bincode::Error,
    },
}

/// Errors raised when configuring score fusion or the freshness filter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FusionError {
    /// Provided weights were unusable.
    #[error("fusion weights must be finite, non-negative and sum to a positive value")]
    InvalidWeights,
    /// The freshness policy was unusable.
    #[error("invalid freshness policy: {reason}")]
    InvalidFreshness {
        /// Which setting was rejected.
        reason: &'static str,
    },
}

/// Errors raised while writing the evaluation report.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// Serialising the report to JSON failed.
    #[error("failed to serialise evaluation report for {path}")]
    Serialise {
        /// Target file path.
        path: Utf8PathBuf,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Writing the report failed.
    #[error("failed to write evaluation report at {path}")]
    WriteFile {
        /// Target file path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
}
