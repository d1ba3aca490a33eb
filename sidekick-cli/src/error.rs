//! Error types emitted by the Sidekick CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use sidekick_data::{HistoryLogError, IngestError, OutputError};
use sidekick_scorer::{EvaluationError, FusionError, TablesError};
use thiserror::Error;

/// Errors emitted by the Sidekick CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// A global log subscriber was already installed.
    #[error("failed to install the log subscriber: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// Neither an order history nor a tables artefact was supplied.
    #[error("missing model input (set --{orders} or --{tables})")]
    MissingModelInput {
        orders: &'static str,
        tables: &'static str,
    },
    /// A referenced input path does not exist on disk or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// `--as-of` was not a recognised timestamp.
    #[error("invalid --as-of timestamp {value:?}")]
    InvalidAsOf { value: String },
    /// No reference time was given and the tables hold no orders.
    #[error("cannot infer a reference time from an empty order history (set --{field} or {env})")]
    UnknownReferenceTime {
        field: &'static str,
        env: &'static str,
    },
    /// Loading a CSV input failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// Reading or writing the tables artefact failed.
    #[error(transparent)]
    Tables(#[from] TablesError),
    /// Writing the recommendation table failed.
    #[error(transparent)]
    Output(#[from] OutputError),
    /// The recommendation history log failed.
    #[error(transparent)]
    HistoryLog(#[from] HistoryLogError),
    /// Recommender configuration was rejected.
    #[error(transparent)]
    Fusion(#[from] FusionError),
    /// Writing the evaluation report failed.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
