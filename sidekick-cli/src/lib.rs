//! Command-line interface for Sidekick's batch recommendation jobs.
//!
//! `sidekick build` turns an order history into a `tables.bin` artefact.
//! `sidekick run` completes every partial order in a queries file and writes
//! the recommendation table, optionally with an evaluation report and a
//! persistent recommendation history.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

mod batch;
mod build;
mod error;

pub use batch::RunOutcome;
pub use build::BuildOutcome;
pub use error::CliError;

use batch::{RunArgs, run_batch};
use build::{BuildArgs, run_build};

const ARG_ORDERS: &str = "orders";
const ARG_TABLES: &str = "tables";
const ARG_QUERIES: &str = "queries";
const ARG_CUSTOMERS: &str = "customers";
const ARG_STORES: &str = "stores";
const ARG_OUTPUT: &str = "output";
const ARG_REPORT: &str = "report";
const ARG_HISTORY_DB: &str = "history-db";
const ARG_AS_OF: &str = "as-of";
const ARG_PRODUCTION: &str = "production";
const ENV_BUILD_ORDERS: &str = "SIDEKICK_CMDS_BUILD_ORDERS";
const ENV_BUILD_TABLES: &str = "SIDEKICK_CMDS_BUILD_TABLES";
const ENV_RUN_QUERIES: &str = "SIDEKICK_CMDS_RUN_QUERIES";
const ENV_RUN_OUTPUT: &str = "SIDEKICK_CMDS_RUN_OUTPUT";
const ENV_RUN_AS_OF: &str = "SIDEKICK_CMDS_RUN_AS_OF";

/// Run the Sidekick CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments are invalid, inputs cannot be read or
/// outputs cannot be written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Build(args) => {
            run_build(args)?;
        }
        Command::Run(args) => {
            run_batch(args)?;
        }
    }
    Ok(())
}

/// Route `log` records to stderr, filtered by `RUST_LOG` (default `info`).
///
/// # Errors
/// Returns [`CliError::Logging`] when a global subscriber is already set.
pub fn init_logging() -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
        .try_init()?;
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "sidekick",
    about = "Complementary-item recommendations for partial orders",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build model tables from an order history.
    Build(BuildArgs),
    /// Recommend items for every query in a batch.
    Run(RunArgs),
}

/// Fail unless `path` names an existing regular file.
fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match sidekick_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests;
