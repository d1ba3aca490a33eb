//! Build command: order history to `tables.bin`.

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use sidekick_data::read_orders;
use sidekick_scorer::{ModelTables, TablesConfig, write_tables};

use crate::{
    ARG_ORDERS, ARG_TABLES, CliError, ENV_BUILD_ORDERS, ENV_BUILD_TABLES, require_existing,
};

/// CLI arguments for the `build` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Count item pairs, mine association rules and rank items by \
                 popularity over an order history, then persist the result \
                 as a bincode tables artefact for later runs.",
    about = "Build model tables from an order history"
)]
#[ortho_config(prefix = "SIDEKICK")]
pub(crate) struct BuildArgs {
    /// Path to the orders CSV (one row per line item).
    #[arg(long = ARG_ORDERS, value_name = "path")]
    #[serde(default)]
    pub(crate) orders: Option<Utf8PathBuf>,
    /// Destination of the tables artefact.
    #[arg(long = ARG_TABLES, value_name = "path")]
    #[serde(default)]
    pub(crate) tables: Option<Utf8PathBuf>,
}

impl BuildArgs {
    fn into_config(self) -> Result<BuildConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        BuildConfig::try_from(merged)
    }
}

/// Resolved `build` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BuildConfig {
    pub(crate) orders: Utf8PathBuf,
    pub(crate) tables: Utf8PathBuf,
}

impl TryFrom<BuildArgs> for BuildConfig {
    type Error = CliError;

    fn try_from(args: BuildArgs) -> Result<Self, Self::Error> {
        let orders = args.orders.ok_or(CliError::MissingArgument {
            field: ARG_ORDERS,
            env: ENV_BUILD_ORDERS,
        })?;
        let tables = args.tables.ok_or(CliError::MissingArgument {
            field: ARG_TABLES,
            env: ENV_BUILD_TABLES,
        })?;
        Ok(Self { orders, tables })
    }
}

/// Result of a successful `build`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Where the tables were written.
    pub tables: Utf8PathBuf,
    /// Orders used for training.
    pub orders: usize,
    /// Distinct items in the catalog.
    pub items: usize,
}

pub(crate) fn run_build(args: BuildArgs) -> Result<BuildOutcome, CliError> {
    let config = args.into_config()?;
    build_with(&config)
}

pub(crate) fn build_with(config: &BuildConfig) -> Result<BuildOutcome, CliError> {
    require_existing(&config.orders, ARG_ORDERS)?;
    let report = read_orders(&config.orders)?;
    let tables = ModelTables::build(&report.records, &TablesConfig::default());
    write_tables(&config.tables, &tables)?;
    info!(
        "Wrote tables for {} items from {} orders to {}",
        tables.catalog.len(),
        tables.order_count,
        config.tables
    );
    Ok(BuildOutcome {
        tables: config.tables.clone(),
        orders: tables.order_count,
        items: tables.catalog.len(),
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<BuildConfig, CliError> {
    let merged = BuildArgs::merge_from_layers(layers).map_err(CliError::from)?;
    BuildConfig::try_from(merged)
}
