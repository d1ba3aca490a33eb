//! Run command: complete every partial order in a queries file.

use std::sync::Arc;

use camino::Utf8PathBuf;
use chrono::NaiveDateTime;
use clap::Parser;
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use sidekick_core::{
    ComplementMap, CustomerDirectory, PartialOrderQuery, RECOMMENDATION_SLOTS, Recommendation,
    RecommendationHistory, Recommender,
};
use sidekick_data::{
    HistoryLog, RecommendationRow, parse_timestamp, read_customers, read_orders, read_queries,
    read_stores, write_recommendations,
};
use sidekick_scorer::{
    EvaluationReport, Evaluator, FusionRecommender, FusionWeights, ModelTables, ProductionConfig,
    ProductionRecommender, TablesConfig, read_tables, write_report, write_tables,
};

use crate::{
    ARG_AS_OF, ARG_CUSTOMERS, ARG_HISTORY_DB, ARG_ORDERS, ARG_OUTPUT, ARG_PRODUCTION, ARG_QUERIES,
    ARG_REPORT, ARG_STORES, ARG_TABLES, CliError, ENV_RUN_AS_OF, ENV_RUN_OUTPUT, ENV_RUN_QUERIES,
    require_existing,
};

/// CLI arguments for the `run` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Recommend complementary items for each partial order in a \
                 queries CSV. The model comes from an orders CSV or a \
                 prepared tables artefact. Production mode adds personas, \
                 per-channel list sizes, trending and seasonal items, and \
                 demotes items each customer saw recently.",
    about = "Recommend items for a batch of partial orders"
)]
#[ortho_config(prefix = "SIDEKICK")]
pub(crate) struct RunArgs {
    /// Orders CSV to train on. Takes precedence over `--tables`.
    #[arg(long = ARG_ORDERS, value_name = "path")]
    #[serde(default)]
    pub(crate) orders: Option<Utf8PathBuf>,
    /// Tables artefact to load, or to write when `--orders` is given.
    #[arg(long = ARG_TABLES, value_name = "path")]
    #[serde(default)]
    pub(crate) tables: Option<Utf8PathBuf>,
    /// Queries CSV with `ORDER_ID` and `item1..itemN` columns.
    #[arg(long = ARG_QUERIES, value_name = "path")]
    #[serde(default)]
    pub(crate) queries: Option<Utf8PathBuf>,
    /// Customers CSV used for personas.
    #[arg(long = ARG_CUSTOMERS, value_name = "path")]
    #[serde(default)]
    pub(crate) customers: Option<Utf8PathBuf>,
    /// Stores CSV used for ordering channels.
    #[arg(long = ARG_STORES, value_name = "path")]
    #[serde(default)]
    pub(crate) stores: Option<Utf8PathBuf>,
    /// Destination of the recommendation table.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Destination of the JSON evaluation report.
    #[arg(long = ARG_REPORT, value_name = "path")]
    #[serde(default)]
    pub(crate) report: Option<Utf8PathBuf>,
    /// `SQLite` log of delivered recommendations (production mode).
    #[arg(long = ARG_HISTORY_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) history_db: Option<Utf8PathBuf>,
    /// Reference time; defaults to the latest training order.
    #[arg(long = ARG_AS_OF, value_name = "timestamp")]
    #[serde(default)]
    pub(crate) as_of: Option<String>,
    /// Serve through the production recommender.
    #[arg(
        long = ARG_PRODUCTION,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) production: Option<bool>,
}

impl RunArgs {
    fn into_config(self) -> Result<RunConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RunConfig::try_from(merged)
    }
}

/// Where the model tables come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ModelSource {
    /// Train on an orders CSV, optionally persisting the tables.
    Orders {
        orders: Utf8PathBuf,
        persist: Option<Utf8PathBuf>,
    },
    /// Load a previously built artefact.
    Tables(Utf8PathBuf),
}

/// Resolved `run` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunConfig {
    pub(crate) model: ModelSource,
    pub(crate) queries: Utf8PathBuf,
    pub(crate) customers: Option<Utf8PathBuf>,
    pub(crate) stores: Option<Utf8PathBuf>,
    pub(crate) output: Utf8PathBuf,
    pub(crate) report: Option<Utf8PathBuf>,
    pub(crate) history_db: Option<Utf8PathBuf>,
    pub(crate) as_of: Option<NaiveDateTime>,
    pub(crate) production: bool,
}

impl RunConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        match &self.model {
            ModelSource::Orders { orders, .. } => require_existing(orders, ARG_ORDERS)?,
            ModelSource::Tables(tables) => require_existing(tables, ARG_TABLES)?,
        }
        require_existing(&self.queries, ARG_QUERIES)?;
        if let Some(customers) = &self.customers {
            require_existing(customers, ARG_CUSTOMERS)?;
        }
        if let Some(stores) = &self.stores {
            require_existing(stores, ARG_STORES)?;
        }
        Ok(())
    }
}

impl TryFrom<RunArgs> for RunConfig {
    type Error = CliError;

    fn try_from(args: RunArgs) -> Result<Self, Self::Error> {
        let model = match (args.orders, args.tables) {
            (Some(orders), persist) => ModelSource::Orders { orders, persist },
            (None, Some(tables)) => ModelSource::Tables(tables),
            (None, None) => {
                return Err(CliError::MissingModelInput {
                    orders: ARG_ORDERS,
                    tables: ARG_TABLES,
                });
            }
        };
        let queries = args.queries.ok_or(CliError::MissingArgument {
            field: ARG_QUERIES,
            env: ENV_RUN_QUERIES,
        })?;
        let output = args.output.ok_or(CliError::MissingArgument {
            field: ARG_OUTPUT,
            env: ENV_RUN_OUTPUT,
        })?;
        let as_of = args
            .as_of
            .map(|raw| parse_timestamp(&raw).ok_or(CliError::InvalidAsOf { value: raw }))
            .transpose()?;
        Ok(Self {
            model,
            queries,
            customers: args.customers,
            stores: args.stores,
            output,
            report: args.report,
            history_db: args.history_db,
            as_of,
            production: args.production.unwrap_or(false),
        })
    }
}

/// Result of a successful `run`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Where the recommendation table was written.
    pub output: Utf8PathBuf,
    /// Reference time used for scoring.
    pub as_of: NaiveDateTime,
    /// Rows written, one per query.
    pub rows: usize,
    /// Evaluation summary of the batch.
    pub report: EvaluationReport,
}

pub(crate) fn run_batch(args: RunArgs) -> Result<RunOutcome, CliError> {
    let config = args.into_config()?;
    run_with(&config)
}

pub(crate) fn run_with(config: &RunConfig) -> Result<RunOutcome, CliError> {
    config.validate_sources()?;
    let tables = Arc::new(load_model(&config.model)?);
    let as_of = config
        .as_of
        .or(tables.latest_order)
        .ok_or(CliError::UnknownReferenceTime {
            field: ARG_AS_OF,
            env: ENV_RUN_AS_OF,
        })?;
    let batch = read_queries(&config.queries)?;
    let queries: Vec<&PartialOrderQuery> = batch.queries().collect();
    for query in &queries {
        if let Err(err) = query.validate() {
            warn!("{err}; answering from popularity");
        }
    }

    let fusion = FusionRecommender::new(
        Arc::clone(&tables),
        ComplementMap::default(),
        FusionWeights::default(),
    )?;
    let recommendations = if config.production {
        serve_production(config, fusion, &queries, as_of)?
    } else {
        queries
            .iter()
            .map(|query| fusion.recommend(query, RECOMMENDATION_SLOTS))
            .collect()
    };

    let mut evaluator = Evaluator::new(&tables.catalog);
    let rows: Vec<RecommendationRow<'_>> = batch
        .report
        .records
        .iter()
        .zip(&recommendations)
        .map(|(row, recommendation)| {
            evaluator.record(&row.query, recommendation);
            RecommendationRow {
                query: row,
                recommendation,
            }
        })
        .collect();
    write_recommendations(&config.output, batch.layout, &rows)?;
    let report = evaluator.finish();
    if let Some(path) = &config.report {
        write_report(path, &report)?;
        info!("Wrote evaluation report to {path}");
    }
    Ok(RunOutcome {
        output: config.output.clone(),
        as_of,
        rows: rows.len(),
        report,
    })
}

fn load_model(source: &ModelSource) -> Result<ModelTables, CliError> {
    match source {
        ModelSource::Orders { orders, persist } => {
            let report = read_orders(orders)?;
            let tables = ModelTables::build(&report.records, &TablesConfig::default());
            if let Some(path) = persist {
                write_tables(path, &tables)?;
            }
            Ok(tables)
        }
        ModelSource::Tables(path) => Ok(read_tables(path)?),
    }
}

fn load_directory(config: &RunConfig) -> Result<CustomerDirectory, CliError> {
    let customers = match &config.customers {
        Some(path) => read_customers(path)?.records,
        None => Vec::new(),
    };
    let stores = match &config.stores {
        Some(path) => read_stores(path)?.records,
        None => Vec::new(),
    };
    Ok(CustomerDirectory::new(customers, stores))
}

fn serve_production(
    config: &RunConfig,
    fusion: FusionRecommender,
    queries: &[&PartialOrderQuery],
    as_of: NaiveDateTime,
) -> Result<Vec<Recommendation>, CliError> {
    let settings = ProductionConfig::default();
    let window = settings.freshness.window;
    let production = ProductionRecommender::new(fusion, settings, load_directory(config)?, as_of)?;
    let mut log = config
        .history_db
        .as_deref()
        .map(HistoryLog::initialise)
        .transpose()?;
    let mut history = match &log {
        Some(log) => log.load(as_of, window)?,
        None => RecommendationHistory::new(),
    };
    info!(
        "Serving {} queries at {as_of} with {} remembered recommendations",
        queries.len(),
        history.len()
    );

    let mut delivered = Vec::with_capacity(queries.len());
    for query in queries {
        let recommendation = production.deliver(query, &mut history);
        if let (Some(log), Some(customer)) = (log.as_mut(), query.customer.as_ref()) {
            log.record(customer, &recommendation, as_of)?;
        }
        delivered.push(recommendation);
    }
    Ok(delivered)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RunConfig, CliError> {
    let merged = RunArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RunConfig::try_from(merged)
}
