//! Focused unit tests covering run configuration and the batch pipeline.

use super::helpers::{CUSTOMERS_CSV, STORES_CSV, Workspace, read_header, read_output};
use super::*;
use crate::batch::{ModelSource, RunArgs, RunConfig, config_from_layers_for_test, run_with};
use chrono::TimeDelta;
use rstest::rstest;
use sidekick_core::CustomerId;
use sidekick_core::test_support::noon;
use sidekick_data::HistoryLog;

fn run_config(workspace: &Workspace) -> RunConfig {
    let (orders, queries) = workspace.standard_inputs();
    RunConfig {
        model: ModelSource::Orders {
            orders,
            persist: None,
        },
        queries,
        customers: None,
        stores: None,
        output: workspace.path("out/recommendations.csv"),
        report: None,
        history_db: None,
        as_of: None,
        production: false,
    }
}

fn full_args() -> RunArgs {
    RunArgs {
        orders: Some("orders.csv".into()),
        queries: Some("queries.csv".into()),
        output: Some("out.csv".into()),
        ..RunArgs::default()
    }
}

#[rstest]
fn converting_run_without_model_input_errors() {
    let args = RunArgs {
        orders: None,
        tables: None,
        ..full_args()
    };
    let err = RunConfig::try_from(args).expect_err("missing model should error");
    match err {
        CliError::MissingModelInput { orders, tables } => {
            assert_eq!(orders, ARG_ORDERS);
            assert_eq!(tables, ARG_TABLES);
        }
        other => panic!("expected MissingModelInput, found {other:?}"),
    }
}

#[rstest]
#[case::queries(RunArgs { queries: None, ..full_args() }, ARG_QUERIES, ENV_RUN_QUERIES)]
#[case::output(RunArgs { output: None, ..full_args() }, ARG_OUTPUT, ENV_RUN_OUTPUT)]
fn converting_run_without_required_fields_errors(
    #[case] args: RunArgs,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let err = RunConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn orders_take_precedence_over_tables() {
    let args = RunArgs {
        tables: Some("tables.bin".into()),
        ..full_args()
    };
    let config = RunConfig::try_from(args).expect("config should build");
    assert_eq!(
        config.model,
        ModelSource::Orders {
            orders: "orders.csv".into(),
            persist: Some("tables.bin".into()),
        }
    );
    assert!(!config.production);
}

#[rstest]
#[case("2024-03-02", Some(noon(2) - TimeDelta::hours(12)))]
#[case("2024-03-02 12:00:00", Some(noon(2)))]
fn as_of_accepts_supported_formats(
    #[case] raw: &str,
    #[case] expected: Option<chrono::NaiveDateTime>,
) {
    let args = RunArgs {
        as_of: Some(raw.to_owned()),
        ..full_args()
    };
    let config = RunConfig::try_from(args).expect("config should build");
    assert_eq!(config.as_of, expected);
}

#[rstest]
fn as_of_rejects_unparseable_values() {
    let args = RunArgs {
        as_of: Some("next tuesday".to_owned()),
        ..full_args()
    };
    let err = RunConfig::try_from(args).expect_err("bad timestamp should error");
    match err {
        CliError::InvalidAsOf { value } => assert_eq!(value, "next tuesday"),
        other => panic!("expected InvalidAsOf, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_missing_queries() {
    let workspace = Workspace::new();
    let config = RunConfig {
        queries: workspace.path("missing.csv"),
        ..run_config(&workspace)
    };
    let err = config.validate_sources().expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field, path } => {
            assert_eq!(field, ARG_QUERIES);
            assert_eq!(path, workspace.path("missing.csv"));
        }
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_rejects_directories() {
    let workspace = Workspace::new();
    let stores = workspace.path("stores");
    std::fs::create_dir(stores.as_std_path()).expect("stores directory");
    let config = RunConfig {
        stores: Some(stores),
        ..run_config(&workspace)
    };
    let err = config.validate_sources().expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_STORES),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn run_writes_one_row_per_query() {
    let workspace = Workspace::new();
    let config = run_config(&workspace);

    let outcome = run_with(&config).expect("run should succeed");
    assert_eq!(outcome.rows, 2);
    assert_eq!(outcome.as_of, noon(1));

    let rows = read_output(&outcome.output);
    assert_eq!(
        rows,
        vec![
            (
                "q-1".to_owned(),
                vec!["cola".to_owned(), "fries".to_owned(), "ranch dip".to_owned()]
            ),
            (
                "q-2".to_owned(),
                vec!["wings".to_owned(), "cola".to_owned(), "fries".to_owned()]
            ),
        ]
    );
}

#[rstest]
fn run_echoes_the_query_columns() {
    let workspace = Workspace::new();
    let outcome = run_with(&run_config(&workspace)).expect("run should succeed");

    assert_eq!(
        read_header(&outcome.output),
        vec![
            "CUSTOMER_ID",
            "ORDER_ID",
            "item1",
            "item2",
            "item3",
            "RECOMMENDATION 1",
            "RECOMMENDATION 2",
            "RECOMMENDATION 3",
        ]
    );
    let text = std::fs::read_to_string(outcome.output.as_std_path()).expect("read output");
    let lines: Vec<&str> = text.lines().skip(1).collect();
    assert_eq!(
        lines,
        vec!["c-1,q-1,wings,,,cola,fries,ranch dip", ",q-2,,,,wings,cola,fries"]
    );
}

#[rstest]
fn run_writes_the_evaluation_report() {
    let workspace = Workspace::new();
    let report_path = workspace.path("reports/evaluation.json");
    let config = RunConfig {
        report: Some(report_path.clone()),
        ..run_config(&workspace)
    };

    let outcome = run_with(&config).expect("run should succeed");
    assert_eq!(outcome.report.queries_with_ground_truth, 1);
    assert_eq!(outcome.report.recall_at_1, 1.0);
    assert_eq!(outcome.report.flagged, vec!["q-2".to_owned()]);

    let written = std::fs::read_to_string(report_path.as_std_path()).expect("read report");
    let parsed: serde_json::Value = serde_json::from_str(&written).expect("valid json");
    assert_eq!(parsed["queries"], 2);
}

#[rstest]
fn run_persists_and_reloads_tables() {
    let workspace = Workspace::new();
    let tables = workspace.path("tables.bin");
    let (orders, queries) = workspace.standard_inputs();
    let first = RunConfig {
        model: ModelSource::Orders {
            orders,
            persist: Some(tables.clone()),
        },
        queries,
        ..run_config(&workspace)
    };
    let trained = run_with(&first).expect("training run");

    let second = RunConfig {
        model: ModelSource::Tables(tables),
        output: workspace.path("second.csv"),
        ..first
    };
    let reloaded = run_with(&second).expect("reloaded run");

    assert_eq!(reloaded.as_of, trained.as_of);
    assert_eq!(read_output(&reloaded.output), read_output(&trained.output));
}

#[rstest]
fn production_run_records_history() {
    let workspace = Workspace::new();
    let history_db = workspace.path("history.db");
    let config = RunConfig {
        customers: Some(workspace.write("customers.csv", CUSTOMERS_CSV)),
        stores: Some(workspace.write("stores.csv", STORES_CSV)),
        history_db: Some(history_db.clone()),
        production: true,
        ..run_config(&workspace)
    };

    let outcome = run_with(&config).expect("production run");
    assert_eq!(outcome.rows, 2);

    let log = HistoryLog::initialise(&history_db).expect("open history");
    let history = log
        .load(outcome.as_of, TimeDelta::days(7))
        .expect("load history");
    let shown = history.recent(&CustomerId::new("c-1"), outcome.as_of, TimeDelta::days(7));
    assert_eq!(shown.len(), 3);
    // The anonymous query leaves no trace.
    assert_eq!(history.len(), 3);
}

#[rstest]
fn empty_history_without_as_of_is_rejected() {
    let workspace = Workspace::new();
    let (_, queries) = workspace.standard_inputs();
    let orders = workspace.write(
        "empty.csv",
        "ORDER_ID,ITEM_NAME,ORDER_CREATED_DATE\n",
    );
    let config = RunConfig {
        model: ModelSource::Orders {
            orders,
            persist: None,
        },
        queries,
        ..run_config(&workspace)
    };
    let err = run_with(&config).expect_err("no reference time");
    match err {
        CliError::UnknownReferenceTime { field, env } => {
            assert_eq!(field, ARG_AS_OF);
            assert_eq!(env, ENV_RUN_AS_OF);
        }
        other => panic!("expected UnknownReferenceTime, found {other:?}"),
    }
}

#[rstest]
fn run_layers_map_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "queries": 42 }));
    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn run_layers_merge_file_and_environment() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "tables": "from-file.bin",
            "output": "from-file.csv",
            "production": true,
        }),
        None,
    );
    composer.push_environment(json!({
        "queries": "from-env.csv",
        "as_of": "2024-03-02 12:00:00",
    }));
    composer.push_cli(json!({ "output": "from-cli.csv" }));

    let config = config_from_layers_for_test(composer.layers()).expect("merged config");
    assert_eq!(config.model, ModelSource::Tables("from-file.bin".into()));
    assert_eq!(config.queries, "from-env.csv");
    assert_eq!(config.output, "from-cli.csv");
    assert_eq!(config.as_of, Some(noon(2)));
    assert!(config.production);
}
