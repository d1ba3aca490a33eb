//! Focused unit tests covering build configuration and the tables artefact.

use super::helpers::{ORDERS_CSV, Workspace};
use super::*;
use crate::build::{BuildArgs, BuildConfig, build_with, config_from_layers_for_test};
use rstest::rstest;
use sidekick_scorer::read_tables;

#[rstest]
#[case(None, Some("tables.bin"), ARG_ORDERS, ENV_BUILD_ORDERS)]
#[case(Some("orders.csv"), None, ARG_TABLES, ENV_BUILD_TABLES)]
fn converting_build_without_required_fields_errors(
    #[case] orders: Option<&str>,
    #[case] tables: Option<&str>,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let args = BuildArgs {
        orders: orders.map(Into::into),
        tables: tables.map(Into::into),
    };
    let err = BuildConfig::try_from(args).expect_err("missing field should error");
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
fn build_writes_readable_tables() {
    let workspace = Workspace::new();
    let config = BuildConfig {
        orders: workspace.write("orders.csv", ORDERS_CSV),
        tables: workspace.path("artefacts/tables.bin"),
    };

    let outcome = build_with(&config).expect("build should succeed");
    assert_eq!(outcome.orders, 15);
    assert_eq!(outcome.items, 4);

    let tables = read_tables(&outcome.tables).expect("tables should decode");
    assert_eq!(tables.order_count, 15);
    assert_eq!(tables.cooccurrence.count(0, 1), 10);
}

#[rstest]
fn build_reports_missing_orders() {
    let workspace = Workspace::new();
    let config = BuildConfig {
        orders: workspace.path("missing.csv"),
        tables: workspace.path("tables.bin"),
    };
    let err = build_with(&config).expect_err("missing orders should fail");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_ORDERS),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
    assert!(!workspace.path("tables.bin").exists());
}

#[rstest]
fn build_layers_honour_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let workspace = Workspace::new();
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "orders": workspace.path("from-file.csv").as_str(),
            "tables": workspace.path("from-file.bin").as_str(),
        }),
        None,
    );
    composer.push_environment(json!({
        "tables": workspace.path("from-env.bin").as_str(),
    }));
    composer.push_cli(json!({
        "orders": workspace.path("from-cli.csv").as_str(),
    }));

    let config = config_from_layers_for_test(composer.layers()).expect("merged config");
    assert_eq!(config.orders, workspace.path("from-cli.csv"));
    assert_eq!(config.tables, workspace.path("from-env.bin"));
}
