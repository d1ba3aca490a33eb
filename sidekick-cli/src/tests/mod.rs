//! Shared test harness modules for the Sidekick CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod build_unit;
mod helpers;
mod run_steps;
mod run_unit;
