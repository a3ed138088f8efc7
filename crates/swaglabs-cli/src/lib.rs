//! Swaglabs CLI library
//!
//! Argument parsing, configuration, progress output and the run loop behind
//! the `swaglabs` binary.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)] // String building is clear and correct
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;

pub use commands::{
    selected_suites, Cli, ColorArg, Commands, ConfigArgs, DriverArg, ListArgs, RunArgs, SiteArgs,
    SuiteArg,
};
pub use config::{resolve_site_config, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
pub use runner::{
    check_report, emit_report, render_listing, FinishedRun, RunPlan, SwagRunner,
};
