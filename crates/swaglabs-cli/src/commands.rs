//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use swaglabs::Suite;

/// Swaglabs: run the Sauce Labs demo storefront suites in a browser
#[derive(Parser, Debug)]
#[command(name = "swaglabs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the storefront suites
    Run(RunArgs),

    /// List suites and their scenarios
    List(ListArgs),

    /// Show or write the site configuration
    Config(ConfigArgs),
}

/// Site settings shared by `run` and `config`
#[derive(Args, Debug, Clone, Default)]
pub struct SiteArgs {
    /// YAML site configuration to start from
    #[arg(short, long, env = "SWAGLABS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Storefront base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Directory screenshots are written to
    #[arg(long)]
    pub screenshots: Option<PathBuf>,

    /// Seed for randomized picks
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Site settings
    #[command(flatten)]
    pub site: SiteArgs,

    /// Suites to run, in order (default: all)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub suite: Vec<SuiteArg>,

    /// Driver that executes the scenarios
    #[arg(long, value_enum, default_value_t = DriverArg::Chromium)]
    pub driver: DriverArg,

    /// Run without a visible browser window (default)
    #[arg(long, overrides_with = "headed")]
    pub headless: bool,

    /// Show the browser window
    #[arg(long, overrides_with = "headless")]
    pub headed: bool,

    /// Path to the chromium binary
    #[arg(long, env = "CHROMIUM_PATH")]
    pub chromium_path: Option<PathBuf>,

    /// Disable the chromium sandbox (containers/CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Also write the JSON report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl RunArgs {
    /// Whether the browser runs headless
    #[must_use]
    pub const fn is_headless(&self) -> bool {
        !self.headed
    }

    /// Requested suites, or all of them
    #[must_use]
    pub fn suites(&self) -> Vec<Suite> {
        selected_suites(&self.suite)
    }
}

/// Suites named on the command line, or all of them when none are
#[must_use]
pub fn selected_suites(args: &[SuiteArg]) -> Vec<Suite> {
    if args.is_empty() {
        Suite::ALL.to_vec()
    } else {
        args.iter().copied().map(Suite::from).collect()
    }
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only list these suites
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub suite: Vec<SuiteArg>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Site settings
    #[command(flatten)]
    pub site: SiteArgs,

    /// Write the effective configuration to this file instead of printing it
    #[arg(short, long)]
    pub write: Option<PathBuf>,
}

/// Suite selector
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuiteArg {
    /// Login form behaviour
    Login,
    /// Product listing, menu and footer
    Home,
    /// Cart contents and logout
    Cart,
}

impl From<SuiteArg> for Suite {
    fn from(arg: SuiteArg) -> Self {
        match arg {
            SuiteArg::Login => Self::Login,
            SuiteArg::Home => Self::Home,
            SuiteArg::Cart => Self::Cart,
        }
    }
}

/// Driver selector
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverArg {
    /// Real chromium over CDP (`browser` feature)
    Chromium,
    /// In-memory storefront, no browser needed
    Mock,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
