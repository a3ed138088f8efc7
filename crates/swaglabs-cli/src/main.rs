//! Swaglabs CLI: run the Sauce Labs demo storefront suites
//!
//! ## Usage
//!
//! ```bash
//! swaglabs run                          # All suites in headless chromium
//! swaglabs run --suite login,cart       # Selected suites
//! swaglabs run --driver mock --json     # In-memory storefront, JSON report
//! swaglabs list                         # Suites and scenarios
//! swaglabs config --write site.yaml     # Dump the effective site config
//! ```

use std::process::ExitCode;

use clap::Parser;
use swaglabs_cli::{
    check_report, emit_report, logging, render_listing, resolve_site_config, selected_suites,
    Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, ConfigArgs, ListArgs, RunArgs,
    RunPlan, SwagRunner, Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init(&config);

    match cli.command {
        Commands::Run(args) => run_suites(config, &args),
        Commands::List(args) => {
            run_list(&args);
            Ok(())
        }
        Commands::Config(args) => run_config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_log_json(cli.log_json)
}

fn run_suites(config: CliConfig, args: &RunArgs) -> CliResult<()> {
    let plan = RunPlan::from_args(args)?;
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::config(format!("Failed to create runtime: {e}")))?;

    let mut runner = SwagRunner::new(config);
    let run = rt.block_on(runner.execute(&plan))?;
    emit_report(&run.report, args.json, args.output.as_ref())?;
    run.closed?;
    check_report(&run.report)
}

fn run_list(args: &ListArgs) {
    print!("{}", render_listing(&selected_suites(&args.suite)));
}

fn run_config(args: &ConfigArgs) -> CliResult<()> {
    let site = resolve_site_config(&args.site)?;
    let yaml = site.to_yaml()?;
    match args.write {
        Some(ref path) => {
            std::fs::write(path, yaml)?;
            println!("Wrote {}", path.display());
        }
        None => print!("{yaml}"),
    }
    Ok(())
}
