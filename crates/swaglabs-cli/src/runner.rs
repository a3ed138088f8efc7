//! Suite runner behind `swaglabs run`

use std::path::PathBuf;
use std::time::Instant;

use swaglabs::mock::MockStorefront;
use swaglabs::{
    DriverConfig, RunReport, Session, SessionDriver, SiteConfig, Suite, SuiteRunner, SwagResult,
    Timing,
};
use tracing::{error, info};

use crate::commands::{DriverArg, RunArgs};
use crate::config::{resolve_site_config, CliConfig};
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;

/// Everything a run needs, resolved from flags and the config file
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Site settings
    pub site: SiteConfig,
    /// Suites in run order
    pub suites: Vec<Suite>,
    /// Driver to use
    pub driver: DriverArg,
    /// Browser launch settings
    pub driver_config: DriverConfig,
}

impl RunPlan {
    /// Resolve a plan from `run` arguments
    pub fn from_args(args: &RunArgs) -> CliResult<Self> {
        let mut site = resolve_site_config(&args.site)?;
        if args.driver == DriverArg::Mock {
            // The in-memory storefront renders synchronously
            site = site.with_timing(Timing::instant());
        }

        let mut driver_config = DriverConfig::new().headless(args.is_headless());
        if let Some(ref path) = args.chromium_path {
            driver_config = driver_config.chromium_path(path.display().to_string());
        }
        if args.no_sandbox {
            driver_config = driver_config.no_sandbox();
        }

        Ok(Self {
            site,
            suites: args.suites(),
            driver: args.driver,
            driver_config,
        })
    }

    /// Number of scenarios the plan will run
    #[must_use]
    pub fn scenario_count(&self) -> usize {
        self.suites.iter().map(|s| s.scenarios().len()).sum()
    }
}

/// A run that got as far as quitting the session
#[derive(Debug)]
pub struct FinishedRun {
    /// Scenario results
    pub report: RunReport,
    /// Outcome of quitting the session
    pub closed: SwagResult<()>,
}

/// Runs suites and reports progress
#[derive(Debug)]
pub struct SwagRunner {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl SwagRunner {
    /// Create a runner
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self { config, reporter }
    }

    /// The CLI configuration
    #[must_use]
    pub const fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Execute a plan with the driver it names. A failed quit is carried in
    /// the result next to the report rather than replacing it.
    pub async fn execute(&mut self, plan: &RunPlan) -> CliResult<FinishedRun> {
        info!(driver = ?plan.driver, suites = plan.suites.len(), "starting run");
        match plan.driver {
            DriverArg::Mock => {
                let driver = MockStorefront::new().with_base_url(plan.site.base_url.clone());
                self.run_session(Session::new(driver, plan.site.clone()), plan)
                    .await
            }
            DriverArg::Chromium => self.run_chromium(plan).await,
        }
    }

    #[cfg(feature = "browser")]
    async fn run_chromium(&mut self, plan: &RunPlan) -> CliResult<FinishedRun> {
        let driver = swaglabs::ChromiumDriver::launch(plan.driver_config.clone()).await?;
        self.run_session(Session::new(driver, plan.site.clone()), plan)
            .await
    }

    #[cfg(not(feature = "browser"))]
    async fn run_chromium(&mut self, _plan: &RunPlan) -> CliResult<FinishedRun> {
        Err(CliError::config(
            "chromium driver not enabled. Rebuild with --features browser, or use --driver mock",
        ))
    }

    async fn run_session<D: SessionDriver>(
        &mut self,
        session: Session<D>,
        plan: &RunPlan,
    ) -> CliResult<FinishedRun> {
        let start = Instant::now();
        let mut runner = SuiteRunner::new(session);
        let mut report = RunReport::default();

        self.reporter
            .start_progress(plan.scenario_count() as u64, "running suites");
        for &suite in &plan.suites {
            self.reporter.set_message(suite.title());
            let results = runner.run_suite(suite).await;
            self.reporter.increment(results.total() as u64);
            self.reporter.suite(&results);
            report.suites.push(results);
        }
        self.reporter.finish();
        report.duration = start.elapsed();

        let closed = runner.finish().await.map(|_| ());
        self.reporter.summary(&report);
        if let Err(e) = &closed {
            error!(error = %e, "failed to close browser session");
        }
        Ok(FinishedRun { report, closed })
    }
}

/// Write the JSON report where the flags ask for it
pub fn emit_report(report: &RunReport, json: bool, output: Option<&PathBuf>) -> CliResult<()> {
    if json || output.is_some() {
        let rendered = report.to_json()?;
        if json {
            println!("{rendered}");
        }
        if let Some(path) = output {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, rendered)?;
            info!(path = %path.display(), "wrote report");
        }
    }
    Ok(())
}

/// Map a finished report to the process outcome
pub fn check_report(report: &RunReport) -> CliResult<()> {
    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed: report.failed_count(),
            total: report.total(),
        })
    }
}

/// Text listing of suites and their scenarios
#[must_use]
pub fn render_listing(suites: &[Suite]) -> String {
    let mut out = String::new();
    for suite in suites {
        out.push_str(&format!("{} ({})\n", suite.title(), suite.id()));
        for scenario in suite.scenarios() {
            out.push_str(&format!("  - {scenario}\n"));
        }
    }
    out
}
