//! Suites, scenarios and the runner that drives them over one session.
//!
//! The runner owns the session for the whole run. A failing scenario is
//! recorded and the next one starts from whatever state the browser is in;
//! a fatal session error marks every remaining scenario as not run. The
//! session is quit exactly once, after the last suite.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::actions::Session;
use crate::driver::SessionDriver;
use crate::fixture::SuiteContext;
use crate::harness::{RunReport, ScenarioResult, SuiteResults};
use crate::locator::names;
use crate::result::{SwagError, SwagResult};
use crate::suites;

/// A group of scenarios sharing one setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suite {
    /// Login form behaviour
    Login,
    /// Product listing, menu and footer
    Home,
    /// Cart contents and logout
    Cart,
}

impl Suite {
    /// All suites, in run order
    pub const ALL: [Self; 3] = [Self::Login, Self::Home, Self::Cart];

    /// Short identifier
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Home => "home",
            Self::Cart => "cart",
        }
    }

    /// Display title
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Home => "Home",
            Self::Cart => "Cart",
        }
    }

    /// Scenarios in run order
    #[must_use]
    pub const fn scenarios(self) -> &'static [Scenario] {
        match self {
            Self::Login => &[
                Scenario::LoginEmptyFields,
                Scenario::LoginEmptyUsername,
                Scenario::LoginEmptyPassword,
                Scenario::LoginLockedOut,
                Scenario::LoginStandardUser,
            ],
            Self::Home => &[
                Scenario::SortByName,
                Scenario::SortByPrice,
                Scenario::AddProductsToCart,
                Scenario::NavigateToCart,
                Scenario::NavigateToDetail,
                Scenario::SocialTwitter,
                Scenario::SocialFacebook,
                Scenario::SocialLinkedin,
                Scenario::NavigateToAbout,
                Scenario::ResetAppState,
            ],
            Self::Cart => &[Scenario::CartListsSelectedProducts, Scenario::Logout],
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Suite {
    type Err = SwagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|suite| suite.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SwagError::Config {
                message: format!("unknown suite {s:?} (expected login, home or cart)"),
            })
    }
}

/// One independently pass/fail-able sequence of actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    /// Submit with both fields empty
    LoginEmptyFields,
    /// Submit with only a password
    LoginEmptyUsername,
    /// Submit with only a username
    LoginEmptyPassword,
    /// Locked-out account
    LoginLockedOut,
    /// Standard account
    LoginStandardUser,
    /// Sort by name both ways
    SortByName,
    /// Sort by price both ways
    SortByPrice,
    /// Random add-to-cart clicks against the badge
    AddProductsToCart,
    /// Cart link
    NavigateToCart,
    /// Product title link
    NavigateToDetail,
    /// Twitter footer link
    SocialTwitter,
    /// Facebook footer link
    SocialFacebook,
    /// LinkedIn footer link
    SocialLinkedin,
    /// About menu item
    NavigateToAbout,
    /// Reset app state menu item
    ResetAppState,
    /// Cart page lists the selected products
    CartListsSelectedProducts,
    /// Logout menu item
    Logout,
}

impl Scenario {
    /// Suite the scenario belongs to
    #[must_use]
    pub const fn suite(self) -> Suite {
        match self {
            Self::LoginEmptyFields
            | Self::LoginEmptyUsername
            | Self::LoginEmptyPassword
            | Self::LoginLockedOut
            | Self::LoginStandardUser => Suite::Login,
            Self::CartListsSelectedProducts | Self::Logout => Suite::Cart,
            _ => Suite::Home,
        }
    }

    /// Human-readable name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LoginEmptyFields => "login with empty username and password",
            Self::LoginEmptyUsername => "login with empty username",
            Self::LoginEmptyPassword => "login with empty password",
            Self::LoginLockedOut => "login with locked out user",
            Self::LoginStandardUser => "login with standard user",
            Self::SortByName => "sort products by name",
            Self::SortByPrice => "sort products by price",
            Self::AddProductsToCart => "add products to cart",
            Self::NavigateToCart => "navigate to cart",
            Self::NavigateToDetail => "navigate to product detail",
            Self::SocialTwitter => "open Twitter link",
            Self::SocialFacebook => "open Facebook link",
            Self::SocialLinkedin => "open LinkedIn link",
            Self::NavigateToAbout => "navigate to About",
            Self::ResetAppState => "reset app state",
            Self::CartListsSelectedProducts => "cart lists selected products",
            Self::Logout => "logout",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs suites over one session
#[derive(Debug)]
pub struct SuiteRunner<D: SessionDriver> {
    session: Session<D>,
    context: Option<SuiteContext>,
    aborted: Option<String>,
}

impl<D: SessionDriver> SuiteRunner<D> {
    /// Runner owning `session`
    #[must_use]
    pub const fn new(session: Session<D>) -> Self {
        Self {
            session,
            context: None,
            aborted: None,
        }
    }

    /// The session
    #[must_use]
    pub const fn session(&self) -> &Session<D> {
        &self.session
    }

    /// Listing context, once a suite has captured it
    #[must_use]
    pub const fn context(&self) -> Option<&SuiteContext> {
        self.context.as_ref()
    }

    /// Run `suites`, then quit the session. Results are logged as they
    /// happen, so a failed quit still leaves a trace of the run.
    pub async fn run(mut self, suites: &[Suite]) -> SwagResult<RunReport> {
        let report = self.run_suites(suites).await;
        match self.finish().await {
            Ok(_) => Ok(report),
            Err(e) => {
                error!(error = %e, "failed to close browser session");
                Err(e)
            }
        }
    }

    /// Run `suites` without ending the session
    pub async fn run_suites(&mut self, suites: &[Suite]) -> RunReport {
        let start = Instant::now();
        let mut report = RunReport::default();
        for &suite in suites {
            report.suites.push(self.run_suite(suite).await);
        }
        report.duration = start.elapsed();
        info!(
            passed = report.passed_count(),
            failed = report.failed_count(),
            "run finished"
        );
        report
    }

    /// Quit the session and hand back the driver
    pub async fn finish(mut self) -> SwagResult<D> {
        self.session.quit().await?;
        Ok(self.session.into_driver())
    }

    /// Run one suite: its setup, then each scenario in order
    pub async fn run_suite(&mut self, suite: Suite) -> SuiteResults {
        let start = Instant::now();
        info!(%suite, "suite started");

        let setup = if self.aborted.is_some() {
            Ok(())
        } else {
            self.setup(suite).await
        };
        if let Err(e) = &setup {
            warn!(%suite, error = %e, "suite setup failed");
            if e.is_fatal() {
                self.aborted = Some(e.to_string());
            }
        }

        let mut results = Vec::with_capacity(suite.scenarios().len());
        for &scenario in suite.scenarios() {
            let result = if let Some(reason) = &self.aborted {
                ScenarioResult::fail(suite.title(), scenario.name(), format!("not run: {reason}"))
            } else if let Err(e) = &setup {
                ScenarioResult::fail(
                    suite.title(),
                    scenario.name(),
                    format!("suite setup failed: {e}"),
                )
            } else {
                self.run_scenario(scenario).await
            };
            results.push(result);
        }

        let results = SuiteResults {
            suite_name: suite.title().to_string(),
            results,
            duration: start.elapsed(),
        };
        info!(
            %suite,
            passed = results.passed_count(),
            failed = results.failed_count(),
            "suite finished"
        );
        results
    }

    async fn setup(&mut self, suite: Suite) -> SwagResult<()> {
        match suite {
            Suite::Login => {
                self.session.open().await?;
                self.session.expect_present(names::LOGIN_BUTTON).await
            }
            Suite::Home | Suite::Cart => {
                suites::ensure_listing(&mut self.session).await?;
                self.context = None;
                self.context = Some(SuiteContext::capture(&self.session).await?);
                Ok(())
            }
        }
    }

    /// Run one scenario and record its outcome
    pub async fn run_scenario(&mut self, scenario: Scenario) -> ScenarioResult {
        let suite = scenario.suite();
        let start = Instant::now();
        info!(%suite, %scenario, "scenario started");

        let outcome = self.execute(scenario).await;
        let duration = start.elapsed();
        match outcome {
            Ok(screenshot) => {
                info!(%suite, %scenario, elapsed_ms = duration.as_millis() as u64, "scenario passed");
                ScenarioResult::pass(suite.title(), scenario.name())
                    .with_screenshot(screenshot)
                    .with_duration(duration)
            }
            Err(e) => {
                warn!(%suite, %scenario, error = %e, "scenario failed");
                if e.is_fatal() {
                    self.aborted = Some(e.to_string());
                }
                ScenarioResult::fail(suite.title(), scenario.name(), e.to_string())
                    .with_duration(duration)
            }
        }
    }

    async fn execute(&mut self, scenario: Scenario) -> SwagResult<Option<PathBuf>> {
        let Self {
            session, context, ..
        } = self;

        let context = context.as_ref();
        let ctx = || {
            context.ok_or_else(|| SwagError::assertion("listing context has not been captured"))
        };

        match scenario {
            Scenario::LoginEmptyFields => suites::login_empty_fields(session).await?,
            Scenario::LoginEmptyUsername => suites::login_empty_username(session).await?,
            Scenario::LoginEmptyPassword => suites::login_empty_password(session).await?,
            Scenario::LoginLockedOut => suites::login_locked_out(session).await?,
            Scenario::LoginStandardUser => suites::login_standard_user(session).await?,
            Scenario::SortByName => suites::sort_by_name(session, ctx()?).await?,
            Scenario::SortByPrice => suites::sort_by_price(session, ctx()?).await?,
            Scenario::AddProductsToCart => suites::add_products_to_cart(session, ctx()?).await?,
            Scenario::NavigateToCart => suites::navigate_to_cart(session).await?,
            Scenario::NavigateToDetail => suites::navigate_to_detail(session, ctx()?).await?,
            Scenario::SocialTwitter => {
                return suites::social_link(
                    session,
                    names::SOCIAL_TWITTER,
                    suites::TWITTER_HOSTS,
                    "Social_Twitter",
                )
                .await
            }
            Scenario::SocialFacebook => {
                return suites::social_link(
                    session,
                    names::SOCIAL_FACEBOOK,
                    suites::FACEBOOK_HOSTS,
                    "Social_Facebook",
                )
                .await
            }
            Scenario::SocialLinkedin => {
                return suites::social_link(
                    session,
                    names::SOCIAL_LINKEDIN,
                    suites::LINKEDIN_HOSTS,
                    "Social_Linkedin",
                )
                .await
            }
            Scenario::NavigateToAbout => return suites::navigate_to_about(session).await,
            Scenario::ResetAppState => suites::reset_app_state(session).await?,
            Scenario::CartListsSelectedProducts => {
                suites::cart_lists_selected_products(session, ctx()?).await?;
            }
            Scenario::Logout => suites::logout(session).await?,
        }
        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{SiteConfig, Timing};
    use crate::flaky::FlakyDriver;
    use crate::locator::LocatorRegistry;
    use crate::mock::{Fault, MockStorefront};

    fn runner(driver: MockStorefront, dir: &std::path::Path) -> SuiteRunner<MockStorefront> {
        let config = SiteConfig::default()
            .with_timing(Timing::instant())
            .with_screenshot_dir(dir)
            .with_seed(3);
        SuiteRunner::new(Session::new(driver, config))
    }

    mod suite_tests {
        use super::*;

        #[test]
        fn test_suite_from_str() {
            assert_eq!("login".parse::<Suite>().unwrap(), Suite::Login);
            assert_eq!(" HOME ".parse::<Suite>().unwrap(), Suite::Home);
            assert!(matches!(
                "checkout".parse::<Suite>(),
                Err(SwagError::Config { .. })
            ));
        }

        #[test]
        fn test_every_scenario_listed_once_under_its_suite() {
            let mut seen = Vec::new();
            for suite in Suite::ALL {
                for &scenario in suite.scenarios() {
                    assert_eq!(scenario.suite(), suite, "{scenario}");
                    assert!(!seen.contains(&scenario));
                    seen.push(scenario);
                }
            }
            assert_eq!(seen.len(), 17);
        }
    }

    mod runner_tests {
        use super::*;

        #[tokio::test]
        async fn test_full_run_passes_and_quits_once() {
            let tmp = tempfile::tempdir().unwrap();
            let mut runner = runner(MockStorefront::new(), tmp.path());
            let report = runner.run_suites(&Suite::ALL).await;
            for result in report.scenarios() {
                assert!(result.passed, "{}: {:?}", result.name, result.error);
            }
            assert_eq!(report.total(), 17);

            let shots: Vec<_> = report
                .scenarios()
                .filter_map(|r| r.screenshot.clone())
                .collect();
            assert_eq!(shots.len(), 4);
            assert!(tmp.path().join("About.png").exists());

            let driver = runner.finish().await.unwrap();
            assert!(driver.is_quit());
            assert_eq!(driver.history().iter().filter(|c| *c == "quit").count(), 1);
        }

        #[tokio::test]
        async fn test_failures_stay_local() {
            let tmp = tempfile::tempdir().unwrap();
            let mut runner = runner(
                MockStorefront::new()
                    .with_fault(Fault::IgnoreSort)
                    .with_fault(Fault::StaleBadgeAfterReset),
                tmp.path(),
            );
            let report = runner.run_suites(&[Suite::Home]).await;
            let failed: Vec<&str> = report
                .scenarios()
                .filter(|r| !r.passed)
                .map(|r| r.name.as_str())
                .collect();
            assert_eq!(
                failed,
                vec![
                    Scenario::SortByName.name(),
                    Scenario::SortByPrice.name(),
                    Scenario::ResetAppState.name()
                ]
            );
            assert!(runner.context().is_some());
        }

        #[tokio::test]
        async fn test_cart_suite_alone_logs_in() {
            let tmp = tempfile::tempdir().unwrap();
            let runner = runner(MockStorefront::new(), tmp.path());
            let report = runner.run(&[Suite::Cart]).await.unwrap();
            assert!(report.all_passed());
        }

        #[tokio::test]
        async fn test_fatal_error_skips_the_rest() {
            let tmp = tempfile::tempdir().unwrap();
            let mut driver = MockStorefront::new();
            driver.quit().await.unwrap();
            let mut runner = runner(driver, tmp.path());

            let report = runner.run_suites(&[Suite::Login, Suite::Cart]).await;
            assert_eq!(report.failed_count(), 7);
            assert!(report
                .scenarios()
                .all(|r| r.error.as_deref().unwrap_or_default().starts_with("not run")));
            assert!(runner.finish().await.unwrap_err().is_fatal());
        }

        #[tokio::test]
        async fn test_lost_page_context_fails_no_scenario() {
            let tmp = tempfile::tempdir().unwrap();
            let cart = LocatorRegistry::storefront()
                .resolve(names::CART_BUTTON)
                .unwrap();
            let driver = FlakyDriver::new(MockStorefront::new()).lose_context_after_click(cart);
            let config = SiteConfig::default()
                .with_timing(Timing::instant())
                .with_screenshot_dir(tmp.path())
                .with_seed(3);
            let mut runner = SuiteRunner::new(Session::new(driver, config));

            let report = runner.run_suites(&[Suite::Home, Suite::Cart]).await;
            for result in report.scenarios() {
                assert!(result.passed, "{}: {:?}", result.name, result.error);
            }
            assert_eq!(report.total(), 12);
            assert!(runner.finish().await.is_ok());
        }

        #[tokio::test]
        async fn test_each_listing_suite_captures_context() {
            let tmp = tempfile::tempdir().unwrap();
            let config = SiteConfig::default()
                .with_timing(Timing::instant())
                .with_screenshot_dir(tmp.path())
                .with_seed(3);
            let session = Session::new(FlakyDriver::new(MockStorefront::new()), config);
            let mut runner = SuiteRunner::new(session);

            let _ = runner.run_suites(&[Suite::Login, Suite::Home, Suite::Cart]).await;
            let cards = LocatorRegistry::storefront()
                .resolve_all(names::PRODUCT_CARD)
                .unwrap();
            assert_eq!(runner.session().driver().count_calls(&cards), 2);
            assert_eq!(runner.context().unwrap().product_count(), 6);
        }

        #[tokio::test]
        async fn test_social_screenshots_named_after_network() {
            let tmp = tempfile::tempdir().unwrap();
            let mut runner = runner(MockStorefront::new(), tmp.path());
            let report = runner.run_suites(&[Suite::Home]).await;
            assert!(report.all_passed());
            for name in ["Social_Twitter", "Social_Facebook", "Social_Linkedin", "About"] {
                assert!(tmp.path().join(format!("{name}.png")).exists(), "{name}");
            }
        }

        #[tokio::test]
        async fn test_context_required() {
            let tmp = tempfile::tempdir().unwrap();
            let mut runner = runner(MockStorefront::new().logged_in(), tmp.path());
            let result = runner.run_scenario(Scenario::SortByName).await;
            assert!(!result.passed);
            assert!(result.error.unwrap().contains("context"));
        }
    }
}
