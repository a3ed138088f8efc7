//! Scenario and suite results.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::result::SwagResult;

#[allow(clippy::trivially_copy_pass_by_ref)]
fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Result of running a single scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioResult {
    /// Suite the scenario belongs to
    pub suite: String,
    /// Scenario name
    pub name: String,
    /// Whether the scenario passed
    pub passed: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Screenshot captured by the scenario
    pub screenshot: Option<PathBuf>,
    /// Scenario duration
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl ScenarioResult {
    /// Create a passing result
    #[must_use]
    pub fn pass(suite: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            name: name.into(),
            passed: true,
            error: None,
            screenshot: None,
            duration: Duration::ZERO,
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn fail(
        suite: impl Into<String>,
        name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            suite: suite.into(),
            name: name.into(),
            passed: false,
            error: Some(error.into()),
            screenshot: None,
            duration: Duration::ZERO,
        }
    }

    /// Attach a screenshot path
    #[must_use]
    pub fn with_screenshot(mut self, screenshot: Option<PathBuf>) -> Self {
        self.screenshot = screenshot;
        self
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Results from running one suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteResults {
    /// Suite name
    pub suite_name: String,
    /// Individual scenario results
    pub results: Vec<ScenarioResult>,
    /// Total duration
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl SuiteResults {
    /// Check if all scenarios passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }
}

/// Results of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Per-suite results, in run order
    pub suites: Vec<SuiteResults>,
    /// Total duration
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl RunReport {
    /// Check if every scenario passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.suites.iter().all(SuiteResults::all_passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.suites.iter().map(SuiteResults::passed_count).sum()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.suites.iter().map(SuiteResults::failed_count).sum()
    }

    /// Total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.suites.iter().map(SuiteResults::total).sum()
    }

    /// Every scenario result, in run order
    pub fn scenarios(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.suites.iter().flat_map(|s| s.results.iter())
    }

    /// Render as pretty JSON
    pub fn to_json(&self) -> SwagResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn suite(name: &str, results: Vec<ScenarioResult>) -> SuiteResults {
        SuiteResults {
            suite_name: name.to_string(),
            results,
            duration: Duration::from_millis(20),
        }
    }

    #[test]
    fn test_scenario_result_builders() {
        let pass = ScenarioResult::pass("Home", "About")
            .with_screenshot(Some(PathBuf::from("documentation/About.png")))
            .with_duration(Duration::from_millis(12));
        assert!(pass.passed);
        assert!(pass.error.is_none());
        assert_eq!(pass.duration, Duration::from_millis(12));

        let fail = ScenarioResult::fail("Login", "Locked out", "wrong text");
        assert!(!fail.passed);
        assert_eq!(fail.error.as_deref(), Some("wrong text"));
    }

    #[test]
    fn test_suite_counts() {
        let results = suite(
            "Home",
            vec![
                ScenarioResult::pass("Home", "a"),
                ScenarioResult::fail("Home", "b", "x"),
                ScenarioResult::pass("Home", "c"),
            ],
        );
        assert!(!results.all_passed());
        assert_eq!(results.passed_count(), 2);
        assert_eq!(results.failed_count(), 1);
        assert_eq!(results.total(), 3);
        assert_eq!(results.failures()[0].name, "b");
    }

    #[test]
    fn test_report_totals_and_json() {
        let report = RunReport {
            suites: vec![
                suite("Login", vec![ScenarioResult::pass("Login", "a")]),
                suite("Cart", vec![ScenarioResult::fail("Cart", "b", "x")]),
            ],
            duration: Duration::from_millis(1500),
        };
        assert_eq!(report.total(), 2);
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.scenarios().count(), 2);

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["duration_ms"], 1500);
        assert_eq!(json["suites"][1]["results"][0]["error"], "x");
        assert_eq!(json["suites"][0]["results"][0]["passed"], true);
    }

    #[test]
    fn test_empty_report_passes() {
        let report = RunReport::default();
        assert!(report.all_passed());
        assert_eq!(report.total(), 0);
    }
}
