//! Suite run reports
//!
//! Serializable per-test and whole-run results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::case::TestOutcome;

/// Final status of one test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

impl TestStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            TestStatus::Passed => "✓",
            TestStatus::Failed => "✗",
            TestStatus::Skipped => "○",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Passed => write!(f, "PASS"),
            TestStatus::Failed => write!(f, "FAIL"),
            TestStatus::Skipped => write!(f, "SKIP"),
        }
    }
}

/// Result of a single conformance test.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestReport {
    pub name: String,
    pub status: TestStatus,
    pub duration_ms: u64,
    pub message: Option<String>,
}

impl TestReport {
    pub fn new(name: impl Into<String>, outcome: TestOutcome, duration_ms: u64) -> Self {
        let (status, message) = match outcome {
            TestOutcome::Passed => (TestStatus::Passed, None),
            TestOutcome::Skipped(reason) => (TestStatus::Skipped, Some(reason.to_string())),
            TestOutcome::Failed(message) => (TestStatus::Failed, Some(message)),
        };

        Self {
            name: name.into(),
            status,
            duration_ms,
            message,
        }
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms]",
            self.status.symbol(),
            self.name,
            self.duration_ms
        )?;
        if let Some(msg) = &self.message {
            write!(f, " - {msg}")?;
        }
        Ok(())
    }
}

/// Summary of a whole conformance run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuiteReport {
    pub gateway_class: String,
    pub controller_name: Option<String>,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_duration_ms: u64,
    pub results: Vec<TestReport>,
}

impl SuiteReport {
    pub fn new(
        gateway_class: impl Into<String>,
        controller_name: Option<String>,
        started_at: DateTime<Utc>,
        results: Vec<TestReport>,
    ) -> Self {
        let total = results.len();
        let passed = results
            .iter()
            .filter(|r| r.status == TestStatus::Passed)
            .count();
        let failed = results
            .iter()
            .filter(|r| r.status == TestStatus::Failed)
            .count();
        let skipped = results
            .iter()
            .filter(|r| r.status == TestStatus::Skipped)
            .count();
        let total_duration_ms = results.iter().map(|r| r.duration_ms).sum();

        Self {
            gateway_class: gateway_class.into(),
            controller_name,
            started_at,
            total,
            passed,
            failed,
            skipped,
            total_duration_ms,
            results,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        let executed = self.passed + self.failed;
        if executed == 0 {
            0.0
        } else {
            (self.passed as f64 / executed as f64) * 100.0
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Conformance run - {} class", self.gateway_class)?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for result in &self.results {
            writeln!(f, "  {result}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Skip: {}",
            self.total, self.passed, self.failed, self.skipped
        )?;
        writeln!(
            f,
            "Pass Rate: {:.1}% | Duration: {}ms",
            self.pass_rate(),
            self.total_duration_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::{Channel, SkipReason};

    fn sample_results() -> Vec<TestReport> {
        vec![
            TestReport::new("RouteSimple", TestOutcome::Passed, 120),
            TestReport::new(
                "RouteGated",
                TestOutcome::Skipped(SkipReason::ChannelExcluded {
                    required: Channel::Experimental,
                    configured: Channel::Standard,
                }),
                0,
            ),
            TestReport::new("RouteBroken", TestOutcome::Failed("expected 200".into()), 45),
        ]
    }

    #[test]
    fn test_report_counts() {
        let report = SuiteReport::new("acme", None, Utc::now(), sample_results());
        assert_eq!(report.total, 3);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_pass_rate_excludes_skips() {
        let report = SuiteReport::new("acme", None, Utc::now(), sample_results());
        assert_eq!(report.pass_rate(), 50.0);
    }

    #[test]
    fn test_skip_carries_reason() {
        let report = TestReport::new(
            "Gated",
            TestOutcome::Skipped(SkipReason::UnsupportedFeature(
                crate::suite::SupportedFeature::ReferencePolicy,
            )),
            0,
        );
        assert_eq!(report.status, TestStatus::Skipped);
        assert_eq!(
            report.message.as_deref(),
            Some("suite does not support ReferencePolicy")
        );
    }
}
