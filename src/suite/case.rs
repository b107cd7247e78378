//! Individual conformance test definition and execution
//!
//! A test declares its prerequisites (features, exemptions, channel,
//! manifests) and an async body. The gate decision is a pure function of
//! the suite policy so that it can be tested without a cluster.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use futures::future::BoxFuture;
use tracing::{debug, info};

use super::config::{ConformanceTestSuite, SuitePolicy};
use super::features::{Channel, ExemptFeature, SupportedFeature};
use super::report::TestReport;

/// Executable body of a conformance test.
pub type TestFn = fn(Arc<ConformanceTestSuite>) -> BoxFuture<'static, Result<()>>;

/// Why a test was skipped rather than executed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The test requires a feature the suite has not opted into.
    UnsupportedFeature(SupportedFeature),
    /// The test applies only to implementations that declared an exemption
    /// the suite has not opted into.
    MissingExemption(ExemptFeature),
    /// The test belongs to a channel below the suite's configured minimum.
    ChannelExcluded {
        required: Channel,
        configured: Channel,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedFeature(feature) => {
                write!(f, "suite does not support {feature}")
            }
            SkipReason::MissingExemption(feature) => {
                write!(f, "suite does not exempt {feature}")
            }
            SkipReason::ChannelExcluded {
                required,
                configured,
            } => {
                write!(f, "requires the {required} channel, suite runs {configured}")
            }
        }
    }
}

/// Outcome of one conformance test.
#[derive(Clone, Debug)]
pub enum TestOutcome {
    Passed,
    Skipped(SkipReason),
    Failed(String),
}

/// A single registered conformance test.
#[derive(Clone)]
pub struct ConformanceTest {
    /// Unique short name within a run.
    pub short_name: &'static str,

    /// Human description of the requirement being verified.
    pub description: &'static str,

    /// Manifests applied (with cleanup) before the body runs.
    pub manifests: Vec<&'static str>,

    /// Features the suite must support for this test to run.
    pub features: Vec<SupportedFeature>,

    /// Exemptions the suite must declare for this test to run.
    pub exemptions: Vec<ExemptFeature>,

    /// Minimum release channel this test belongs to.
    pub min_channel: Channel,

    /// Takes noticeably longer than its siblings. Informational only.
    pub slow: bool,

    /// May run concurrently with other parallel tests.
    pub parallel: bool,

    /// The executable test body.
    pub test: TestFn,
}

impl ConformanceTest {
    /// Decide whether this test must be skipped under the given policy.
    ///
    /// Checks run in a fixed order (required features, exemptions, channel)
    /// and the first unmet condition wins.
    pub fn skip_reason(&self, policy: &SuitePolicy) -> Option<SkipReason> {
        for feature in &self.features {
            if !policy.supported_features.contains(feature) {
                return Some(SkipReason::UnsupportedFeature(*feature));
            }
        }

        for feature in &self.exemptions {
            if !policy.exempt_features.contains(feature) {
                return Some(SkipReason::MissingExemption(*feature));
            }
        }

        if self.min_channel < policy.min_channel {
            return Some(SkipReason::ChannelExcluded {
                required: self.min_channel,
                configured: policy.min_channel,
            });
        }

        None
    }

    /// Run this test against the suite, applying its manifests first.
    ///
    /// A skipped test applies nothing. A manifest that fails to apply fails
    /// this test only; the body is never invoked in that case.
    pub async fn run(&self, suite: Arc<ConformanceTestSuite>) -> TestReport {
        let start = Instant::now();

        if let Some(reason) = self.skip_reason(suite.policy()) {
            info!("Skipping {}: {}", self.short_name, reason);
            return TestReport::new(self.short_name, TestOutcome::Skipped(reason), 0);
        }

        debug!("Running {}", self.short_name);

        for location in &self.manifests {
            info!("Applying {}", location);
            if let Err(e) = suite
                .applier()
                .apply_with_cleanup(suite.client(), location, suite.gateway_class_name(), true)
                .await
            {
                let outcome = TestOutcome::Failed(format!("failed to apply {location}: {e:#}"));
                return TestReport::new(
                    self.short_name,
                    outcome,
                    start.elapsed().as_millis() as u64,
                );
            }
        }

        let outcome = match (self.test)(suite.clone()).await {
            Ok(()) => TestOutcome::Passed,
            Err(e) => TestOutcome::Failed(format!("{e:#}")),
        };

        TestReport::new(self.short_name, outcome, start.elapsed().as_millis() as u64)
    }
}

impl fmt::Debug for ConformanceTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConformanceTest")
            .field("short_name", &self.short_name)
            .field("features", &self.features)
            .field("exemptions", &self.exemptions)
            .field("min_channel", &self.min_channel)
            .field("slow", &self.slow)
            .field("parallel", &self.parallel)
            .finish()
    }
}
