//! Conformance test suite
//!
//! Holds the suite configuration, the per-test gating policy, and the
//! runner that drives registered tests against a live implementation.

mod case;
mod config;
mod features;
mod report;

pub use case::{ConformanceTest, SkipReason, TestFn, TestOutcome};
pub use config::{ConformanceTestSuite, SuiteOptions, SuitePolicy};
pub use features::{Channel, ExemptFeature, SupportedFeature};
pub use report::{SuiteReport, TestReport, TestStatus};
