//! Registered conformance tests
//!
//! Every test the harness knows about, in registration order.
//!
//! ## HTTPRoute tests
//! - Simple same-namespace routing
//! - Cross-namespace routing sanctioned by a ReferencePolicy
//! - Cross-namespace safeguards for exempted implementations
//! - Method matching (experimental)
//! - Query parameter matching (experimental)
//!
//! ## Gateway tests
//! - Per-listener status reporting

mod httproute;

use crate::suite::ConformanceTest;

/// All registered conformance tests.
pub fn all() -> Vec<ConformanceTest> {
    vec![
        httproute::simple_same_namespace(),
        httproute::cross_namespace_reference_policy(),
        httproute::cross_namespace_safeguards(),
        httproute::method_matching(),
        httproute::query_param_matching(),
        gateway::listener_status(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::{Channel, SkipReason, SuitePolicy, SupportedFeature};

    #[test]
    fn test_registry_names_unique() {
        let mut names: Vec<_> = all().iter().map(|t| t.short_name).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_default_policy_runs_core_tests_only() {
        let policy = SuitePolicy {
            supported_features: Vec::new(),
            exempt_features: Vec::new(),
            min_channel: Channel::Standard,
        };

        let decisions: Vec<_> = all()
            .iter()
            .map(|t| (t.short_name, t.skip_reason(&policy)))
            .collect();

        // Only the tests with no extra requirements run.
        let running: Vec<_> = decisions
            .iter()
            .filter(|(_, d)| d.is_none())
            .map(|(name, _)| *name)
            .collect();
        assert_eq!(
            running,
            vec!["HTTPRouteSimpleSameNamespace", "GatewayListenerStatus"]
        );
    }

    #[test]
    fn test_experimental_tests_gated_by_channel() {
        let policy = SuitePolicy {
            supported_features: SupportedFeature::all(),
            exempt_features: Vec::new(),
            min_channel: Channel::Standard,
        };

        let method = all()
            .into_iter()
            .find(|t| t.short_name == "HTTPRouteMethodMatching")
            .unwrap();

        // Features are satisfied, so the channel gate is what fires.
        assert_eq!(
            method.skip_reason(&policy),
            Some(SkipReason::ChannelExcluded {
                required: Channel::Experimental,
                configured: Channel::Standard,
            })
        );
    }

    #[test]
    fn test_parallel_tests_are_experimental_matchers() {
        let parallel: Vec<_> = all()
            .iter()
            .filter(|t| t.parallel)
            .map(|t| t.short_name)
            .collect();
        assert_eq!(
            parallel,
            vec!["HTTPRouteMethodMatching", "HTTPRouteQueryParamMatching"]
        );
    }
}
