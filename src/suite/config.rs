//! Suite configuration and runner
//!
//! Builds the suite from named options, installs the base resources, and
//! drives the registered tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::apply::Applier;
use crate::http::{DefaultRoundTripper, RoundTripper};
use crate::k8s::{gatewayclass, readiness, K8sClient};

use super::case::ConformanceTest;
use super::features::{Channel, ExemptFeature, SupportedFeature};
use super::report::{SuiteReport, TestReport};

/// Bounded wait for the GatewayClass to be accepted during setup.
pub const GATEWAY_CLASS_ACCEPTANCE_TIMEOUT_SECS: u64 = 180;

/// Bounded wait for base namespaces to become ready during setup.
pub const NAMESPACES_READY_TIMEOUT_SECS: u64 = 300;

/// Default location of the base manifests.
pub const DEFAULT_BASE_MANIFESTS: &str = "base/manifests.yaml";

/// Namespaces installed by the base manifests.
pub const INFRA_NAMESPACES: [&str; 3] = [
    "gateway-conformance-infra",
    "gateway-conformance-app-backend",
    "gateway-conformance-web-backend",
];

/// The suite's gating policy, consulted by every per-test gate check.
#[derive(Clone, Debug)]
pub struct SuitePolicy {
    pub supported_features: Vec<SupportedFeature>,
    pub exempt_features: Vec<ExemptFeature>,
    pub min_channel: Channel,
}

/// Named options used to initialize a [`ConformanceTestSuite`].
pub struct SuiteOptions {
    pub client: K8sClient,
    pub gateway_class_name: String,
    pub debug: bool,
    /// Override for the HTTP exchange mechanism. Defaults to a debug-aware
    /// direct implementation.
    pub round_tripper: Option<Arc<dyn RoundTripper>>,
    /// Location of the base manifests. Defaults to `base/manifests.yaml`.
    pub base_manifests: Option<String>,
    /// Labels merged onto every Namespace the applier installs.
    pub namespace_labels: BTreeMap<String, String>,
    /// Replacement ports assigned, in order, to each Gateway listener in
    /// the applied manifests. Ports are not modified when empty.
    pub valid_unique_listener_ports: Vec<u16>,
    /// Whether base resources are removed after the run.
    pub cleanup_base_resources: bool,
    pub exempt_features: Vec<ExemptFeature>,
    pub supported_features: Vec<SupportedFeature>,
    /// Minimum release channel. Defaults to [`Channel::Standard`].
    pub min_channel: Option<Channel>,
    /// Concurrency bound for tests marked parallel.
    pub max_concurrent: usize,
}

/// The conformance test suite.
pub struct ConformanceTestSuite {
    client: K8sClient,
    round_tripper: Arc<dyn RoundTripper>,
    gateway_class_name: String,
    controller_name: Option<String>,
    cleanup: bool,
    base_manifests: String,
    applier: Applier,
    policy: SuitePolicy,
    max_concurrent: usize,
}

impl ConformanceTestSuite {
    /// Build a suite from options, applying defaults for anything unset.
    pub fn new(options: SuiteOptions) -> Result<Self> {
        let round_tripper = match options.round_tripper {
            Some(rt) => rt,
            None => Arc::new(
                DefaultRoundTripper::new(options.debug)
                    .context("failed to build default round-tripper")?,
            ),
        };

        let applier = Applier::new(
            options.namespace_labels,
            options.valid_unique_listener_ports,
        );

        Ok(Self {
            client: options.client,
            round_tripper,
            gateway_class_name: options.gateway_class_name,
            controller_name: None,
            cleanup: options.cleanup_base_resources,
            base_manifests: resolve_base_manifests(options.base_manifests),
            applier,
            policy: SuitePolicy {
                supported_features: options.supported_features,
                exempt_features: options.exempt_features,
                min_channel: resolve_min_channel(options.min_channel),
            },
            max_concurrent: options.max_concurrent.max(1),
        })
    }

    pub fn client(&self) -> &K8sClient {
        &self.client
    }

    pub fn round_tripper(&self) -> &Arc<dyn RoundTripper> {
        &self.round_tripper
    }

    pub fn gateway_class_name(&self) -> &str {
        &self.gateway_class_name
    }

    /// Controller identity discovered during setup.
    pub fn controller_name(&self) -> Option<&str> {
        self.controller_name.as_deref()
    }

    pub fn policy(&self) -> &SuitePolicy {
        &self.policy
    }

    pub fn applier(&self) -> &Applier {
        &self.applier
    }

    /// Install the base resources and wait for the cluster to be ready.
    ///
    /// Errors here are fatal to the run: the GatewayClass must be accepted
    /// within its bound before any base manifest is applied, and the base
    /// namespaces must become ready within theirs.
    pub async fn setup(&mut self) -> Result<()> {
        info!(
            "Setup: ensuring GatewayClass {} has been accepted",
            self.gateway_class_name
        );
        let controller = gatewayclass::wait_accepted(
            &self.client,
            &self.gateway_class_name,
            GATEWAY_CLASS_ACCEPTANCE_TIMEOUT_SECS,
        )
        .await?;
        info!(
            "GatewayClass {} accepted, controller {}",
            self.gateway_class_name, controller
        );
        self.controller_name = Some(controller);

        info!("Setup: applying base manifests from {}", self.base_manifests);
        self.applier
            .apply_with_cleanup(
                &self.client,
                &self.base_manifests,
                &self.gateway_class_name,
                self.cleanup,
            )
            .await
            .context("failed to apply base manifests")?;

        info!("Setup: waiting for base namespaces to be ready");
        readiness::namespaces_ready(
            &self.client,
            &INFRA_NAMESPACES,
            NAMESPACES_READY_TIMEOUT_SECS,
        )
        .await?;

        Ok(())
    }

    /// Run the provided tests and collect a report.
    ///
    /// Tests not marked parallel run sequentially in registration order;
    /// parallel tests then run concurrently under the configured bound. A
    /// failure in one test never prevents the others from running.
    pub async fn run(self: Arc<Self>, tests: Vec<ConformanceTest>) -> SuiteReport {
        let started_at = Utc::now();
        info!("Running {} conformance tests", tests.len());

        let (serial, parallel) = partition_tests(tests);
        let mut indexed: Vec<(usize, TestReport)> = Vec::new();

        for (index, test) in serial {
            let report = test.run(self.clone()).await;
            info!("  {report}");
            indexed.push((index, report));
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::new();

        for (index, test) in parallel {
            let suite = self.clone();
            let semaphore = semaphore.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.unwrap();
                let report = test.run(suite).await;
                (index, report)
            }));
        }

        for joined in join_all(handles).await {
            match joined {
                Ok((index, report)) => {
                    info!("  {report}");
                    indexed.push((index, report));
                }
                Err(e) => warn!("parallel test task aborted: {e}"),
            }
        }

        indexed.sort_by_key(|(index, _)| *index);
        let results = indexed.into_iter().map(|(_, report)| report).collect();

        SuiteReport::new(
            self.gateway_class_name.clone(),
            self.controller_name.clone(),
            started_at,
            results,
        )
    }

    /// Delete every resource the applier registered, newest first.
    pub async fn cleanup_resources(&self) -> Result<()> {
        self.applier.cleanup(&self.client).await
    }
}

fn resolve_base_manifests(location: Option<String>) -> String {
    location.unwrap_or_else(|| DEFAULT_BASE_MANIFESTS.to_string())
}

fn resolve_min_channel(channel: Option<Channel>) -> Channel {
    channel.unwrap_or_default()
}

/// Split tests into the sequential batch and the concurrent batch, keeping
/// registration indices for deterministic reporting.
fn partition_tests(
    tests: Vec<ConformanceTest>,
) -> (
    Vec<(usize, ConformanceTest)>,
    Vec<(usize, ConformanceTest)>,
) {
    tests
        .into_iter()
        .enumerate()
        .partition(|(_, test)| !test.parallel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::TestFn;
    use futures::future::BoxFuture;
    use futures::FutureExt;

    fn noop_body(_suite: Arc<ConformanceTestSuite>) -> BoxFuture<'static, Result<()>> {
        async { Ok(()) }.boxed()
    }

    fn named(short_name: &'static str, parallel: bool) -> ConformanceTest {
        ConformanceTest {
            short_name,
            description: "",
            manifests: Vec::new(),
            features: Vec::new(),
            exemptions: Vec::new(),
            min_channel: Channel::Standard,
            slow: false,
            parallel,
            test: noop_body as TestFn,
        }
    }

    #[test]
    fn test_partition_keeps_registration_indices() {
        let tests = vec![
            named("a", false),
            named("b", true),
            named("c", false),
            named("d", true),
        ];

        let (serial, parallel) = partition_tests(tests);

        assert_eq!(
            serial
                .iter()
                .map(|(i, t)| (*i, t.short_name))
                .collect::<Vec<_>>(),
            vec![(0, "a"), (2, "c")]
        );
        assert_eq!(
            parallel
                .iter()
                .map(|(i, t)| (*i, t.short_name))
                .collect::<Vec<_>>(),
            vec![(1, "b"), (3, "d")]
        );
    }

    #[test]
    fn test_default_base_manifests_location() {
        assert_eq!(resolve_base_manifests(None), "base/manifests.yaml");
        assert_eq!(
            resolve_base_manifests(Some("custom/all.yaml".to_string())),
            "custom/all.yaml"
        );
    }

    #[test]
    fn test_default_channel_is_standard() {
        assert_eq!(resolve_min_channel(None), Channel::Standard);
        assert_eq!(
            resolve_min_channel(Some(Channel::Experimental)),
            Channel::Experimental
        );
    }
}
