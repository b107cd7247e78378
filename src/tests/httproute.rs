//! HTTPRoute conformance tests

use std::sync::Arc;

use anyhow::{bail, Result};
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::http::Request;
use crate::k8s::{gateway, httproute};
use crate::suite::{Channel, ConformanceTest, ConformanceTestSuite, ExemptFeature, SupportedFeature};

const INFRA_NAMESPACE: &str = "gateway-conformance-infra";
const GATEWAY_NAME: &str = "same-namespace";
const ROUTE_ACCEPTANCE_TIMEOUT_SECS: u64 = 60;

/// URL of the shared gateway for a request path.
async fn gateway_url(suite: &ConformanceTestSuite, path: &str) -> Result<String> {
    let address = gateway::address(suite.client(), INFRA_NAMESPACE, GATEWAY_NAME).await?;
    Ok(format!("http://{address}{path}"))
}

async fn send(
    suite: &ConformanceTestSuite,
    path: &str,
    host: &str,
    method: &str,
) -> Result<crate::http::Response> {
    let url = gateway_url(suite, path).await?;
    let request = Request::get(url).host(host).method(method);
    suite.round_tripper().capture_round_trip(request).await
}

pub fn simple_same_namespace() -> ConformanceTest {
    ConformanceTest {
        short_name: "HTTPRouteSimpleSameNamespace",
        description: "An HTTPRoute attached in the gateway's own namespace routes to a backend in that namespace",
        manifests: vec!["tests/httproute-simple-same-namespace.yaml"],
        features: Vec::new(),
        exemptions: Vec::new(),
        min_channel: Channel::Standard,
        slow: false,
        parallel: false,
        test: run_simple_same_namespace,
    }
}

fn run_simple_same_namespace(suite: Arc<ConformanceTestSuite>) -> BoxFuture<'static, Result<()>> {
    async move {
        httproute::wait_accepted(
            suite.client(),
            INFRA_NAMESPACE,
            "simple-same-namespace",
            ROUTE_ACCEPTANCE_TIMEOUT_SECS,
        )
        .await?;

        let response = send(&suite, "/", "same-namespace.example.com", "GET").await?;
        if response.status_code != 200 {
            bail!(
                "expected 200 from the same-namespace backend, got {}",
                response.status_code
            );
        }
        Ok(())
    }
    .boxed()
}

pub fn cross_namespace_reference_policy() -> ConformanceTest {
    ConformanceTest {
        short_name: "HTTPRouteCrossNamespaceReferencePolicy",
        description: "A ReferencePolicy permits an HTTPRoute to reach a backend in another namespace",
        manifests: vec!["tests/httproute-cross-namespace-reference-policy.yaml"],
        features: vec![SupportedFeature::ReferencePolicy],
        exemptions: Vec::new(),
        min_channel: Channel::Standard,
        slow: false,
        parallel: false,
        test: run_cross_namespace_reference_policy,
    }
}

fn run_cross_namespace_reference_policy(
    suite: Arc<ConformanceTestSuite>,
) -> BoxFuture<'static, Result<()>> {
    async move {
        httproute::wait_accepted(
            suite.client(),
            INFRA_NAMESPACE,
            "cross-namespace",
            ROUTE_ACCEPTANCE_TIMEOUT_SECS,
        )
        .await?;

        let response = send(&suite, "/", "web.example.com", "GET").await?;
        if response.status_code != 200 {
            bail!(
                "expected 200 from the cross-namespace backend, got {}",
                response.status_code
            );
        }
        Ok(())
    }
    .boxed()
}

pub fn cross_namespace_safeguards() -> ConformanceTest {
    ConformanceTest {
        short_name: "HTTPRouteCrossNamespaceSafeguards",
        description: "An implementation exempting itself from ReferencePolicy must still refuse an unsanctioned cross-namespace reference",
        manifests: vec!["tests/httproute-cross-namespace-no-reference-policy.yaml"],
        features: Vec::new(),
        exemptions: vec![ExemptFeature::ReferencePolicy],
        min_channel: Channel::Standard,
        slow: true,
        parallel: false,
        test: run_cross_namespace_safeguards,
    }
}

fn run_cross_namespace_safeguards(
    suite: Arc<ConformanceTestSuite>,
) -> BoxFuture<'static, Result<()>> {
    async move {
        let response = send(&suite, "/", "unsanctioned.example.com", "GET").await?;
        if response.is_success() {
            bail!(
                "unsanctioned cross-namespace reference was served (status {})",
                response.status_code
            );
        }
        Ok(())
    }
    .boxed()
}

pub fn method_matching() -> ConformanceTest {
    ConformanceTest {
        short_name: "HTTPRouteMethodMatching",
        description: "An HTTPRoute rule matching on method routes only requests with that method",
        manifests: vec!["tests/httproute-method-matching.yaml"],
        features: vec![SupportedFeature::HttpRouteMethodMatching],
        exemptions: Vec::new(),
        min_channel: Channel::Experimental,
        slow: false,
        parallel: true,
        test: run_method_matching,
    }
}

fn run_method_matching(suite: Arc<ConformanceTestSuite>) -> BoxFuture<'static, Result<()>> {
    async move {
        httproute::wait_accepted(
            suite.client(),
            INFRA_NAMESPACE,
            "method-matching",
            ROUTE_ACCEPTANCE_TIMEOUT_SECS,
        )
        .await?;

        let matched = send(&suite, "/method", "method.example.com", "POST").await?;
        if matched.status_code != 200 {
            bail!("expected 200 for a matched POST, got {}", matched.status_code);
        }

        let unmatched = send(&suite, "/method", "method.example.com", "GET").await?;
        if unmatched.status_code != 404 {
            bail!("expected 404 for an unmatched GET, got {}", unmatched.status_code);
        }
        Ok(())
    }
    .boxed()
}

pub fn query_param_matching() -> ConformanceTest {
    ConformanceTest {
        short_name: "HTTPRouteQueryParamMatching",
        description: "An HTTPRoute rule matching on a query parameter routes only requests carrying it",
        manifests: vec!["tests/httproute-query-param-matching.yaml"],
        features: vec![SupportedFeature::HttpRouteQueryParamMatching],
        exemptions: Vec::new(),
        min_channel: Channel::Experimental,
        slow: false,
        parallel: true,
        test: run_query_param_matching,
    }
}

fn run_query_param_matching(suite: Arc<ConformanceTestSuite>) -> BoxFuture<'static, Result<()>> {
    async move {
        httproute::wait_accepted(
            suite.client(),
            INFRA_NAMESPACE,
            "query-param-matching",
            ROUTE_ACCEPTANCE_TIMEOUT_SECS,
        )
        .await?;

        let matched = send(&suite, "/?animal=whale", "query.example.com", "GET").await?;
        if matched.status_code != 200 {
            bail!(
                "expected 200 for animal=whale, got {}",
                matched.status_code
            );
        }

        let unmatched = send(&suite, "/?animal=shark", "query.example.com", "GET").await?;
        if unmatched.status_code != 404 {
            bail!(
                "expected 404 for animal=shark, got {}",
                unmatched.status_code
            );
        }
        Ok(())
    }
    .boxed()
}
