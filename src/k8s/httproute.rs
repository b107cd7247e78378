//! HTTPRoute resource management
//!
//! Typed HTTPRoute resource and the parent-acceptance wait used by tests
//! before sending traffic.

#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use kube::api::Api;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{condition_is_true, K8sClient, StatusCondition};

/// HTTPRoute custom resource specification
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "gateway.networking.k8s.io",
    version = "v1",
    kind = "HTTPRoute",
    namespaced
)]
#[kube(status = "HTTPRouteStatus")]
pub struct HTTPRouteSpec {
    /// Gateways this route attaches to
    #[serde(rename = "parentRefs", default, skip_serializing_if = "Vec::is_empty")]
    pub parent_refs: Vec<ParentRef>,

    /// Hostnames this route matches
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hostnames: Vec<String>,
}

/// Reference to a parent Gateway
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
pub struct ParentRef {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(rename = "sectionName", skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
}

/// HTTPRoute status
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
pub struct HTTPRouteStatus {
    #[serde(default)]
    pub parents: Vec<RouteParentStatus>,
}

/// Per-parent route status
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
pub struct RouteParentStatus {
    #[serde(rename = "parentRef")]
    pub parent_ref: ParentRef,

    #[serde(rename = "controllerName")]
    pub controller_name: String,

    #[serde(default)]
    pub conditions: Vec<StatusCondition>,
}

/// Whether some parent has accepted the route.
pub fn is_accepted(route: &HTTPRoute) -> bool {
    route
        .status
        .as_ref()
        .map(|status| {
            status
                .parents
                .iter()
                .any(|parent| condition_is_true(&parent.conditions, "Accepted"))
        })
        .unwrap_or(false)
}

/// Block until the named route is accepted by a parent. Errors when the
/// bound elapses first.
pub async fn wait_accepted(
    client: &K8sClient,
    namespace: &str,
    name: &str,
    timeout_secs: u64,
) -> Result<()> {
    let api: Api<HTTPRoute> = client.namespaced_api(namespace);
    let start = Instant::now();
    let timeout = Duration::from_secs(timeout_secs);

    while start.elapsed() < timeout {
        let found = api
            .get_opt(name)
            .await
            .context("Failed to get HTTPRoute")?;

        match found {
            Some(route) if is_accepted(&route) => return Ok(()),
            Some(_) => debug!("HTTPRoute {}/{} not accepted yet", namespace, name),
            None => debug!("HTTPRoute {}/{} not found yet", namespace, name),
        }

        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    bail!("HTTPRoute {namespace}/{name} was not accepted within {timeout_secs}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route_with_parent_condition(condition_type: &str, status: &str) -> HTTPRoute {
        let mut route = HTTPRoute::new("test-route", HTTPRouteSpec::default());
        route.status = Some(HTTPRouteStatus {
            parents: vec![RouteParentStatus {
                parent_ref: ParentRef {
                    name: "same-namespace".to_string(),
                    ..Default::default()
                },
                controller_name: "acme.io/gateway-controller".to_string(),
                conditions: vec![StatusCondition {
                    condition_type: condition_type.to_string(),
                    status: status.to_string(),
                    ..Default::default()
                }],
            }],
        });
        route
    }

    #[test]
    fn test_accepted_parent() {
        assert!(is_accepted(&route_with_parent_condition("Accepted", "True")));
        assert!(!is_accepted(&route_with_parent_condition(
            "Accepted", "False"
        )));
        assert!(!is_accepted(&route_with_parent_condition(
            "ResolvedRefs",
            "True"
        )));
    }

    #[test]
    fn test_no_status_is_not_accepted() {
        let route = HTTPRoute::new("test-route", HTTPRouteSpec::default());
        assert!(!is_accepted(&route));
    }
}
