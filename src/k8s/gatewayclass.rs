//! GatewayClass resource and acceptance wait
//!
//! The suite's target implementation is identified by a GatewayClass; setup
//! blocks until the cluster has accepted it.

#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use kube::api::Api;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{condition_is_true, K8sClient, StatusCondition};

/// GatewayClass custom resource specification
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(group = "gateway.networking.k8s.io", version = "v1", kind = "GatewayClass")]
#[kube(status = "GatewayClassStatus")]
pub struct GatewayClassSpec {
    /// Controller managing gateways of this class
    #[serde(rename = "controllerName")]
    pub controller_name: String,

    /// Human description of the class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// GatewayClass status
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
pub struct GatewayClassStatus {
    #[serde(default)]
    pub conditions: Vec<StatusCondition>,
}

/// Whether the class has been accepted by the cluster.
pub fn is_accepted(gateway_class: &GatewayClass) -> bool {
    gateway_class
        .status
        .as_ref()
        .map(|status| condition_is_true(&status.conditions, "Accepted"))
        .unwrap_or(false)
}

/// Block until the named GatewayClass is accepted, returning the controller
/// name from its spec. Errors when the bound elapses first.
pub async fn wait_accepted(client: &K8sClient, name: &str, timeout_secs: u64) -> Result<String> {
    let api: Api<GatewayClass> = client.cluster_api();
    let start = Instant::now();
    let timeout = Duration::from_secs(timeout_secs);

    while start.elapsed() < timeout {
        let found = api
            .get_opt(name)
            .await
            .context("Failed to get GatewayClass")?;

        match found {
            Some(gateway_class) if is_accepted(&gateway_class) => {
                return Ok(gateway_class.spec.controller_name);
            }
            Some(_) => debug!("GatewayClass {} not accepted yet", name),
            None => debug!("GatewayClass {} not found yet", name),
        }

        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    bail!("GatewayClass {name} was not accepted within {timeout_secs}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_with_condition(condition_type: &str, status: &str) -> GatewayClass {
        let mut gateway_class = GatewayClass::new(
            "acme",
            GatewayClassSpec {
                controller_name: "acme.io/gateway-controller".to_string(),
                description: None,
            },
        );
        gateway_class.status = Some(GatewayClassStatus {
            conditions: vec![StatusCondition {
                condition_type: condition_type.to_string(),
                status: status.to_string(),
                ..Default::default()
            }],
        });
        gateway_class
    }

    #[test]
    fn test_accepted_condition() {
        assert!(is_accepted(&class_with_condition("Accepted", "True")));
        assert!(!is_accepted(&class_with_condition("Accepted", "False")));
        assert!(!is_accepted(&class_with_condition("Pending", "True")));
    }

    #[test]
    fn test_no_status_is_not_accepted() {
        let gateway_class = GatewayClass::new(
            "acme",
            GatewayClassSpec {
                controller_name: "acme.io/gateway-controller".to_string(),
                description: None,
            },
        );
        assert!(!is_accepted(&gateway_class));
    }
}
