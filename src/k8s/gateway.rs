//! Gateway resource management
//!
//! Typed Gateway resource plus the status lookups tests rely on.

#![allow(dead_code)]

use anyhow::{bail, Context, Result};
use kube::api::Api;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{condition_is_true, K8sClient, StatusCondition};

/// Gateway custom resource specification
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "gateway.networking.k8s.io",
    version = "v1",
    kind = "Gateway",
    namespaced
)]
#[kube(status = "GatewayStatus")]
pub struct GatewaySpec {
    /// GatewayClass name
    #[serde(rename = "gatewayClassName")]
    pub gateway_class_name: String,

    /// Listeners for the gateway
    #[serde(default)]
    pub listeners: Vec<ListenerSpec>,
}

/// Gateway listener specification
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
pub struct ListenerSpec {
    /// Listener name
    pub name: String,

    /// Port number
    pub port: u16,

    /// Protocol (HTTP, HTTPS, TLS, TCP, UDP)
    pub protocol: String,

    /// Hostname for this listener
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

/// Gateway status
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
pub struct GatewayStatus {
    /// Addresses assigned to the gateway
    #[serde(default)]
    pub addresses: Vec<AddressSpec>,

    /// Conditions
    #[serde(default)]
    pub conditions: Vec<StatusCondition>,

    /// Listener statuses
    #[serde(default)]
    pub listeners: Vec<ListenerStatus>,
}

/// Gateway address
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
pub struct AddressSpec {
    /// Address type (IPAddress, Hostname)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,

    /// Address value
    pub value: String,
}

/// Listener status
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
pub struct ListenerStatus {
    /// Listener name
    pub name: String,

    /// Number of attached routes
    #[serde(rename = "attachedRoutes")]
    pub attached_routes: i32,

    /// Conditions
    #[serde(default)]
    pub conditions: Vec<StatusCondition>,
}

/// Whether the gateway has been accepted by its controller.
pub fn is_accepted(gateway: &Gateway) -> bool {
    gateway
        .status
        .as_ref()
        .map(|status| condition_is_true(&status.conditions, "Accepted"))
        .unwrap_or(false)
}

/// Pick the address tests should target, preferring IP addresses.
pub fn preferred_address(status: &GatewayStatus) -> Option<&str> {
    status
        .addresses
        .iter()
        .find(|addr| addr.address_type.as_deref() == Some("IPAddress"))
        .or_else(|| status.addresses.first())
        .map(|addr| addr.value.as_str())
}

/// Fetch a gateway by name.
pub async fn get(client: &K8sClient, namespace: &str, name: &str) -> Result<Gateway> {
    let api: Api<Gateway> = client.namespaced_api(namespace);
    api.get(name)
        .await
        .with_context(|| format!("Failed to get Gateway {namespace}/{name}"))
}

/// Resolve the address tests should send traffic to.
pub async fn address(client: &K8sClient, namespace: &str, name: &str) -> Result<String> {
    let gateway = get(client, namespace, name).await?;

    let status = match &gateway.status {
        Some(status) => status,
        None => bail!("Gateway {namespace}/{name} has no status"),
    };

    match preferred_address(status) {
        Some(addr) => Ok(addr.to_string()),
        None => bail!("Gateway {namespace}/{name} has no addresses"),
    }
}
