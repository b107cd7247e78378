//! Kubernetes client wrapper
//!
//! Provides a high-level interface to the Kubernetes API.

#![allow(dead_code)]

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{
    api::{Api, ListParams},
    Client, Config,
};
use tracing::{debug, warn};

/// Gateway API CRDs the suite depends on.
const REQUIRED_CRDS: [&str; 3] = [
    "gatewayclasses.gateway.networking.k8s.io",
    "gateways.gateway.networking.k8s.io",
    "httproutes.gateway.networking.k8s.io",
];

/// Kubernetes client wrapper
#[derive(Clone)]
pub struct K8sClient {
    client: Client,
}

impl K8sClient {
    /// Create a new Kubernetes client from the ambient kubeconfig.
    pub async fn new() -> Result<Self> {
        let client = Client::try_default()
            .await
            .context("Failed to create Kubernetes client")?;

        Ok(Self { client })
    }

    /// Create client with custom config
    pub async fn with_config(config: Config) -> Result<Self> {
        let client =
            Client::try_from(config).context("Failed to create Kubernetes client from config")?;

        Ok(Self { client })
    }

    /// Get the underlying kube client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Check that every Gateway API CRD the suite needs is installed.
    pub async fn gateway_api_installed(&self) -> Result<bool> {
        let crds: Api<CustomResourceDefinition> = Api::all(self.client.clone());
        let mut missing = Vec::new();

        for name in REQUIRED_CRDS {
            match crds.get_opt(name).await.context("Failed to look up CRD")? {
                Some(_) => debug!("found CRD {name}"),
                None => missing.push(name),
            }
        }

        if missing.is_empty() {
            Ok(true)
        } else {
            warn!("Gateway API CRDs missing: {}", missing.join(", "));
            Ok(false)
        }
    }

    /// List pods in a namespace.
    pub async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pod_list = pods
            .list(&ListParams::default())
            .await
            .with_context(|| format!("Failed to list pods in {namespace}"))?;

        Ok(pod_list.items)
    }

    /// Create a namespaced API for a resource type
    pub fn namespaced_api<K>(&self, namespace: &str) -> Api<K>
    where
        K: kube::Resource<Scope = kube::core::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Create a cluster-wide API for a resource type
    pub fn cluster_api<K>(&self) -> Api<K>
    where
        K: kube::Resource<Scope = kube::core::ClusterResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        Api::all(self.client.clone())
    }
}
