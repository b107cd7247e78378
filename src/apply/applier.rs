//! Cluster-side manifest application
//!
//! Applies prepared documents through API discovery and server-side apply,
//! recording everything applied so the run can remove it afterwards.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use anyhow::{Context, Result};
use kube::api::{Api, DeleteParams, DynamicObject, Patch, PatchParams};
use kube::core::GroupVersionKind;
use kube::discovery::{self, ApiResource, Scope};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::k8s::K8sClient;

use super::manifest;

const FIELD_MANAGER: &str = "gateway-conformance";

/// One object applied to the cluster, recorded for cleanup.
#[derive(Clone, Debug)]
pub struct AppliedResource {
    pub api_resource: ApiResource,
    pub namespace: Option<String>,
    pub name: String,
}

/// Applies manifests and schedules their removal at test-run end.
pub struct Applier {
    namespace_labels: BTreeMap<String, String>,
    ports_in_use: bool,
    listener_ports: Mutex<VecDeque<u16>>,
    applied: Mutex<Vec<AppliedResource>>,
}

impl Applier {
    pub fn new(namespace_labels: BTreeMap<String, String>, listener_ports: Vec<u16>) -> Self {
        Self {
            namespace_labels,
            ports_in_use: !listener_ports.is_empty(),
            listener_ports: Mutex::new(VecDeque::from(listener_ports)),
            applied: Mutex::new(Vec::new()),
        }
    }

    /// Apply every document in the manifest at `location`, optionally
    /// registering each applied object for cleanup.
    pub async fn apply_with_cleanup(
        &self,
        client: &K8sClient,
        location: &str,
        gateway_class_name: &str,
        register_cleanup: bool,
    ) -> Result<()> {
        let content = tokio::fs::read_to_string(location)
            .await
            .with_context(|| format!("Failed to read manifest {location}"))?;

        let mut documents = manifest::parse_documents(&content)
            .with_context(|| format!("Failed to parse manifest {location}"))?;

        for document in &mut documents {
            {
                let mut ports = self.listener_ports.lock().unwrap();
                manifest::prepare_document(
                    document,
                    gateway_class_name,
                    &self.namespace_labels,
                    &mut ports,
                    self.ports_in_use,
                )?;
            }

            self.apply_document(client, document, register_cleanup)
                .await?;
        }

        Ok(())
    }

    async fn apply_document(
        &self,
        client: &K8sClient,
        document: &Value,
        register_cleanup: bool,
    ) -> Result<()> {
        let gvk = gvk_of(document)?;
        let (api_resource, capabilities) = discovery::pinned_kind(client.client(), &gvk)
            .await
            .with_context(|| format!("Failed to discover API for {}", gvk.kind))?;

        let object: DynamicObject =
            serde_json::from_value(document.clone()).context("Failed to decode manifest document")?;
        let name = object
            .metadata
            .name
            .clone()
            .context("manifest document has no name")?;

        let namespace = match capabilities.scope {
            Scope::Cluster => None,
            Scope::Namespaced => Some(
                object
                    .metadata
                    .namespace
                    .clone()
                    .unwrap_or_else(|| "default".to_string()),
            ),
        };

        let api = dynamic_api(client, &api_resource, namespace.as_deref());
        let params = PatchParams::apply(FIELD_MANAGER).force();
        api.patch(&name, &params, &Patch::Apply(document))
            .await
            .with_context(|| format!("Failed to apply {} {}", gvk.kind, name))?;

        debug!("applied {} {}", gvk.kind, name);

        if register_cleanup {
            self.applied.lock().unwrap().push(AppliedResource {
                api_resource,
                namespace,
                name,
            });
        }

        Ok(())
    }

    /// Number of objects currently registered for cleanup.
    pub fn registered(&self) -> usize {
        self.applied.lock().unwrap().len()
    }

    /// Delete registered objects, newest first. Objects already gone are
    /// ignored; other delete failures are logged and do not stop the sweep.
    pub async fn cleanup(&self, client: &K8sClient) -> Result<()> {
        let resources: Vec<AppliedResource> = {
            let mut applied = self.applied.lock().unwrap();
            applied.drain(..).rev().collect()
        };

        info!("Cleaning up {} applied resources", resources.len());

        for resource in resources {
            let api = dynamic_api(client, &resource.api_resource, resource.namespace.as_deref());

            match api.delete(&resource.name, &DeleteParams::default()).await {
                Ok(_) => debug!(
                    "deleted {} {}",
                    resource.api_resource.kind, resource.name
                ),
                Err(kube::Error::Api(e)) if e.code == 404 => {}
                Err(e) => warn!(
                    "failed to delete {} {}: {}",
                    resource.api_resource.kind, resource.name, e
                ),
            }
        }

        Ok(())
    }
}

fn dynamic_api(
    client: &K8sClient,
    api_resource: &ApiResource,
    namespace: Option<&str>,
) -> Api<DynamicObject> {
    match namespace {
        Some(namespace) => Api::namespaced_with(client.client().clone(), namespace, api_resource),
        None => Api::all_with(client.client().clone(), api_resource),
    }
}

fn gvk_of(document: &Value) -> Result<GroupVersionKind> {
    let api_version = document
        .get("apiVersion")
        .and_then(Value::as_str)
        .context("manifest document has no apiVersion")?;
    let kind = document
        .get("kind")
        .and_then(Value::as_str)
        .context("manifest document has no kind")?;

    let (group, version) = match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    };

    Ok(GroupVersionKind::gvk(group, version, kind))
}
