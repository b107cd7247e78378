//! Namespace readiness checks
//!
//! Bounded polling until every pod in the given namespaces is ready and
//! every gateway in them has been accepted.

use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams};
use tracing::debug;

use super::gateway::{self, Gateway};
use super::K8sClient;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Block until all pods and gateways in the given namespaces are ready.
/// Errors when the bound elapses, naming the namespace still pending.
pub async fn namespaces_ready(
    client: &K8sClient,
    namespaces: &[&str],
    timeout_secs: u64,
) -> Result<()> {
    let start = Instant::now();
    let timeout = Duration::from_secs(timeout_secs);

    loop {
        let mut pending = None;

        for namespace in namespaces {
            if !namespace_ready(client, namespace).await? {
                pending = Some(*namespace);
                break;
            }
        }

        match pending {
            None => return Ok(()),
            Some(namespace) if start.elapsed() >= timeout => {
                bail!("namespace {namespace} was not ready within {timeout_secs}s")
            }
            Some(namespace) => debug!("namespace {} not ready yet", namespace),
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn namespace_ready(client: &K8sClient, namespace: &str) -> Result<bool> {
    let pods = client.list_pods(namespace).await?;
    if !pods.iter().all(pod_is_ready) {
        return Ok(false);
    }

    let gateways: Api<Gateway> = client.namespaced_api(namespace);
    let gateway_list = gateways.list(&ListParams::default()).await?;

    Ok(gateway_list.items.iter().all(gateway::is_accepted))
}

/// Whether a pod counts as ready: completed, or running with the Ready
/// condition set.
pub fn pod_is_ready(pod: &Pod) -> bool {
    let status = match &pod.status {
        Some(status) => status,
        None => return false,
    };

    if status.phase.as_deref() == Some("Succeeded") {
        return true;
    }

    status
        .conditions
        .as_ref()
        .map(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Ready" && c.status == "True")
        })
        .unwrap_or(false)
}
