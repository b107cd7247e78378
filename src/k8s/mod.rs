//! Kubernetes API client module
//!
//! Provides the cluster client and typed Gateway API resources used by the
//! conformance suite.

mod client;
pub mod gateway;
pub mod gatewayclass;
pub mod httproute;
pub mod readiness;

pub use client::K8sClient;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status condition reported by Gateway API resources.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
pub struct StatusCondition {
    /// Condition type
    #[serde(rename = "type")]
    pub condition_type: String,

    /// Status (True, False, Unknown)
    pub status: String,

    /// Machine-readable reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Generation the condition was observed at
    #[serde(rename = "observedGeneration", skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// Whether a condition of the given type is present with status `True`.
pub fn condition_is_true(conditions: &[StatusCondition], condition_type: &str) -> bool {
    conditions
        .iter()
        .any(|c| c.condition_type == condition_type && c.status == "True")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(condition_type: &str, status: &str) -> StatusCondition {
        StatusCondition {
            condition_type: condition_type.to_string(),
            status: status.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_condition_is_true() {
        let conditions = vec![condition("Accepted", "True"), condition("Ready", "False")];

        assert!(condition_is_true(&conditions, "Accepted"));
        assert!(!condition_is_true(&conditions, "Ready"));
        assert!(!condition_is_true(&conditions, "Programmed"));
    }
}
