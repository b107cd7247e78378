//! Configuration module
//!
//! Handles loading suite configuration from a file. CLI flags take
//! precedence over anything set here.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Suite configuration file contents. Every field is optional; unset
/// fields fall back to CLI flags and then to suite defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// GatewayClass under test
    pub gateway_class: Option<String>,

    /// Location of the base manifests
    pub base_manifests: Option<String>,

    /// Remove base resources after the run
    pub cleanup_base_resources: Option<bool>,

    /// Dump each HTTP exchange
    pub debug: Option<bool>,

    /// Features the implementation supports
    #[serde(default)]
    pub supported_features: Vec<String>,

    /// Features the implementation exempts itself from
    #[serde(default)]
    pub exempt_features: Vec<String>,

    /// Minimum release channel (standard or experimental)
    pub channel: Option<String>,

    /// Labels merged onto installed namespaces
    #[serde(default)]
    pub namespace_labels: BTreeMap<String, String>,

    /// Unique replacement ports for Gateway listeners
    #[serde(default)]
    pub listener_ports: Vec<u16>,

    /// Concurrency bound for parallel tests
    pub max_concurrent: Option<usize>,
}

impl FileConfig {
    /// Load configuration from a YAML or JSON file, selected by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read config file")?;

        let config: Self = if path
            .as_ref()
            .extension()
            .map(|e| e == "yaml" || e == "yml")
            .unwrap_or(false)
        {
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?
        } else {
            serde_json::from_str(&content).context("Failed to parse JSON config")?
        };

        Ok(config)
    }
}
