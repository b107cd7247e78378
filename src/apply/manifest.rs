//! Manifest document preparation
//!
//! Pure transforms applied to parsed manifest documents before they reach
//! the cluster: every Gateway is pointed at the class under test, Namespaces
//! pick up the configured labels, and Gateway listeners are reassigned
//! unique ports from the configured pool.

use std::collections::{BTreeMap, VecDeque};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};

/// Parse a multi-document YAML manifest, dropping empty documents.
pub fn parse_documents(content: &str) -> Result<Vec<Value>> {
    let mut documents = Vec::new();

    for document in serde_yaml::Deserializer::from_str(content) {
        let value = serde_yaml::Value::deserialize(document)
            .context("Failed to parse manifest document")?;
        if value.is_null() {
            continue;
        }

        let json = serde_json::to_value(&value).context("Failed to convert manifest document")?;
        documents.push(json);
    }

    Ok(documents)
}

/// Resource kind of a parsed document.
pub fn kind(document: &Value) -> Option<&str> {
    document.get("kind")?.as_str()
}

/// Rewrite one document for the implementation under test.
///
/// `ports` is the shared pool of unique listener ports; each Gateway
/// listener consumes one when the pool is in use. Running out is an error:
/// the caller promised a port per listener.
pub fn prepare_document(
    document: &mut Value,
    gateway_class_name: &str,
    namespace_labels: &BTreeMap<String, String>,
    ports: &mut VecDeque<u16>,
    ports_in_use: bool,
) -> Result<()> {
    match kind(document) {
        Some("Gateway") => {
            document["spec"]["gatewayClassName"] = json!(gateway_class_name);

            if ports_in_use {
                if let Some(listeners) = document
                    .pointer_mut("/spec/listeners")
                    .and_then(Value::as_array_mut)
                {
                    for listener in listeners {
                        match ports.pop_front() {
                            Some(port) => listener["port"] = json!(port),
                            None => bail!(
                                "ran out of unique listener ports; one is needed per listener"
                            ),
                        }
                    }
                }
            }
        }
        Some("Namespace") => {
            if !namespace_labels.is_empty() {
                let labels = &mut document["metadata"]["labels"];
                if labels.is_null() {
                    *labels = Value::Object(Default::default());
                }
                if let Some(labels) = labels.as_object_mut() {
                    for (key, value) in namespace_labels {
                        labels.insert(key.clone(), Value::String(value.clone()));
                    }
                }
            }
        }
        _ => {}
    }

    Ok(())
}
