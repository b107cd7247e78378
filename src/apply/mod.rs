//! Manifest application
//!
//! Loads multi-document YAML manifests, prepares them for the target
//! implementation, applies them to the cluster, and tracks what was applied
//! for end-of-run cleanup.

mod applier;
pub mod manifest;

pub use applier::Applier;
