//! Output formatting module
//!
//! Provides various output formats for conformance reports.

mod formatter;

pub use formatter::{OutputFormat, ReportFormatter};
