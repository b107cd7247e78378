//! Report storage
//!
//! Writes conformance reports as timestamped JSON files under a data
//! directory, with CSV export for spreadsheets.

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info};

use crate::suite::SuiteReport;

/// Generate unique run ID
fn generate_run_id() -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let random: u32 = rand::random::<u32>() % 10000;
    format!("{timestamp}_{random:04}")
}

/// Report storage manager
pub struct ReportStorage {
    /// Base directory for reports
    base_dir: PathBuf,
}

impl ReportStorage {
    /// Create a new report storage
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Create with default directory
    pub fn default_dir() -> Self {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gateway-conformance")
            .join("reports");
        Self::new(base_dir)
    }

    fn class_dir(&self, gateway_class: &str) -> PathBuf {
        self.base_dir.join(gateway_class.to_lowercase())
    }

    /// Save a report, returning the path written.
    pub fn save(&self, report: &SuiteReport) -> Result<PathBuf> {
        let class_dir = self.class_dir(&report.gateway_class);
        fs::create_dir_all(&class_dir).context("Failed to create report directory")?;

        let path = class_dir.join(format!("{}.json", generate_run_id()));
        let file = File::create(&path).context("Failed to create report file")?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, report).context("Failed to write report")?;

        info!("Saved conformance report to {}", path.display());
        Ok(path)
    }

    /// Load a report from a path.
    pub fn load(path: impl AsRef<Path>) -> Result<SuiteReport> {
        let file = File::open(path.as_ref()).context("Failed to open report file")?;
        let reader = BufReader::new(file);

        let report: SuiteReport =
            serde_json::from_reader(reader).context("Failed to parse report")?;

        debug!("Loaded conformance report from {}", path.as_ref().display());
        Ok(report)
    }

    /// Export a report's per-test rows as CSV.
    pub fn export_csv(report: &SuiteReport, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())
            .context("Failed to create CSV file")?;

        writer
            .write_record(["test_name", "status", "duration_ms", "message"])
            .context("Failed to write CSV header")?;

        for result in &report.results {
            let status = result.status.to_string();
            let duration = result.duration_ms.to_string();
            writer
                .write_record([
                    result.name.as_str(),
                    status.as_str(),
                    duration.as_str(),
                    result.message.as_deref().unwrap_or(""),
                ])
                .context("Failed to write CSV row")?;
        }

        writer.flush().context("Failed to flush CSV file")?;
        info!("Exported CSV to {}", path.as_ref().display());
        Ok(())
    }
}
