//! Output formatters for conformance reports
//!
//! Provides table, JSON, CSV, and summary output formats.

use crate::suite::{SuiteReport, TestReport, TestStatus};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Report formatter
pub struct ReportFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format a whole report.
    pub fn format_report(&self, report: &SuiteReport) -> String {
        match self.format {
            OutputFormat::Table => self.format_table(report),
            OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Csv => self.format_csv(report),
            OutputFormat::Summary => self.format_brief(report),
        }
    }

    fn format_result_line(&self, result: &TestReport) -> String {
        let status_str = if self.colorize {
            match result.status {
                TestStatus::Passed => "\x1b[32m✓ PASS\x1b[0m",
                TestStatus::Failed => "\x1b[31m✗ FAIL\x1b[0m",
                TestStatus::Skipped => "\x1b[33m○ SKIP\x1b[0m",
            }
        } else {
            match result.status {
                TestStatus::Passed => "✓ PASS",
                TestStatus::Failed => "✗ FAIL",
                TestStatus::Skipped => "○ SKIP",
            }
        };

        let mut line = format!(
            "{:40} {} [{:>6}ms]",
            result.name, status_str, result.duration_ms
        );
        if let Some(msg) = &result.message {
            line.push_str(&format!(" - {msg}"));
        }
        line
    }

    fn format_table(&self, report: &SuiteReport) -> String {
        let mut output = String::new();

        output.push_str("\n════════════════════════════════════════════════════════════════\n");
        output.push_str(&format!(
            " Conformance: {} ({})\n",
            report.gateway_class,
            report.controller_name.as_deref().unwrap_or("unknown controller")
        ));
        output.push_str("────────────────────────────────────────────────────────────────\n");

        for result in &report.results {
            output.push_str(&format!(" {}\n", self.format_result_line(result)));
        }

        output.push_str("────────────────────────────────────────────────────────────────\n");

        let pass_str = if self.colorize {
            format!("\x1b[32m{}\x1b[0m", report.passed)
        } else {
            report.passed.to_string()
        };
        let fail_str = if self.colorize && report.failed > 0 {
            format!("\x1b[31m{}\x1b[0m", report.failed)
        } else {
            report.failed.to_string()
        };

        output.push_str(&format!(
            " Total: {} | Pass: {} | Fail: {} | Skip: {}\n",
            report.total, pass_str, fail_str, report.skipped
        ));
        output.push_str(&format!(
            " Pass Rate: {:.1}% | Duration: {}ms\n",
            report.pass_rate(),
            report.total_duration_ms
        ));
        output.push_str("════════════════════════════════════════════════════════════════\n");

        output
    }

    fn format_csv(&self, report: &SuiteReport) -> String {
        let mut output = String::new();
        output.push_str("test_name,status,duration_ms,message\n");
        for result in &report.results {
            output.push_str(&format!(
                "{},{},{},\"{}\"\n",
                result.name,
                result.status,
                result.duration_ms,
                result
                    .message
                    .as_deref()
                    .unwrap_or("")
                    .replace('"', "\"\"")
            ));
        }
        output
    }

    fn format_brief(&self, report: &SuiteReport) -> String {
        format!(
            "{}: {}/{} passed, {} skipped ({:.1}%) in {}ms",
            report.gateway_class,
            report.passed,
            report.total - report.skipped,
            report.skipped,
            report.pass_rate(),
            report.total_duration_ms
        )
    }
}
