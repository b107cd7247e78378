//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Kubernetes Gateway API Conformance Test Harness
#[derive(Parser, Debug)]
#[command(name = "gateway-conformance")]
#[command(version = "0.1.0")]
#[command(about = "Run Gateway API conformance tests against an implementation")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the conformance suite
    Run(RunArgs),

    /// List registered tests and the feature vocabulary
    List(ListArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// GatewayClass under test
    #[arg(short, long)]
    pub gateway_class: Option<String>,

    /// Configuration file (YAML or JSON); flags override its values
    #[arg(short, long)]
    pub config: Option<String>,

    /// Location of the base manifests
    #[arg(long)]
    pub base_manifests: Option<String>,

    /// Remove base resources after the run
    #[arg(long)]
    pub cleanup: bool,

    /// Dump each HTTP exchange
    #[arg(short, long)]
    pub debug: bool,

    /// Features the implementation supports (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub supported_features: Vec<String>,

    /// Features the implementation exempts itself from (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exempt_features: Vec<String>,

    /// Minimum release channel (standard, experimental)
    #[arg(long)]
    pub channel: Option<String>,

    /// Label merged onto installed namespaces (repeatable)
    #[arg(long, value_name = "KEY=VALUE")]
    pub namespace_label: Vec<String>,

    /// Unique replacement port for a Gateway listener (repeatable)
    #[arg(long, value_name = "PORT")]
    pub listener_port: Vec<u16>,

    /// Number of concurrent tests for tests marked parallel (default 4)
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Save the report under the data directory
    #[arg(long)]
    pub save_report: bool,

    /// Export the per-test results as CSV to this path
    #[arg(long)]
    pub export_csv: Option<String>,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show descriptions, channels, and requirements
    #[arg(short, long)]
    pub detailed: bool,

    /// Show the feature vocabulary instead of tests
    #[arg(short, long)]
    pub features: bool,
}
