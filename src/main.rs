//! Gateway API Conformance Test Harness
//!
//! A CLI tool that applies Kubernetes manifests, waits for cluster
//! readiness, and runs named conformance tests against a Gateway API
//! implementation, honoring per-test feature requirements, exemptions,
//! and release channels.
//!
//! ## Usage
//!
//! ```bash
//! # Run the standard-channel suite against an implementation
//! gateway-conformance run --gateway-class acme
//!
//! # Opt into features and the experimental channel
//! gateway-conformance run --gateway-class acme \
//!     --supported-features ReferencePolicy,HTTPRouteMethodMatching \
//!     --channel experimental
//!
//! # List registered tests
//! gateway-conformance list --detailed
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use tracing::warn;

mod apply;
mod cli;
mod config;
mod http;
mod k8s;
mod output;
mod results;
mod suite;
mod tests;
mod utils;

use cli::{Args, Command, ListArgs, RunArgs};
use config::FileConfig;
use k8s::K8sClient;
use output::{OutputFormat, ReportFormatter};
use results::ReportStorage;
use suite::{Channel, ConformanceTestSuite, ExemptFeature, SuiteOptions, SupportedFeature};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Run(run_args) => run_suite(run_args).await,
        Command::List(list_args) => {
            list_tests(list_args);
            Ok(())
        }
    }
}

async fn run_suite(args: RunArgs) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    let debug = args.debug || file_config.debug.unwrap_or(false);
    utils::init_logger(debug);

    let gateway_class = args
        .gateway_class
        .or(file_config.gateway_class)
        .ok_or_else(|| anyhow!("no GatewayClass given; use --gateway-class or a config file"))?;

    let supported_names = prefer_list(args.supported_features, file_config.supported_features);
    let exempt_names = prefer_list(args.exempt_features, file_config.exempt_features);
    let channel_name = args.channel.or(file_config.channel);
    let namespace_labels = if args.namespace_label.is_empty() {
        file_config.namespace_labels
    } else {
        parse_labels(&args.namespace_label)?
    };
    let listener_ports = prefer_list(args.listener_port, file_config.listener_ports);

    let client = K8sClient::new().await?;
    if !client.gateway_api_installed().await? {
        bail!("Gateway API CRDs are not installed in this cluster");
    }

    let options = SuiteOptions {
        client,
        gateway_class_name: gateway_class,
        debug,
        round_tripper: None,
        base_manifests: args.base_manifests.or(file_config.base_manifests),
        namespace_labels,
        valid_unique_listener_ports: listener_ports,
        cleanup_base_resources: args.cleanup
            || file_config.cleanup_base_resources.unwrap_or(false),
        exempt_features: parse_exempt_features(&exempt_names)?,
        supported_features: parse_supported_features(&supported_names)?,
        min_channel: parse_channel(channel_name.as_deref())?,
        max_concurrent: args
            .max_concurrent
            .or(file_config.max_concurrent)
            .unwrap_or(4),
    };

    let mut suite = ConformanceTestSuite::new(options)?;
    suite.setup().await?;

    let suite = Arc::new(suite);
    let report = suite.clone().run(tests::all()).await;

    if let Err(e) = suite.cleanup_resources().await {
        warn!("cleanup failed: {e:#}");
    }

    let format = OutputFormat::from_str(&args.format)
        .ok_or_else(|| anyhow!("unknown output format: {}", args.format))?;
    println!("{}", ReportFormatter::new(format).format_report(&report));

    if args.save_report {
        ReportStorage::default_dir().save(&report)?;
    }
    if let Some(path) = &args.export_csv {
        ReportStorage::export_csv(&report, path)?;
    }

    if !report.all_passed() {
        bail!("{} conformance tests failed", report.failed);
    }

    Ok(())
}

fn list_tests(args: ListArgs) {
    if args.features {
        println!("Supported features:");
        for feature in SupportedFeature::all() {
            println!("  {feature}");
        }
        println!("Exempt features:");
        for feature in ExemptFeature::all() {
            println!("  {feature}");
        }
        return;
    }

    for test in tests::all() {
        if args.detailed {
            let mut tags = vec![test.min_channel.name().to_string()];
            if test.parallel {
                tags.push("parallel".to_string());
            }
            if test.slow {
                tags.push("slow".to_string());
            }
            for feature in &test.features {
                tags.push(format!("requires {feature}"));
            }
            for feature in &test.exemptions {
                tags.push(format!("exempts {feature}"));
            }

            println!("{} [{}]", test.short_name, tags.join(", "));
            println!("    {}", test.description);
        } else {
            println!("{}", test.short_name);
        }
    }
}

fn prefer_list<T>(flag: Vec<T>, file: Vec<T>) -> Vec<T> {
    if flag.is_empty() {
        file
    } else {
        flag
    }
}

fn parse_supported_features(names: &[String]) -> Result<Vec<SupportedFeature>> {
    names
        .iter()
        .map(|name| {
            SupportedFeature::from_str(name)
                .ok_or_else(|| anyhow!("unknown supported feature: {name}"))
        })
        .collect()
}

fn parse_exempt_features(names: &[String]) -> Result<Vec<ExemptFeature>> {
    names
        .iter()
        .map(|name| {
            ExemptFeature::from_str(name).ok_or_else(|| anyhow!("unknown exempt feature: {name}"))
        })
        .collect()
}

fn parse_channel(name: Option<&str>) -> Result<Option<Channel>> {
    match name {
        None => Ok(None),
        Some(name) => Channel::from_str(name)
            .map(Some)
            .ok_or_else(|| anyhow!("unknown channel: {name}")),
    }
}

fn parse_labels(entries: &[String]) -> Result<BTreeMap<String, String>> {
    entries
        .iter()
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => Err(anyhow!("invalid label (expected KEY=VALUE): {entry}")),
        })
        .collect()
}

#[cfg(test)]
mod main_tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        let labels = parse_labels(&["team=networking".to_string(), "env=ci".to_string()]).unwrap();
        assert_eq!(labels.get("team").map(String::as_str), Some("networking"));
        assert_eq!(labels.get("env").map(String::as_str), Some("ci"));

        assert!(parse_labels(&["no-equals".to_string()]).is_err());
        assert!(parse_labels(&["=value".to_string()]).is_err());
    }

    #[test]
    fn test_parse_features_rejects_unknown() {
        assert!(parse_supported_features(&["ReferencePolicy".to_string()]).is_ok());
        assert!(parse_supported_features(&["Bogus".to_string()]).is_err());
        assert!(parse_exempt_features(&["ReferencePolicy".to_string()]).is_ok());
        assert!(parse_exempt_features(&["Bogus".to_string()]).is_err());
    }

    #[test]
    fn test_parse_channel() {
        assert_eq!(parse_channel(None).unwrap(), None);
        assert_eq!(
            parse_channel(Some("experimental")).unwrap(),
            Some(Channel::Experimental)
        );
        assert!(parse_channel(Some("beta")).is_err());
    }

    #[test]
    fn test_prefer_list() {
        assert_eq!(
            prefer_list(vec!["flag".to_string()], vec!["file".to_string()]),
            vec!["flag".to_string()]
        );
        assert_eq!(
            prefer_list(Vec::<String>::new(), vec!["file".to_string()]),
            vec!["file".to_string()]
        );
    }
}
