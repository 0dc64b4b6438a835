//! versionscan - audit an installed runtime version against known CVEs

mod output;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::process::ExitCode;
use tracing::{debug, info};
use versionscan_common::{init_logging_with_config, Config, LogConfig, LogFormat};
use versionscan_core::{Error, PatchDefinitionsBySet, PatchSet, Rule, ScanResult};
use versionscan_engine::ScanEngine;
use versionscan_rules::{load_patch_dir, load_patch_files, load_rules};

use crate::output::{exit_code, render, OutputFormat, EXIT_ERROR};

/// Runtime version vulnerability scanner
#[derive(Parser, Debug)]
#[command(name = "versionscan")]
#[command(version)]
#[command(about = "Check a runtime version against known CVEs", long_about = None)]
struct Args {
    /// Version to audit, e.g. "5.4.16" or "5.4.16-7.el6.1"
    #[arg(value_name = "VERSION")]
    target: String,

    /// Rule document ({"checks": [...]})
    #[arg(long, value_name = "FILE")]
    checks: Option<String>,

    /// Directory of <vendor>.json patch documents
    #[arg(long, value_name = "DIR")]
    patch_dir: Option<String>,

    /// Extra patch document for one vendor (repeatable)
    #[arg(long = "patch", value_name = "VENDOR=FILE", value_parser = parse_patch_arg)]
    patches: Vec<(String, String)>,

    /// Skip vendor patch reconciliation
    #[arg(long)]
    no_patches: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "/etc/versionscan/versionscan.toml")]
    config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Only list vulnerable rules
    #[arg(long)]
    only_vulnerable: bool,

    /// Log level (trace, debug, info, warn, error); overrides config
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json, compact); overrides config
    #[arg(long)]
    log_format: Option<String>,
}

fn parse_patch_arg(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((vendor, path)) if !vendor.is_empty() && !path.is_empty() => {
            Ok((vendor.to_string(), path.to_string()))
        }
        _ => Err(format!("expected VENDOR=FILE, got '{}'", raw)),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{}", failure_message(&e));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(args: &Args) -> Result<u8> {
    let config = Config::load_or_default(&args.config)?.merge_env();

    // Initialize logging
    let mut log_config = LogConfig::from(&config.logging);
    if let Some(level) = &args.log_level {
        log_config = log_config.level(level);
    }
    if let Some(format) = &args.log_format {
        log_config = log_config.format(LogFormat::from_name(format));
    }
    init_logging_with_config(log_config);

    debug!("versionscan {}", env!("CARGO_PKG_VERSION"));

    let (result, code) = scan(args, &config)?;
    print!("{}", render(&result, args.format, args.only_vulnerable)?);
    Ok(code)
}

/// Load rules and patches, run the engine and pick the exit code
fn scan(args: &Args, config: &Config) -> Result<(ScanResult, u8)> {
    let checks = match args.checks.as_ref().or(config.rules.checks_file.as_ref()) {
        Some(path) => path.clone(),
        None => bail!("No rule source: pass --checks or set rules.checks_file"),
    };
    let rules: Vec<Rule> = load_rules(&checks)?.into_iter().map(Rule::from).collect();

    let patch_set = if args.no_patches || !config.patches.enabled {
        info!("Vendor patch reconciliation disabled");
        None
    } else {
        load_patch_sources(args, config)?.map(PatchSet::from_definitions)
    };

    let engine = ScanEngine::new();
    let result = engine
        .run(&args.target, &rules, patch_set.as_ref())
        .with_context(|| format!("Scan of {} failed", args.target))?;

    let code = exit_code(&result);
    Ok((result, code))
}

/// Gather patch definitions from the directory and explicit files, if any
///
/// Explicit files extend the directory's chain for the same vendor; `--patch`
/// replaces a `[patches.files]` entry for that vendor.
fn load_patch_sources(args: &Args, config: &Config) -> Result<Option<PatchDefinitionsBySet>> {
    let dir = args.patch_dir.as_ref().or(config.patches.dir.as_ref());

    let mut files: BTreeMap<String, String> = config.patches.files.clone();
    files.extend(args.patches.iter().cloned());

    if dir.is_none() && files.is_empty() {
        debug!("No patch sources configured");
        return Ok(None);
    }

    let mut definitions = match dir {
        Some(dir) => load_patch_dir(dir)?,
        None => PatchDefinitionsBySet::new(),
    };
    for (vendor, patches) in load_patch_files(&files)? {
        definitions.entry(vendor).or_default().extend(patches);
    }

    Ok(Some(definitions))
}

/// One-line report for a failed run, tagged with the error code when known
fn failure_message(err: &anyhow::Error) -> String {
    let Some(cause) = err.chain().find_map(|e| e.downcast_ref::<Error>()) else {
        return format!("Error: {:#}", err);
    };

    let mut message = format!("Error [{}]: {:#}", cause.code(), err);
    if !cause.is_fatal() {
        message.push_str("\nFix or remove the rule in the check file and rerun");
    }
    message
}
