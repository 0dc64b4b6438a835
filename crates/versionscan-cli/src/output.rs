//! Report rendering

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Write;
use versionscan_core::{RuleVerdict, ScanResult};

/// Exit code when no rule is vulnerable
pub const EXIT_CLEAN: u8 = 0;
/// Exit code when at least one rule is vulnerable
pub const EXIT_VULNERABLE: u8 = 1;
/// Exit code for load, format and configuration failures
pub const EXIT_ERROR: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// JSON report envelope
#[derive(Debug, Serialize)]
struct Report<'a> {
    scanned_at: DateTime<Utc>,
    version: &'a str,
    vendor_build: bool,
    vulnerable_count: usize,
    resolved: Vec<&'a str>,
    verdicts: Vec<&'a RuleVerdict>,
}

pub fn exit_code(result: &ScanResult) -> u8 {
    if result.is_vulnerable() {
        EXIT_VULNERABLE
    } else {
        EXIT_CLEAN
    }
}

fn selected(result: &ScanResult, only_vulnerable: bool) -> Vec<&RuleVerdict> {
    result
        .verdicts
        .iter()
        .filter(|v| !only_vulnerable || v.vulnerable)
        .collect()
}

pub fn render(
    result: &ScanResult,
    format: OutputFormat,
    only_vulnerable: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(result, only_vulnerable)),
        OutputFormat::Json => render_json(result, only_vulnerable, Utc::now()),
    }
}

pub fn render_text(result: &ScanResult, only_vulnerable: bool) -> String {
    let mut out = String::new();
    let build = if result.vendor_build { " (vendor build)" } else { "" };
    let _ = writeln!(out, "Executing against version: {}{}", result.version, build);
    let _ = writeln!(out);

    for verdict in selected(result, only_vulnerable) {
        let status = if verdict.vulnerable {
            "[VULNERABLE]"
        } else if verdict.patched_by_vendor {
            "[patched]"
        } else {
            "[ok]"
        };
        let _ = write!(out, "{:<13}{}", status, verdict.id);
        if let Some(fixed_in) = &verdict.fixed_in {
            let _ = write!(out, " (fixed in {})", fixed_in);
        }
        if !verdict.summary.is_empty() {
            let _ = write!(out, ": {}", verdict.summary);
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Scan complete: {} of {} rules vulnerable",
        result.vulnerable_count(),
        result.verdicts.len()
    );
    out
}

pub fn render_json(
    result: &ScanResult,
    only_vulnerable: bool,
    scanned_at: DateTime<Utc>,
) -> anyhow::Result<String> {
    let report = Report {
        scanned_at,
        version: &result.version,
        vendor_build: result.vendor_build,
        vulnerable_count: result.vulnerable_count(),
        resolved: result.resolved.iter().map(String::as_str).collect(),
        verdicts: selected(result, only_vulnerable),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
