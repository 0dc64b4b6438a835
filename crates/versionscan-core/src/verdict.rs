//! Verdicts - the outcome of evaluating rules against one version

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Final verdict for one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleVerdict {
    pub id: String,
    pub summary: String,
    pub vulnerable: bool,

    /// Fix version the target was measured against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_in: Option<String>,

    /// Set when a vendor backport cleared an otherwise vulnerable verdict
    #[serde(default)]
    pub patched_by_vendor: bool,
}

impl RuleVerdict {
    pub fn new(id: impl Into<String>, summary: impl Into<String>, vulnerable: bool) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            vulnerable,
            fixed_in: None,
            patched_by_vendor: false,
        }
    }

    pub fn with_fixed_in(mut self, version: impl Into<String>) -> Self {
        self.fixed_in = Some(version.into());
        self
    }

    /// Clear the vulnerable flag because a vendor build resolves this issue
    pub fn mark_patched(&mut self) {
        if self.vulnerable {
            self.vulnerable = false;
            self.patched_by_vendor = true;
        }
    }
}

/// Outcome of a whole scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Normalized target version
    pub version: String,
    /// Whether the version looked like a vendor backport build
    pub vendor_build: bool,
    /// Issue ids the vendor patch chains resolve for this build
    #[serde(default)]
    pub resolved: BTreeSet<String>,
    /// One verdict per rule, in rule order
    pub verdicts: Vec<RuleVerdict>,
}

impl ScanResult {
    /// Verdicts still vulnerable after reconciliation
    pub fn vulnerable(&self) -> impl Iterator<Item = &RuleVerdict> {
        self.verdicts.iter().filter(|v| v.vulnerable)
    }

    pub fn vulnerable_count(&self) -> usize {
        self.vulnerable().count()
    }

    pub fn is_vulnerable(&self) -> bool {
        self.verdicts.iter().any(|v| v.vulnerable)
    }

    pub fn get(&self, id: &str) -> Option<&RuleVerdict> {
        self.verdicts.iter().find(|v| v.id == id)
    }
}
