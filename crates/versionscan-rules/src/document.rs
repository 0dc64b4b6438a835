//! JSON rule and patch documents

use serde::{Deserialize, Serialize};
use versionscan_core::{Error, PatchDefinition, Result, RuleDefinition};

/// A rule document: `{"checks": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDocument {
    pub checks: Vec<RuleDefinition>,
}

/// A vendor patch document: `{"patches": [...]}`, newest release line first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchDocument {
    pub patches: Vec<PatchDefinition>,
}

/// Parse a rule document; `source` names it in errors
pub fn parse_rules(source: &str, content: &str) -> Result<Vec<RuleDefinition>> {
    let document: RuleDocument =
        serde_json::from_str(content).map_err(|e| Error::InvalidRuleSource {
            path: source.to_string(),
            message: e.to_string(),
        })?;
    Ok(document.checks)
}

/// Parse one vendor's patch document
pub fn parse_patches(vendor: &str, source: &str, content: &str) -> Result<Vec<PatchDefinition>> {
    let document: PatchDocument =
        serde_json::from_str(content).map_err(|e| Error::InvalidPatchSource {
            vendor: vendor.to_string(),
            path: source.to_string(),
            message: e.to_string(),
        })?;
    Ok(document.patches)
}
