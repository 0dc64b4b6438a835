//! versionscan engine - Version vulnerability determination
//!
//! This crate provides the decision logic that:
//! - Measures a version against each rule's branch-aware fix versions
//! - Detects vendor backport builds (`5.4.16-7.el6.1`, `5.5.9-1ubuntu4.14`)
//! - Reconciles vendor patch manifests to clear issues a backport already fixes

pub mod engine;
pub mod reconcile;
pub mod vendor;

pub use engine::{normalize_version, ScanEngine, ScanPhase};
pub use reconcile::{resolved_issue_ids, Reconciliation};
pub use vendor::{common_signatures, VendorSignature, VendorSignatures};

use versionscan_core::{PatchDefinitionsBySet, PatchSet, Result, Rule, RuleDefinition, ScanResult};

/// Scan `version` against loader output with the default engine
///
/// Passing `None` for `patches` skips reconciliation entirely.
pub fn scan(
    version: &str,
    rules: &[RuleDefinition],
    patches: Option<&PatchDefinitionsBySet>,
) -> Result<ScanResult> {
    let rules: Vec<Rule> = rules.iter().cloned().map(Rule::from).collect();
    let patch_set = patches.cloned().map(PatchSet::from_definitions);

    ScanEngine::new().run(version, &rules, patch_set.as_ref())
}
