//! Patch reconciliation - clears verdicts that a vendor backport already fixes
//!
//! Each vendor chain is walked in supplied order. Once the manifest whose build
//! tag equals the installed version is reached, it and every later manifest on
//! the same release line (`5.4.16` in `5.4.16-7.el6.1`) contribute their patched
//! issue ids. Manifests for other release lines never contribute.

use std::collections::BTreeSet;
use tracing::{debug, trace};
use versionscan_core::{release_prefix, PatchManifest, PatchSet, RuleVerdict};

/// Issue ids resolved for one installed build across all vendors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Vendors whose chain contains the installed build
    pub matched_vendors: Vec<String>,
    /// Union of resolved issue ids
    pub resolved: BTreeSet<String>,
}

impl Reconciliation {
    /// Walk every vendor chain for `version`
    pub fn compute(patch_set: &PatchSet, version: &str) -> Self {
        let prefix = release_prefix(version);
        let mut reconciliation = Self::default();

        for (vendor, chain) in patch_set.chains() {
            let Some(resolved) = walk_chain(chain, version, prefix) else {
                trace!("No {} build matches {}", vendor, version);
                continue;
            };

            debug!(
                "{} chain resolves {} issues for {}",
                vendor,
                resolved.len(),
                version
            );
            reconciliation.matched_vendors.push(vendor.to_string());
            reconciliation.resolved.extend(resolved);
        }

        reconciliation
    }

    pub fn is_matched(&self) -> bool {
        !self.matched_vendors.is_empty()
    }

    /// Flip vulnerable verdicts whose id was resolved; returns how many flipped
    pub fn apply(&self, verdicts: &mut [RuleVerdict]) -> usize {
        let mut flipped = 0;
        for verdict in verdicts.iter_mut() {
            if verdict.vulnerable && self.resolved.contains(&verdict.id) {
                verdict.mark_patched();
                flipped += 1;
            }
        }
        flipped
    }
}

/// Resolved ids for one chain, or `None` when the installed build is not in it
fn walk_chain(chain: &[PatchManifest], version: &str, prefix: &str) -> Option<BTreeSet<String>> {
    let mut matched = false;
    let mut resolved = BTreeSet::new();

    for manifest in chain {
        if manifest.build_tag() == version {
            matched = true;
        }
        if matched && release_prefix(manifest.build_tag()) == prefix {
            resolved.extend(manifest.patched_issue_ids().iter().cloned());
        }
    }

    matched.then_some(resolved)
}

/// Union of issue ids resolved for `version` across every vendor chain
pub fn resolved_issue_ids(patch_set: &PatchSet, version: &str) -> BTreeSet<String> {
    Reconciliation::compute(patch_set, version).resolved
}
