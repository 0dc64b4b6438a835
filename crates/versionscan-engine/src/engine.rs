//! Scan engine - evaluates every rule against one version, then reconciles
//! vendor backports.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, info, warn};
use versionscan_core::{major_minor, PatchSet, Result, Rule, RuleVerdict, ScanResult};

use crate::reconcile::Reconciliation;
use crate::vendor::VendorSignatures;

/// Phases a single run moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Loaded,
    Evaluated,
    Reconciled,
    Done,
}

impl ScanPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanPhase::Idle => "idle",
            ScanPhase::Loaded => "loaded",
            ScanPhase::Evaluated => "evaluated",
            ScanPhase::Reconciled => "reconciled",
            ScanPhase::Done => "done",
        }
    }
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn version_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+\.\d+\S*").expect("static regex"))
}

/// Strip a runtime-name token and stray separators from a version string
///
/// `"php-5.4.1"`, `"php5 5.4.1"` and `"PHP 5.4.1 (cli)"` all become `"5.4.1"`.
/// Input without a `major.minor` token is returned trimmed, so the error
/// raised for it names what was supplied.
pub fn normalize_version(raw: &str) -> String {
    let trimmed = raw.trim();
    match version_token_regex().find(trimmed) {
        Some(token) => token
            .as_str()
            .trim_end_matches(|c: char| matches!(c, '-' | '_' | '.' | '+'))
            .to_string(),
        None => trimmed.to_string(),
    }
}

/// Version vulnerability engine
///
/// Holds only detection configuration, so one engine can serve any number
/// of runs, including concurrent ones.
#[derive(Debug, Clone, Default)]
pub struct ScanEngine {
    signatures: VendorSignatures,
}

impl ScanEngine {
    /// Create an engine with the built-in vendor signatures
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signatures(signatures: VendorSignatures) -> Self {
        Self { signatures }
    }

    pub fn signatures(&self) -> &VendorSignatures {
        &self.signatures
    }

    /// Whether `version` looks like a vendor backport build
    pub fn is_vendor_build(&self, version: &str) -> bool {
        self.signatures.is_vendor_build(version)
    }

    /// Evaluate each rule independently; the first failing rule aborts
    pub fn evaluate_all(&self, rules: &[Rule], version: &str) -> Result<Vec<RuleVerdict>> {
        rules
            .iter()
            .map(|rule| {
                let verdict = rule.evaluate(version)?;
                debug!(
                    "{} against {}: vulnerable={}",
                    rule.id(),
                    verdict.fixed_in.as_deref().unwrap_or("-"),
                    verdict.vulnerable
                );
                Ok(verdict)
            })
            .collect()
    }

    /// Clear verdicts resolved by the patch chains for `version`
    ///
    /// Does nothing unless `version` is a vendor build.
    pub fn reconcile(
        &self,
        verdicts: &mut [RuleVerdict],
        patch_set: &PatchSet,
        version: &str,
    ) -> Reconciliation {
        let Some(vendor) = self.signatures.detect(version) else {
            return Reconciliation::default();
        };

        let reconciliation = Reconciliation::compute(patch_set, version);
        if !reconciliation.is_matched() {
            warn!(
                "{} looks like a {} build but no patch manifest lists it",
                version, vendor
            );
        }

        let flipped = reconciliation.apply(verdicts);
        debug!("Vendor patches cleared {} verdicts for {}", flipped, version);
        reconciliation
    }

    /// Run a full scan of `version` against `rules`
    ///
    /// Without `patches` no reconciliation happens, as for a stock build.
    pub fn run(
        &self,
        version: &str,
        rules: &[Rule],
        patches: Option<&PatchSet>,
    ) -> Result<ScanResult> {
        let version = normalize_version(version);
        debug!(phase = %ScanPhase::Idle, "Scanning {}", version);

        // Every rule uses the same target, so a bad one fails the whole run
        major_minor(&version)?;
        debug!(
            phase = %ScanPhase::Loaded,
            "Target accepted, {} rules to evaluate",
            rules.len()
        );

        let mut verdicts = self.evaluate_all(rules, &version)?;
        debug!(phase = %ScanPhase::Evaluated, "{} verdicts", verdicts.len());

        let vendor_build = patches.is_some() && self.is_vendor_build(&version);
        let resolved = match patches {
            Some(patch_set) if vendor_build => {
                let reconciliation = self.reconcile(&mut verdicts, patch_set, &version);
                debug!(
                    phase = %ScanPhase::Reconciled,
                    "{} issues resolved",
                    reconciliation.resolved.len()
                );
                reconciliation.resolved
            }
            _ => Default::default(),
        };

        let result = ScanResult {
            version,
            vendor_build,
            resolved,
            verdicts,
        };

        info!(
            "Scanned {} against {} rules: {} vulnerable",
            result.version,
            result.verdicts.len(),
            result.vulnerable_count()
        );
        debug!(phase = %ScanPhase::Done, "Scan complete");

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use versionscan_core::{ErrorKind, PatchDefinition, CUSTOM_VENDOR};

    fn rules() -> Vec<Rule> {
        vec![
            Rule::new("CVE-1234", "This is a test").with_fix_versions("base", ["5.4.17"]),
            Rule::new("CVE-1235", "This is a test").with_fix_versions("base", ["5.4.15"]),
        ]
    }

    fn patches() -> PatchSet {
        PatchSet::new().with_vendor(
            CUSTOM_VENDOR,
            vec![PatchDefinition::new("5.4.16-7.el6.1", ["CVE-1234"])],
        )
    }

    #[test]
    fn test_normalize_version() {
        assert_eq!(normalize_version("5.4.1"), "5.4.1");
        assert_eq!(normalize_version("php-5.4.1"), "5.4.1");
        assert_eq!(normalize_version("  PHP 5.4.16-7.el6.1 (cli) "), "5.4.16-7.el6.1");
        assert_eq!(normalize_version("5.4.1-"), "5.4.1");
        assert_eq!(normalize_version(" php "), "php");
    }

    #[test]
    fn test_normalize_runtime_name_with_digits() {
        assert_eq!(normalize_version("php5-5.4.45"), "5.4.45");
        assert_eq!(normalize_version("php5 5.4.45-0+deb7u2"), "5.4.45-0+deb7u2");
    }

    #[test]
    fn test_debian_package_version_scans() {
        let rules =
            vec![Rule::new("CVE-1234", "This is a test").with_fix_versions("base", ["5.4.50"])];
        let engine = ScanEngine::new();

        let result = engine.run("php5 5.4.45-0+deb7u2", &rules, None).unwrap();
        assert_eq!(result.version, "5.4.45-0+deb7u2");
        assert!(result.verdicts[0].vulnerable);

        let result = engine.run("php5-5.4.45", &rules, None).unwrap();
        assert_eq!(result.version, "5.4.45");
        assert!(result.verdicts[0].vulnerable);
    }

    #[test]
    fn test_oversized_component_is_not_vulnerable() {
        let rules =
            vec![Rule::new("CVE-1234", "This is a test").with_fix_versions("base", ["5.4.50"])];
        let result = ScanEngine::new()
            .run("5.4.99999999999999999999", &rules, None)
            .unwrap();
        assert!(!result.verdicts[0].vulnerable);
    }

    #[test]
    fn test_stock_build_is_not_reconciled() {
        let engine = ScanEngine::new();
        let result = engine.run("5.4.16", &rules(), Some(&patches())).unwrap();

        assert!(!result.vendor_build);
        assert!(result.get("CVE-1234").unwrap().vulnerable);
        assert!(!result.get("CVE-1235").unwrap().vulnerable);
        assert!(result.resolved.is_empty());
    }

    #[test]
    fn test_vendor_build_is_reconciled() {
        let engine = ScanEngine::new();
        let result = engine
            .run("5.4.16-7.el6.1", &rules(), Some(&patches()))
            .unwrap();

        assert!(result.vendor_build);
        let patched = result.get("CVE-1234").unwrap();
        assert!(!patched.vulnerable);
        assert!(patched.patched_by_vendor);
        assert!(!result.get("CVE-1235").unwrap().vulnerable);
        assert_eq!(result.vulnerable_count(), 0);
    }

    #[test]
    fn test_without_patches_vendor_build_stays_vulnerable() {
        let engine = ScanEngine::new();
        let result = engine.run("5.4.16-7.el6.1", &rules(), None).unwrap();

        assert!(!result.vendor_build);
        assert!(result.get("CVE-1234").unwrap().vulnerable);
    }

    #[test]
    fn test_falls_back_to_lowest_fix() {
        let rules =
            vec![Rule::new("CVE-1234", "This is a test").with_fix_versions("base", ["5.1.1"])];
        let result = ScanEngine::new().run("5.4.1", &rules, None).unwrap();
        assert!(!result.verdicts[0].vulnerable);
    }

    #[test]
    fn test_runs_are_independent() {
        let engine = ScanEngine::new();
        let rules = rules();
        let patches = patches();

        let first = engine.run("5.4.16-7.el6.1", &rules, Some(&patches)).unwrap();
        let stock = engine.run("5.4.16", &rules, Some(&patches)).unwrap();
        let second = engine.run("5.4.16-7.el6.1", &rules, Some(&patches)).unwrap();

        assert_eq!(first, second);
        assert!(stock.get("CVE-1234").unwrap().vulnerable);
    }

    #[test]
    fn test_bad_target_version_aborts() {
        let err = ScanEngine::new().run("unknown", &rules(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        // Even with no rules the target must parse
        let err = ScanEngine::new().run("php5", &[], None).unwrap_err();
        assert!(err.to_string().contains("php5"));
    }

    #[test]
    fn test_rule_without_fix_versions_aborts() {
        let mut rules = rules();
        rules.push(Rule::new("CVE-EMPTY", "no data"));

        let err = ScanEngine::new().run("5.4.16", &rules, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("CVE-EMPTY"));
    }

    #[test]
    fn test_verdicts_keep_rule_order() {
        let result = ScanEngine::new().run("5.4.16", &rules(), None).unwrap();
        let ids: Vec<&str> = result.verdicts.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["CVE-1234", "CVE-1235"]);
    }

    #[test]
    fn test_cross_branch_manifest_does_not_leak() {
        let rules = vec![
            Rule::new("CVE-A", "a").with_fix_versions("base", ["5.4.20"]),
            Rule::new("CVE-B", "b").with_fix_versions("base", ["5.4.20"]),
        ];
        let patches = PatchSet::new().with_vendor(
            "redhat",
            vec![
                PatchDefinition::new("5.4.16-7.el6.1", ["CVE-A"]),
                PatchDefinition::new("5.3.3-40.el6", ["CVE-B"]),
            ],
        );

        let result = ScanEngine::new()
            .run("5.4.16-7.el6.1", &rules, Some(&patches))
            .unwrap();
        assert!(!result.get("CVE-A").unwrap().vulnerable);
        assert!(result.get("CVE-B").unwrap().vulnerable);
    }

    #[test]
    fn test_custom_signatures_gate_reconciliation() {
        let engine = ScanEngine::with_signatures(VendorSignatures::empty());
        let result = engine
            .run("5.4.16-7.el6.1", &rules(), Some(&patches()))
            .unwrap();

        assert!(!result.vendor_build);
        assert!(result.get("CVE-1234").unwrap().vulnerable);
    }
}
