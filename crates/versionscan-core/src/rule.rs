//! Rules - one known issue and the versions that fixed it on each branch

use crate::error::{Error, Result};
use crate::verdict::RuleVerdict;
use crate::version::{compare_versions, major_minor, sort_versions};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Branch name used when a definition lists its fix versions without branches
pub const DEFAULT_BRANCH: &str = "base";

/// Fix versions as they appear in a rule document
///
/// Either a branch -> versions table (`{"5.4": ["5.4.27"], "5.5": ["5.5.11"]}`)
/// or a bare list (`["5.4.27"]`), which lands on [`DEFAULT_BRANCH`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixVersions {
    Branches(BTreeMap<String, Vec<String>>),
    List(Vec<String>),
}

impl Default for FixVersions {
    fn default() -> Self {
        FixVersions::Branches(BTreeMap::new())
    }
}

impl FixVersions {
    fn into_branches(self) -> BTreeMap<String, Vec<String>> {
        match self {
            FixVersions::Branches(branches) => branches,
            FixVersions::List(versions) => {
                let mut branches = BTreeMap::new();
                branches.insert(DEFAULT_BRANCH.to_string(), versions);
                branches
            }
        }
    }
}

/// A rule as supplied by the loader
///
/// The id may be given as `id` or `cveid`; when a record carries both, `id`
/// wins. Unknown fields (e.g. `threat`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRuleDefinition")]
pub struct RuleDefinition {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, rename = "fixVersions")]
    pub fix_versions: FixVersions,
}

#[derive(Deserialize)]
struct RawRuleDefinition {
    id: Option<String>,
    cveid: Option<String>,
    #[serde(default)]
    summary: String,
    #[serde(default, rename = "fixVersions", alias = "fix_versions")]
    fix_versions: FixVersions,
}

impl TryFrom<RawRuleDefinition> for RuleDefinition {
    type Error = String;

    fn try_from(raw: RawRuleDefinition) -> std::result::Result<Self, Self::Error> {
        let id = raw
            .id
            .or(raw.cveid)
            .ok_or_else(|| String::from("missing field `id` (or `cveid`)"))?;
        Ok(Self {
            id,
            summary: raw.summary,
            fix_versions: raw.fix_versions,
        })
    }
}

/// A known issue with its per-branch fix versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    id: String,
    summary: String,
    fix_versions: BTreeMap<String, Vec<String>>,
}

impl Rule {
    pub fn new(id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            fix_versions: BTreeMap::new(),
        }
    }

    /// Add fix versions for a branch
    pub fn with_fix_versions<I, S>(mut self, branch: impl Into<String>, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fix_versions
            .entry(branch.into())
            .or_default()
            .extend(versions.into_iter().map(Into::into));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn fix_versions(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fix_versions
    }

    /// All fix versions across every branch, lowest first
    pub fn sorted_fix_versions(&self) -> Vec<String> {
        let mut versions: Vec<String> = self.fix_versions.values().flatten().cloned().collect();
        sort_versions(&mut versions);
        versions
    }

    /// The fix version `version` is measured against
    ///
    /// The lowest fix version containing the target's `major.minor` wins.
    /// This is substring containment, so "5.1" also matches "5.10.2".
    /// Without any such entry the lowest fix version overall is used.
    pub fn reference_fix(&self, version: &str) -> Result<String> {
        let versions = self.sorted_fix_versions();
        if versions.is_empty() {
            return Err(Error::MissingFixVersions {
                rule_id: self.id.clone(),
            });
        }

        let branch = major_minor(version)?;

        let reference = versions
            .iter()
            .find(|fix| fix.contains(branch))
            .unwrap_or(&versions[0]);

        Ok(reference.clone())
    }

    /// Vulnerable when `version` is strictly older than the reference fix
    pub fn is_vulnerable(&self, version: &str) -> Result<bool> {
        let reference = self.reference_fix(version)?;
        Ok(compare_versions(version, &reference) == Ordering::Less)
    }

    /// Evaluate this rule into a fresh verdict
    pub fn evaluate(&self, version: &str) -> Result<RuleVerdict> {
        let reference = self.reference_fix(version)?;
        let vulnerable = compare_versions(version, &reference) == Ordering::Less;

        Ok(RuleVerdict::new(&self.id, &self.summary, vulnerable).with_fixed_in(reference))
    }
}

impl From<RuleDefinition> for Rule {
    fn from(def: RuleDefinition) -> Self {
        Self {
            id: def.id,
            summary: def.summary,
            fix_versions: def.fix_versions.into_branches(),
        }
    }
}
