//! Patch manifests - vendor backport builds and the issues they resolve

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Vendor key for caller-supplied patch overrides
pub const CUSTOM_VENDOR: &str = "custom";

/// A patch manifest as supplied by the loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchDefinition {
    /// Full vendor build string, e.g. "5.4.16-7.el6.1"
    pub release: String,
    /// Issue ids resolved as of this build
    #[serde(default)]
    pub patched: Vec<String>,
}

impl PatchDefinition {
    pub fn new<I, S>(release: impl Into<String>, patched: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            release: release.into(),
            patched: patched.into_iter().map(Into::into).collect(),
        }
    }
}

/// Patch definitions keyed by vendor, each list in release order
pub type PatchDefinitionsBySet = BTreeMap<String, Vec<PatchDefinition>>;

/// One vendor build and the issue ids it resolves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchManifest {
    build_tag: String,
    patched_issue_ids: BTreeSet<String>,
}

impl PatchManifest {
    pub fn build_tag(&self) -> &str {
        &self.build_tag
    }

    pub fn patched_issue_ids(&self) -> &BTreeSet<String> {
        &self.patched_issue_ids
    }
}

impl From<PatchDefinition> for PatchManifest {
    fn from(def: PatchDefinition) -> Self {
        Self {
            build_tag: def.release,
            patched_issue_ids: def.patched.into_iter().collect(),
        }
    }
}

/// Manifest chains for every vendor, in the order the source supplied them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchSet {
    vendors: BTreeMap<String, Vec<PatchManifest>>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a patch set from loader output
    pub fn from_definitions(definitions: PatchDefinitionsBySet) -> Self {
        let mut set = Self::new();
        for (vendor, defs) in definitions {
            set.add_vendor(vendor, defs);
        }
        set
    }

    /// Append manifests to a vendor's chain
    pub fn add_vendor<I>(&mut self, vendor: impl Into<String>, definitions: I)
    where
        I: IntoIterator<Item = PatchDefinition>,
    {
        self.vendors
            .entry(vendor.into())
            .or_default()
            .extend(definitions.into_iter().map(PatchManifest::from));
    }

    /// Builder form of [`PatchSet::add_vendor`]
    pub fn with_vendor<I>(mut self, vendor: impl Into<String>, definitions: I) -> Self
    where
        I: IntoIterator<Item = PatchDefinition>,
    {
        self.add_vendor(vendor, definitions);
        self
    }

    /// A single vendor's chain
    pub fn chain(&self, vendor: &str) -> Option<&[PatchManifest]> {
        self.vendors.get(vendor).map(Vec::as_slice)
    }

    /// Iterate over (vendor, chain)
    pub fn chains(&self) -> impl Iterator<Item = (&str, &[PatchManifest])> {
        self.vendors
            .iter()
            .map(|(vendor, chain)| (vendor.as_str(), chain.as_slice()))
    }

    pub fn vendor_count(&self) -> usize {
        self.vendors.len()
    }

    pub fn manifest_count(&self) -> usize {
        self.vendors.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.manifest_count() == 0
    }
}
