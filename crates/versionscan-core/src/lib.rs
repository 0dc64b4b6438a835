//! versionscan core - Foundation types and error handling
//!
//! This crate provides the core abstractions used throughout versionscan:
//! - `version`: comparison of `major.minor.patch[-buildtag]` strings
//! - `Rule`: one known issue with its per-branch fix versions
//! - `PatchManifest` / `PatchSet`: vendor backport builds and the issues they resolve
//! - `RuleVerdict` / `ScanResult`: what a scan reports

pub mod error;
pub mod patch;
pub mod rule;
pub mod verdict;
pub mod version;

// Re-export commonly used types at crate root
pub use error::{Error, ErrorKind, Result};
pub use patch::{PatchDefinition, PatchDefinitionsBySet, PatchManifest, PatchSet, CUSTOM_VENDOR};
pub use rule::{FixVersions, Rule, RuleDefinition, DEFAULT_BRANCH};
pub use verdict::{RuleVerdict, ScanResult};
pub use version::{build_tag, compare_versions, major_minor, release_prefix, sort_versions};
