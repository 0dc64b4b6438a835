//! versionscan rules - Loads rule and patch definitions
//!
//! This crate provides:
//! - JSON document shapes for rules (`{"checks": [...]}`) and vendor patches (`{"patches": [...]}`)
//! - File and directory loaders that turn them into definitions for the engine
//!
//! A missing or unreadable source is a load error; a source that does not parse
//! is a format error. Either way nothing partial is returned.

pub mod document;
pub mod loader;

pub use document::{parse_patches, parse_rules, PatchDocument, RuleDocument};
pub use loader::{load_patch_dir, load_patch_files, load_patches, load_rules};
