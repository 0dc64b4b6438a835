//! Definition loader - reads rule and patch documents from disk

use crate::document::{parse_patches, parse_rules};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use versionscan_core::{Error, PatchDefinition, PatchDefinitionsBySet, Result, RuleDefinition};

/// Load every rule from a `{"checks": [...]}` file
pub fn load_rules(path: impl AsRef<Path>) -> Result<Vec<RuleDefinition>> {
    let path = path.as_ref();
    let source = path.display().to_string();

    let content = std::fs::read_to_string(path).map_err(|e| Error::RuleSourceUnavailable {
        path: source.clone(),
        reason: e.to_string(),
    })?;

    let rules = parse_rules(&source, &content)?;
    info!("Loaded {} rules from {}", rules.len(), source);
    Ok(rules)
}

/// Load one vendor's patch chain
pub fn load_patches(vendor: &str, path: impl AsRef<Path>) -> Result<Vec<PatchDefinition>> {
    let path = path.as_ref();
    let source = path.display().to_string();

    let content = std::fs::read_to_string(path).map_err(|e| Error::PatchSourceUnavailable {
        vendor: vendor.to_string(),
        path: source.clone(),
        reason: e.to_string(),
    })?;

    let patches = parse_patches(vendor, &source, &content)?;
    debug!("Loaded {} {} patches from {}", patches.len(), vendor, source);
    Ok(patches)
}

/// Load an explicit vendor -> file table; the first failure aborts
pub fn load_patch_files<P>(files: &BTreeMap<String, P>) -> Result<PatchDefinitionsBySet>
where
    P: AsRef<Path>,
{
    let mut set = PatchDefinitionsBySet::new();
    for (vendor, path) in files {
        let patches = load_patches(vendor, path)?;
        set.entry(vendor.clone()).or_default().extend(patches);
    }
    Ok(set)
}

/// Load every `<vendor>.json` in a directory
pub fn load_patch_dir(dir: impl AsRef<Path>) -> Result<PatchDefinitionsBySet> {
    let dir = dir.as_ref();
    let unavailable = |reason: String| Error::PatchSourceUnavailable {
        vendor: String::from("*"),
        path: dir.display().to_string(),
        reason,
    };

    let entries = std::fs::read_dir(dir).map_err(|e| unavailable(e.to_string()))?;

    let mut files = BTreeMap::new();
    for entry in entries {
        let path: PathBuf = entry.map_err(|e| unavailable(e.to_string()))?.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "json") {
            continue;
        }
        if let Some(vendor) = path.file_stem().and_then(|s| s.to_str()) {
            files.insert(vendor.to_string(), path.clone());
        }
    }

    info!("Found {} patch sets in {}", files.len(), dir.display());
    load_patch_files(&files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use versionscan_core::ErrorKind;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_rules() {
        let tmp_dir = TempDir::new().unwrap();
        let path = write(
            tmp_dir.path(),
            "checks.json",
            r#"{"checks": [{"cveid": "CVE-1234", "summary": "test", "fixVersions": {"base": ["5.4.33"]}}]}"#,
        );

        let rules = load_rules(&path).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, "CVE-1234");
    }

    #[test]
    fn test_missing_rule_file_names_source() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("invalid_file");

        let err = load_rules(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert!(err
            .to_string()
            .starts_with(&format!("Could not load check file {}", path.display())));
    }

    #[test]
    fn test_invalid_rule_file() {
        let tmp_dir = TempDir::new().unwrap();
        let path = write(tmp_dir.path(), "checks-invalid.json", "not json at all");

        let err = load_rules(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.to_string().starts_with("Invalid check configuration"));
    }

    #[test]
    fn test_missing_patch_file() {
        let tmp_dir = TempDir::new().unwrap();
        let mut files = BTreeMap::new();
        files.insert("invalid_os".to_string(), tmp_dir.path().join("invalid_file"));

        let err = load_patch_files(&files).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert!(err.to_string().contains("invalid_os"));
        assert!(err.to_string().starts_with("Could not load patch file"));
    }

    #[test]
    fn test_invalid_patch_file() {
        let tmp_dir = TempDir::new().unwrap();
        let path = write(tmp_dir.path(), "patches-invalid.json", "{\"patches\": 5}");
        let mut files = BTreeMap::new();
        files.insert("invalid_os".to_string(), path);

        let err = load_patch_files(&files).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.to_string().starts_with("Invalid patch configuration"));
    }

    #[test]
    fn test_load_patch_dir() {
        let tmp_dir = TempDir::new().unwrap();
        write(
            tmp_dir.path(),
            "ubuntu.json",
            r#"{"patches": [{"release": "5.5.9-1ubuntu4.14", "patched": ["CVE-2015-4024"]}]}"#,
        );
        write(
            tmp_dir.path(),
            "redhat.json",
            r#"{"patches": [{"release": "5.4.16-7.el6.1", "patched": ["CVE-1234"]}]}"#,
        );
        write(tmp_dir.path(), "README.md", "not a patch set");

        let set = load_patch_dir(tmp_dir.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set["redhat"][0].release, "5.4.16-7.el6.1");
        assert_eq!(set["ubuntu"][0].patched, vec!["CVE-2015-4024"]);
    }

    #[test]
    fn test_missing_patch_dir() {
        let err = load_patch_dir("/nonexistent/versionscan/patches").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert!(err.to_string().contains("/nonexistent/versionscan/patches"));
    }
}
