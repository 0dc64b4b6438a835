//! Configuration management for versionscan

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use versionscan_core::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Rule source settings
    #[serde(default)]
    pub rules: RulesConfig,

    /// Vendor patch source settings
    #[serde(default)]
    pub patches: PatchesConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Load from `path` when it exists, otherwise fall back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Merge with environment variables (VERSIONSCAN_ prefix)
    pub fn merge_env(self) -> Self {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Merge overrides from an arbitrary variable lookup
    pub fn merge_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("VERSIONSCAN_CHECKS_FILE") {
            self.rules.checks_file = Some(val);
        }
        if let Some(val) = lookup("VERSIONSCAN_PATCH_DIR") {
            self.patches.dir = Some(val);
        }
        if let Some(val) = lookup("VERSIONSCAN_PATCHES_ENABLED") {
            match val.to_lowercase().as_str() {
                "0" | "false" | "no" | "off" => self.patches.enabled = false,
                "1" | "true" | "yes" | "on" => self.patches.enabled = true,
                _ => tracing::warn!("Ignoring VERSIONSCAN_PATCHES_ENABLED={}", val),
            }
        }

        if let Some(val) = lookup("VERSIONSCAN_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Some(val) = lookup("VERSIONSCAN_LOG_FORMAT") {
            self.logging.format = val;
        }

        self
    }
}

/// Rule source configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Path to a `{"checks": [...]}` document
    pub checks_file: Option<String>,
}

/// Vendor patch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchesConfig {
    /// Load patch data at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory of `<vendor>.json` documents
    pub dir: Option<String>,

    /// Explicit vendor -> document path table
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl Default for PatchesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            files: BTreeMap::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    String::from("warn")
}

fn default_log_format() -> String {
    String::from("pretty")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Builder for constructing Config
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn checks_file(mut self, path: impl Into<String>) -> Self {
        self.config.rules.checks_file = Some(path.into());
        self
    }

    pub fn patch_dir(mut self, path: impl Into<String>) -> Self {
        self.config.patches.dir = Some(path.into());
        self
    }

    pub fn patch_file(mut self, vendor: impl Into<String>, path: impl Into<String>) -> Self {
        self.config.patches.files.insert(vendor.into(), path.into());
        self
    }

    pub fn patches_enabled(mut self, enabled: bool) -> Self {
        self.config.patches.enabled = enabled;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use versionscan_core::ErrorKind;

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [rules]
            checks_file = "/usr/share/versionscan/checks.json"

            [patches]
            dir = "/usr/share/versionscan/patches"

            [patches.files]
            custom = "/etc/versionscan/custom.json"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(
            config.rules.checks_file.as_deref(),
            Some("/usr/share/versionscan/checks.json")
        );
        assert!(config.patches.enabled);
        assert_eq!(config.patches.files["custom"], "/etc/versionscan/custom.json");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml("[rules\nchecks_file = 3").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::from_file("/nonexistent/versionscan.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/versionscan.toml"));
        assert!(Config::load_or_default("/nonexistent/versionscan.toml").is_ok());
    }

    #[test]
    fn test_merge_env_from() {
        let config = Config::default().merge_env_from(|key| match key {
            "VERSIONSCAN_CHECKS_FILE" => Some("/tmp/checks.json".to_string()),
            "VERSIONSCAN_PATCHES_ENABLED" => Some("off".to_string()),
            "VERSIONSCAN_LOG_LEVEL" => Some("trace".to_string()),
            _ => None,
        });

        assert_eq!(config.rules.checks_file.as_deref(), Some("/tmp/checks.json"));
        assert!(!config.patches.enabled);
        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_config_builder() {
        let config = Config::builder()
            .checks_file("checks.json")
            .patch_dir("patches")
            .patch_file("custom", "custom.json")
            .log_level("info")
            .build();

        assert_eq!(config.rules.checks_file.as_deref(), Some("checks.json"));
        assert_eq!(config.patches.dir.as_deref(), Some("patches"));
        assert_eq!(config.patches.files.len(), 1);
        assert_eq!(config.logging.level, "info");
    }
}
