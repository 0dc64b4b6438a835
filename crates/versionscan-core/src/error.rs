//! Error types for versionscan

use thiserror::Error;

/// Result type alias using versionscan Error
pub type Result<T> = std::result::Result<T, Error>;

/// Broad failure classes a caller has to tell apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A definition source is missing or unreadable
    Load,
    /// A source or version string is present but cannot be parsed
    Format,
    /// Rule data or tool configuration is unusable
    Config,
}

/// versionscan error types
#[derive(Error, Debug)]
pub enum Error {
    // === Load Errors ===
    #[error("Could not load check file {path}: {reason}")]
    RuleSourceUnavailable { path: String, reason: String },

    #[error("Could not load patch file {path} ({vendor}): {reason}")]
    PatchSourceUnavailable {
        vendor: String,
        path: String,
        reason: String,
    },

    // === Format Errors ===
    #[error("Invalid check configuration in {path}: {message}")]
    InvalidRuleSource { path: String, message: String },

    #[error("Invalid patch configuration in {path} ({vendor}): {message}")]
    InvalidPatchSource {
        vendor: String,
        path: String,
        message: String,
    },

    #[error("Invalid version '{version}': {message}")]
    InvalidVersion { version: String, message: String },

    // === Configuration Errors ===
    #[error("Rule {rule_id} has no fix versions")]
    MissingFixVersions { rule_id: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Shorthand for a version that has no usable `major.minor` prefix
    pub fn invalid_version(version: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidVersion {
            version: version.into(),
            message: message.into(),
        }
    }

    /// Classify this error into the load/format/config taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::RuleSourceUnavailable { .. } | Error::PatchSourceUnavailable { .. } => {
                ErrorKind::Load
            }
            Error::InvalidRuleSource { .. }
            | Error::InvalidPatchSource { .. }
            | Error::InvalidVersion { .. } => ErrorKind::Format,
            Error::MissingFixVersions { .. } | Error::Configuration(_) => ErrorKind::Config,
        }
    }

    /// Check if this error concerns the whole run rather than a single rule
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::MissingFixVersions { .. })
    }

    /// Get an error code for logging
    pub fn code(&self) -> &'static str {
        match self {
            Error::RuleSourceUnavailable { .. } => "RULES_UNAVAILABLE",
            Error::PatchSourceUnavailable { .. } => "PATCHES_UNAVAILABLE",
            Error::InvalidRuleSource { .. } => "INVALID_RULES",
            Error::InvalidPatchSource { .. } => "INVALID_PATCHES",
            Error::InvalidVersion { .. } => "INVALID_VERSION",
            Error::MissingFixVersions { .. } => "MISSING_FIX_VERSIONS",
            Error::Configuration(_) => "CONFIG_ERROR",
        }
    }
}
