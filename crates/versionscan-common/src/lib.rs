//! versionscan common - Shared utilities: logging and configuration
//!
//! This crate provides common functionality used by the versionscan binary.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigBuilder, LoggingConfig, PatchesConfig, RulesConfig};
pub use logging::{init_logging_with_config, LogConfig, LogFormat};
