//! Configuration schema types and parsing.

use crate::error::ConfigError;
use fallible_recovery::LintPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level configuration for a fallible host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct FallibleConfig {
    /// Log output settings.
    pub logging: LoggingConfig,
    /// Recovery dispatcher settings.
    pub recovery: RecoveryConfig,
}

/// Log output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Minimum level emitted.
    pub level: LogLevel,
    /// Line layout.
    pub format: LogFormat,
}

/// Recovery dispatcher settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct RecoveryConfig {
    /// What dispatcher builders do with unreachable-pattern lints.
    pub lint: LintPolicy,
    /// Log fallback use at `warn` instead of `debug`.
    pub log_fallback: bool,
}

/// Minimum log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and errors.
    #[default]
    Warn,
    /// Informational events.
    Info,
    /// Dispatch decisions and scope exits.
    Debug,
    /// Every deferred action.
    Trace,
}

impl LogLevel {
    /// Canonical config string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Parse from user or env input.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Canonical config string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }

    /// Parse from user or env input.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Parse a config from JSON text.
pub fn parse_config_json(input: &str) -> Result<FallibleConfig, ConfigError> {
    serde_json::from_str(input).map_err(|error| ConfigError::InvalidJson {
        message: error.to_string(),
    })
}

/// Parse a config from TOML text.
pub fn parse_config_toml(input: &str) -> Result<FallibleConfig, ConfigError> {
    toml::from_str(input).map_err(|error| ConfigError::InvalidToml {
        message: error.to_string(),
    })
}
