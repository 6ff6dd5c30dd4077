//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: a variable that is present but empty or malformed
//! fails instead of being ignored.

use crate::schema::{FallibleConfig, LogFormat, LogLevel};
use fallible_recovery::LintPolicy;
use std::collections::BTreeMap;

/// Env var: minimum log level.
pub const ENV_LOG_LEVEL: &str = "FALLIBLE_LOG_LEVEL";
/// Env var: log line layout.
pub const ENV_LOG_FORMAT: &str = "FALLIBLE_LOG_FORMAT";
/// Env var: dispatcher lint policy.
pub const ENV_LINT: &str = "FALLIBLE_LINT";
/// Env var: log fallback use at `warn`.
pub const ENV_LOG_FALLBACK: &str = "FALLIBLE_LOG_FALLBACK";

const ALL_VARS: [&str; 4] = [ENV_LOG_LEVEL, ENV_LOG_FORMAT, ENV_LINT, ENV_LOG_FALLBACK];

/// Parsed env overrides; `None` means the variable was not set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallibleEnv {
    /// Override for `logging.level`.
    pub log_level: Option<LogLevel>,
    /// Override for `logging.format`.
    pub log_format: Option<LogFormat>,
    /// Override for `recovery.lint`.
    pub lint: Option<LintPolicy>,
    /// Override for `recovery.logFallback`.
    pub log_fallback: Option<bool>,
}

impl FallibleEnv {
    /// Parse env overrides from a key/value map (useful for tests).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            log_level: parse_optional_enum(map, ENV_LOG_LEVEL, LogLevel::parse)?,
            log_format: parse_optional_enum(map, ENV_LOG_FORMAT, LogFormat::parse)?,
            lint: parse_optional_enum(map, ENV_LINT, |raw| raw.parse().ok())?,
            log_fallback: parse_optional_bool(map, ENV_LOG_FALLBACK)?,
        })
    }

    /// Parse env overrides from the process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let map = ALL_VARS
            .into_iter()
            .filter_map(|name| std::env::var(name).ok().map(|value| (name.to_owned(), value)))
            .collect();
        Self::from_map(&map)
    }

    /// Returns true when no override is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.log_level.is_none()
            && self.log_format.is_none()
            && self.lint.is_none()
            && self.log_fallback.is_none()
    }
}

/// Apply env overrides on top of `config`.
#[must_use]
pub fn apply_env_overrides(mut config: FallibleConfig, env: &FallibleEnv) -> FallibleConfig {
    if let Some(level) = env.log_level {
        config.logging.level = level;
    }
    if let Some(format) = env.log_format {
        config.logging.format = format;
    }
    if let Some(lint) = env.lint {
        config.recovery.lint = lint;
    }
    if let Some(enabled) = env.log_fallback {
        config.recovery.log_fallback = enabled;
    }
    config
}

/// Validation failures when parsing env variables.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    #[error("{var} is set but empty")]
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Boolean env var had an invalid value.
    #[error("{var} must be a boolean, got `{value}`")]
    InvalidBool {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Enum env var had an invalid value.
    #[error("{var} has unsupported value `{value}`")]
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    /// Env var that failed.
    #[must_use]
    pub const fn var(&self) -> &'static str {
        match self {
            Self::EmptyValue { var }
            | Self::InvalidBool { var, .. }
            | Self::InvalidEnum { var, .. } => *var,
        }
    }
}

fn non_empty<'map>(
    map: &'map BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<&'map str>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    Ok(Some(trimmed))
}

fn parse_optional_enum<T>(
    map: &BTreeMap<String, String>,
    var: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, EnvParseError> {
    let Some(trimmed) = non_empty(map, var)? else {
        return Ok(None);
    };
    parse(trimmed).map(Some).ok_or_else(|| EnvParseError::InvalidEnum {
        var,
        value: trimmed.to_owned(),
    })
}

fn parse_optional_bool(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<bool>, EnvParseError> {
    let Some(trimmed) = non_empty(map, var)? else {
        return Ok(None);
    };
    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(EnvParseError::InvalidBool {
            var,
            value: trimmed.to_owned(),
        }),
    }
}
