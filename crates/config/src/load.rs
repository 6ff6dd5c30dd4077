//! Config loading helpers (env + file).
//!
//! Precedence (highest wins):
//! - env overrides (`FallibleEnv`)
//! - config file (`.json` or `.toml`)
//! - defaults (`FallibleConfig::default()`)

use crate::env::{FallibleEnv, apply_env_overrides};
use crate::error::ConfigError;
use crate::schema::{FallibleConfig, parse_config_json, parse_config_toml};
use std::path::Path;

/// On-disk config format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON document.
    Json,
    /// TOML document.
    Toml,
}

impl ConfigFormat {
    /// Pick a format from a path's extension; no extension means JSON.
    pub fn detect(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            None | Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            Some(other) => Err(ConfigError::UnsupportedFormat {
                extension: other.to_owned(),
            }),
        }
    }

    /// Parse `input` in this format.
    pub fn parse(self, input: &str) -> Result<FallibleConfig, ConfigError> {
        match self {
            Self::Json => parse_config_json(input),
            Self::Toml => parse_config_toml(input),
        }
    }
}

/// Load config from in-memory text and env overrides.
pub fn load_config_from_sources(
    config_text: Option<(&str, ConfigFormat)>,
    env: &FallibleEnv,
) -> Result<FallibleConfig, ConfigError> {
    let config = match config_text {
        None => FallibleConfig::default(),
        Some((input, format)) => format.parse(input)?,
    };
    Ok(apply_env_overrides(config, env))
}

/// Load config from an optional file path and env overrides.
pub fn load_config_from_path(
    config_path: Option<&Path>,
    env: &FallibleEnv,
) -> Result<FallibleConfig, ConfigError> {
    let config = match config_path {
        None => FallibleConfig::default(),
        Some(path) => {
            let format = ConfigFormat::detect(path)?;
            let text = std::fs::read_to_string(path).map_err(|error| ConfigError::read(path, &error))?;
            tracing::debug!(path = %path.display(), ?format, "config file read");
            format.parse(&text)?
        },
    };
    Ok(apply_env_overrides(config, env))
}

/// Load config from the process environment and an optional file path.
pub fn load_config_std_env(config_path: Option<&Path>) -> Result<FallibleConfig, ConfigError> {
    let env = FallibleEnv::from_std_env()?;
    load_config_from_path(config_path, &env)
}

/// Serialize the config as pretty JSON with a trailing newline.
pub fn to_pretty_json(config: &FallibleConfig) -> Result<String, ConfigError> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| ConfigError::Serialize {
        message: error.to_string(),
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as pretty TOML with a trailing newline.
pub fn to_pretty_toml(config: &FallibleConfig) -> Result<String, ConfigError> {
    let mut output = toml::to_string_pretty(config).map_err(|error| ConfigError::Serialize {
        message: error.to_string(),
    })?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}
