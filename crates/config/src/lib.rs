//! # fallible-config
//!
//! Configuration schema and loading for hosts of the fallible crates.
//! This crate depends on `recovery` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config failures.
pub mod error;
/// Config loading helpers (env + file).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use env::{
    ENV_LINT, ENV_LOG_FALLBACK, ENV_LOG_FORMAT, ENV_LOG_LEVEL, EnvParseError, FallibleEnv,
    apply_env_overrides,
};
pub use error::{ConfigError, ReadFailure};
pub use load::{
    ConfigFormat, load_config_from_path, load_config_from_sources, load_config_std_env,
    to_pretty_json, to_pretty_toml,
};
pub use schema::{
    FallibleConfig, LogFormat, LogLevel, LoggingConfig, RecoveryConfig, parse_config_json,
    parse_config_toml,
};

#[cfg(test)]
mod tests {
    use super::*;
    use fallible_shared::ErrorCategory;

    #[test]
    fn errors_report_in_configuration_category() {
        let report = ConfigError::from(EnvParseError::EmptyValue { var: ENV_LINT }).report();
        assert_eq!(report.category, ErrorCategory::Configuration);
        assert_eq!(report.code.to_string(), "config:invalid_env");
        assert_eq!(report.metadata.get("var").map(String::as_str), Some(ENV_LINT));
    }
}
