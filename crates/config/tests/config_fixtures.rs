//! Integration tests for loading config files from disk.

use fallible_config::{
    ConfigError, FallibleEnv, LogFormat, LogLevel, load_config_from_path,
};
use fallible_recovery::LintPolicy;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

fn write_fixture(name: &str, contents: &str) -> Result<PathBuf, Box<dyn Error>> {
    let dir = std::env::temp_dir().join(format!("fallible-config-{}", std::process::id()));
    fs::create_dir_all(&dir)?;
    let path = dir.join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

#[test]
fn loads_toml_file() -> Result<(), Box<dyn Error>> {
    let path = write_fixture(
        "fallible.toml",
        "[logging]\nlevel = \"info\"\nformat = \"json\"\n\n[recovery]\nlint = \"deny\"\n",
    )?;
    let config = load_config_from_path(Some(&path), &FallibleEnv::default())?;

    assert_eq!(config.logging.level, LogLevel::Info);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.recovery.lint, LintPolicy::Deny);
    Ok(())
}

#[test]
fn env_overrides_json_file() -> Result<(), Box<dyn Error>> {
    let path = write_fixture(
        "fallible.json",
        r#"{"logging":{"level":"error"},"recovery":{"logFallback":false}}"#,
    )?;
    let env = FallibleEnv {
        log_level: Some(LogLevel::Debug),
        log_fallback: Some(true),
        ..FallibleEnv::default()
    };
    let config = load_config_from_path(Some(&path), &env)?;

    assert_eq!(config.logging.level, LogLevel::Debug);
    assert!(config.recovery.log_fallback);
    assert_eq!(config.recovery.lint, LintPolicy::Warn);
    Ok(())
}

#[test]
fn invalid_file_reports_parse_failure() -> Result<(), Box<dyn Error>> {
    let path = write_fixture("broken.json", "{ not json")?;
    let error = load_config_from_path(Some(&path), &FallibleEnv::default()).err();

    assert!(matches!(error, Some(ConfigError::InvalidJson { .. })));
    assert_eq!(
        error.map(|error| error.report().code.to_string()),
        Some("config:invalid_json".to_owned())
    );
    Ok(())
}
