//! Config command handlers.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::OutputMode;
use fallible_config::{FallibleConfig, to_pretty_toml};
use std::path::Path;

/// Render the effective config (defaults, file, then env).
pub fn run_config_show(mode: OutputMode, config: &FallibleConfig) -> Result<CliOutput, CliError> {
    let text = to_pretty_toml(config)?;
    let stdout = mode.render(
        text,
        "config",
        serde_json::json!({
            "status": "ok",
            "config": config,
        }),
    )?;
    Ok(CliOutput::ok(stdout))
}

/// Confirm the effective config loaded; load failures never reach this point.
pub fn run_config_check(
    mode: OutputMode,
    config: &FallibleConfig,
    path: Option<&Path>,
) -> Result<CliOutput, CliError> {
    let source = path.map_or_else(|| "defaults".to_owned(), |path| path.display().to_string());
    let text = format!(
        "status: ok\nsource: {source}\nlint: {}\nlog level: {}\n",
        config.recovery.lint, config.logging.level
    );
    let stdout = mode.render(
        text,
        "config",
        serde_json::json!({
            "status": "ok",
            "source": source,
        }),
    )?;
    Ok(CliOutput::ok(stdout))
}
