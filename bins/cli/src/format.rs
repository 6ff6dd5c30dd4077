//! Output format helpers for CLI commands.

use crate::error::CliError;
use clap::{Args, ValueEnum};
use fallible_recovery::ResolvedBy;
use serde_json::Value;
use std::path::PathBuf;

/// Output format choices for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-friendly text output.
    Text,
    /// Machine-friendly JSON output.
    Json,
    /// Line-delimited JSON (NDJSON) output.
    Ndjson,
}

/// Flags shared by every subcommand.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Output format for command responses.
    #[arg(long, global = true, value_enum)]
    pub output: Option<OutputFormat>,
    /// Config file path (JSON/TOML).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Output mode derived from CLI flags.
#[derive(Debug, Clone, Copy)]
pub struct OutputMode {
    pub format: OutputFormat,
}

impl OutputMode {
    /// Build output mode from CLI flags.
    #[must_use]
    pub fn from_args(args: &OutputArgs) -> Self {
        Self {
            format: args.output.unwrap_or(OutputFormat::Text),
        }
    }

    /// Returns true when JSON output is requested.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Returns true when NDJSON output is requested.
    #[must_use]
    pub const fn is_ndjson(self) -> bool {
        matches!(self.format, OutputFormat::Ndjson)
    }

    /// Render `text` or `payload` depending on the mode.
    ///
    /// NDJSON lines carry a `type` field; JSON is pretty-printed. Both end
    /// with a newline.
    pub fn render(self, text: String, kind: &str, mut payload: Value) -> Result<String, CliError> {
        if self.is_ndjson() {
            if let Value::Object(map) = &mut payload {
                map.insert("type".to_owned(), Value::from("summary"));
                map.insert("kind".to_owned(), Value::from(kind));
            }
            let mut output = serde_json::to_string(&payload)?;
            output.push('\n');
            Ok(output)
        } else if self.is_json() {
            let mut output = serde_json::to_string_pretty(&payload)?;
            output.push('\n');
            Ok(output)
        } else {
            Ok(text)
        }
    }
}

/// JSON rendering of the branch that resolved a failure.
#[must_use]
pub fn resolved_by_json(resolved_by: &ResolvedBy) -> Value {
    match resolved_by {
        ResolvedBy::Success => serde_json::json!({ "branch": "success" }),
        ResolvedBy::Pattern { index, label } => serde_json::json!({
            "branch": "pattern",
            "index": index,
            "label": label,
        }),
        ResolvedBy::Fallback => serde_json::json!({ "branch": "fallback" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_mode_passes_text_through() -> Result<(), CliError> {
        let mode = OutputMode {
            format: OutputFormat::Text,
        };
        let output = mode.render("2\n".to_owned(), "divide", serde_json::json!({ "result": "2" }))?;
        assert_eq!(output, "2\n");
        Ok(())
    }

    #[test]
    fn ndjson_adds_type_and_kind() -> Result<(), CliError> {
        let mode = OutputMode {
            format: OutputFormat::Ndjson,
        };
        let output = mode.render(String::new(), "divide", serde_json::json!({ "status": "ok" }))?;
        let parsed: Value = serde_json::from_str(output.trim_end())?;

        assert_eq!(parsed["type"], "summary");
        assert_eq!(parsed["kind"], "divide");
        assert_eq!(output.lines().count(), 1);
        Ok(())
    }

    #[test]
    fn resolved_by_names_the_branch() {
        let value = resolved_by_json(&ResolvedBy::Pattern {
            index: 1,
            label: Some("zero".to_owned()),
        });
        assert_eq!(value["branch"], "pattern");
        assert_eq!(value["label"], "zero");
    }
}
