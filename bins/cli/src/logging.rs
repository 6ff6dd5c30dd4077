//! Tracing subscriber setup from the effective logging config.

use fallible_config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber for the configured level and format.
///
/// `RUST_LOG` takes precedence over the configured level when set. A second
/// call is a no-op.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.with_ansi(false).try_init(),
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
