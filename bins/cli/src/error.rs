use fallible_config::ConfigError;
use fallible_recovery::DispatchConfigError;
use fallible_shared::{ErrorCode, FailureReport};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    Internal = 1,
    InvalidInput = 2,
    Io = 3,
    Unrecovered = 4,
}

impl ExitCode {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

#[derive(Debug)]
pub enum CliError {
    InvalidInput(String),
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Config(ConfigError),
    Dispatch(DispatchConfigError),
}

impl CliError {
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidInput(_) | Self::Dispatch(_) => ExitCode::InvalidInput,
            Self::Config(error) if error.is_io() => ExitCode::Io,
            Self::Config(_) => ExitCode::InvalidInput,
            Self::Io(_) => ExitCode::Io,
            Self::Serialization(_) => ExitCode::Internal,
        }
    }

    /// Structured rendering for JSON output modes.
    #[must_use]
    pub fn report(&self) -> FailureReport {
        match self {
            Self::InvalidInput(message) => {
                FailureReport::configuration(ErrorCode::new("cli", "invalid_input"), message.clone())
            },
            Self::Io(error) => FailureReport::configuration(ErrorCode::new("cli", "io"), error.to_string()),
            Self::Serialization(error) => {
                FailureReport::configuration(ErrorCode::new("cli", "serialization"), error.to_string())
            },
            Self::Config(error) => error.report(),
            Self::Dispatch(error) => error.report(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(formatter, "invalid input: {message}"),
            Self::Io(error) => write!(formatter, "io error: {error}"),
            Self::Serialization(error) => write!(formatter, "serialization error: {error}"),
            Self::Config(error) => write!(formatter, "config error: {error}"),
            Self::Dispatch(error) => write!(formatter, "dispatcher error: {error}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error)
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}

impl From<DispatchConfigError> for CliError {
    fn from(error: DispatchConfigError) -> Self {
        Self::Dispatch(error)
    }
}
