//! Config failures and their structured rendering.

use crate::env::EnvParseError;
use fallible_shared::{ErrorCode, FailureReport};

/// Failure while loading or rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Config JSON failed to parse.
    #[error("invalid config JSON: {message}")]
    InvalidJson {
        /// Parser message.
        message: String,
    },
    /// Config TOML failed to parse.
    #[error("invalid config TOML: {message}")]
    InvalidToml {
        /// Parser message.
        message: String,
    },
    /// File extension is neither `.json` nor `.toml`.
    #[error("unsupported config format `.{extension}`; use .json or .toml")]
    UnsupportedFormat {
        /// Offending extension.
        extension: String,
    },
    /// The config file could not be read.
    #[error("failed to read config file {path}: {message}")]
    Read {
        /// File path.
        path: String,
        /// Which read failure occurred.
        kind: ReadFailure,
        /// OS message.
        message: String,
    },
    /// An env override was malformed.
    #[error(transparent)]
    Env(#[from] EnvParseError),
    /// The config could not be serialized.
    #[error("failed to serialize config: {message}")]
    Serialize {
        /// Serializer message.
        message: String,
    },
}

/// Read failure classes, mapped to distinct error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFailure {
    /// The file does not exist.
    NotFound,
    /// The process may not read the file.
    PermissionDenied,
    /// Any other I/O failure.
    Io,
}

impl ConfigError {
    pub(crate) fn read(path: &std::path::Path, error: &std::io::Error) -> Self {
        let kind = match error.kind() {
            std::io::ErrorKind::NotFound => ReadFailure::NotFound,
            std::io::ErrorKind::PermissionDenied => ReadFailure::PermissionDenied,
            _ => ReadFailure::Io,
        };
        Self::Read {
            path: path.to_string_lossy().into_owned(),
            kind,
            message: error.to_string(),
        }
    }

    /// Stable `config:*` error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        let code = match self {
            Self::InvalidJson { .. } => "invalid_json",
            Self::InvalidToml { .. } => "invalid_toml",
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::Read {
                kind: ReadFailure::NotFound,
                ..
            } => "config_file_not_found",
            Self::Read {
                kind: ReadFailure::PermissionDenied,
                ..
            } => "config_file_permission_denied",
            Self::Read {
                kind: ReadFailure::Io,
                ..
            } => "config_file_io",
            Self::Env(_) => "invalid_env",
            Self::Serialize { .. } => "serialize",
        };
        ErrorCode::new("config", code)
    }

    /// Returns true when the failure came from the filesystem.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Read { .. })
    }

    /// Structured rendering in the configuration category.
    #[must_use]
    pub fn report(&self) -> FailureReport {
        let report = FailureReport::configuration(self.code(), self.to_string());
        match self {
            Self::Read { path, .. } => report.with_metadata("path", path.clone()),
            Self::UnsupportedFormat { extension } => report.with_metadata("extension", extension.clone()),
            Self::Env(error) => report.with_metadata("var", error.var()),
            _ => report,
        }
    }
}

impl From<ConfigError> for FailureReport {
    fn from(error: ConfigError) -> Self {
        error.report()
    }
}
