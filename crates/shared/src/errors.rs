//! Failure taxonomy and structured failure reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metadata attached to reports for diagnostics.
pub type ReportMetadata = BTreeMap<String, String>;

/// High-level classification of where a failure comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    /// Expected domain failures carried by an outcome.
    Domain,
    /// Failures raised by a deferred cleanup action.
    Cleanup,
    /// Programmer mistakes detected while wiring the library.
    Configuration,
    /// A forced unwrap hit a failure.
    Forced,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain => formatter.write_str("domain"),
            Self::Cleanup => formatter.write_str("cleanup"),
            Self::Configuration => formatter.write_str("configuration"),
            Self::Forced => formatter.write_str("forced"),
        }
    }
}

/// Stable error code with namespace and identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode {
    namespace: String,
    code: String,
}

impl ErrorCode {
    /// Create a new error code with a namespace and code.
    pub fn new(namespace: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            code: code.into(),
        }
    }

    /// Deferred action returned an error.
    pub fn cleanup_failed() -> Self {
        Self::new("defer", "cleanup_failed")
    }

    /// Deferred action panicked.
    pub fn cleanup_panicked() -> Self {
        Self::new("defer", "cleanup_panicked")
    }

    /// Dispatcher built without a fallback handler.
    pub fn missing_fallback() -> Self {
        Self::new("dispatch", "missing_fallback")
    }

    /// Forced unwrap on a failure.
    pub fn forced_unwrap() -> Self {
        Self::new("outcome", "forced_unwrap")
    }

    /// Returns the namespace portion.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the code identifier.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.namespace, self.code)
    }
}

/// Structured, serializable rendering of a failure.
///
/// Reports nest: secondary reports (for example cleanup failures raised while
/// a scope was exiting) are attached to the primary cause instead of
/// replacing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    /// Category describing the failure origin.
    pub category: ErrorCategory,
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Additional diagnostic metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: ReportMetadata,
    /// Secondary failures attached to this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary: Vec<Self>,
}

impl FailureReport {
    /// Create a report with an explicit category.
    pub fn new(category: ErrorCategory, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            category,
            code,
            message: message.into(),
            metadata: BTreeMap::new(),
            secondary: Vec::new(),
        }
    }

    /// Create a domain report.
    pub fn domain(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Domain, code, message)
    }

    /// Create a cleanup report.
    pub fn cleanup(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Cleanup, code, message)
    }

    /// Create a configuration report.
    pub fn configuration(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Configuration, code, message)
    }

    /// Create a forced-unwrap report.
    pub fn forced(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Forced, ErrorCode::forced_unwrap(), message)
    }

    /// Attach a single metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach a secondary report, keeping this one as the primary cause.
    #[must_use]
    pub fn with_secondary(mut self, report: Self) -> Self {
        self.secondary.push(report);
        self
    }

    /// Attach several secondary reports in order.
    #[must_use]
    pub fn with_secondaries(mut self, reports: impl IntoIterator<Item = Self>) -> Self {
        self.secondary.extend(reports);
        self
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {}: {}", self.category, self.code, self.message)?;
        for (key, value) in &self.metadata {
            write!(formatter, " {key}={value}")?;
        }
        for secondary in &self.secondary {
            let relation = match secondary.category {
                ErrorCategory::Cleanup => "caused during exit",
                _ => "caused by",
            };
            write!(formatter, "\n  {relation}: {secondary}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FailureReport {}
