//! Build-time diagnostics for unreachable patterns.

use crate::pattern::{Coverage, RecoveryPattern};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A pattern that can never be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "lint", rename_all = "camelCase")]
pub enum PatternLint {
    /// Every failure the pattern at `index` accepts is taken earlier.
    Shadowed {
        /// Unreachable pattern.
        index: usize,
        /// Earlier unconditional pattern that completes the shadowing.
        by: usize,
    },
    /// The pattern at `index` accepts no kind at all.
    Empty {
        /// Unreachable pattern.
        index: usize,
    },
    /// Earlier unconditional patterns cover every kind of the family.
    FallbackUnreachable {
        /// Pattern that completes the coverage.
        by: usize,
    },
}

impl fmt::Display for PatternLint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shadowed { index, by } => {
                write!(f, "pattern #{index} is unreachable: shadowed by pattern #{by}")
            },
            Self::Empty { index } => write!(f, "pattern #{index} is unreachable: it accepts no kind"),
            Self::FallbackUnreachable { by } => {
                write!(f, "fallback is unreachable: pattern #{by} completes coverage")
            },
        }
    }
}

/// What the dispatcher builder does with lints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LintPolicy {
    /// Keep lints available through `Dispatcher::lints` only.
    Allow,
    /// Log each lint at `warn`.
    #[default]
    Warn,
    /// Refuse to build a dispatcher with a shadowed pattern.
    Deny,
}

impl LintPolicy {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Warn => "warn",
            Self::Deny => "deny",
        }
    }
}

impl fmt::Display for LintPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised lint policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown lint policy `{0}` (expected allow, warn or deny)")]
pub struct ParseLintPolicyError(String);

impl FromStr for LintPolicy {
    type Err = ParseLintPolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "warn" => Ok(Self::Warn),
            "deny" => Ok(Self::Deny),
            _ => Err(ParseLintPolicyError(value.to_owned())),
        }
    }
}

/// Compute lints for `patterns` in order, over the family `kinds`.
///
/// Only unconditional patterns shadow; a later pattern is reported when the
/// kinds it accepts are all taken by earlier unconditional patterns. A
/// pattern over an empty kind list is always reported.
pub(crate) fn check<F, S>(patterns: &[RecoveryPattern<F, S>], kinds: &[&'static str]) -> Vec<PatternLint> {
    let mut lints = Vec::new();
    let mut taken: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut all_by: Option<usize> = None;

    for (index, pattern) in patterns.iter().enumerate() {
        if matches!(pattern.coverage(), Coverage::Kinds(accepted) if accepted.is_empty()) {
            lints.push(PatternLint::Empty { index });
            continue;
        }
        let shadowed_by = all_by.or_else(|| match pattern.coverage() {
            Coverage::All => covered_by(&taken, kinds),
            Coverage::Kinds(accepted) => covered_by(&taken, accepted),
        });
        if let Some(by) = shadowed_by {
            lints.push(PatternLint::Shadowed { index, by });
        }

        if pattern.is_conditional() {
            continue;
        }
        match pattern.coverage() {
            Coverage::All => {
                all_by.get_or_insert(index);
            },
            Coverage::Kinds(accepted) => {
                for kind in accepted {
                    taken.entry(*kind).or_insert(index);
                }
            },
        }
    }

    let fallback_by = all_by.or_else(|| covered_by(&taken, kinds));
    if let Some(by) = fallback_by {
        lints.push(PatternLint::FallbackUnreachable { by });
    }
    lints
}

/// Index of the pattern that completes coverage of `kinds`, if covered.
fn covered_by(taken: &BTreeMap<&'static str, usize>, kinds: &[&'static str]) -> Option<usize> {
    if kinds.is_empty() {
        return None;
    }
    kinds
        .iter()
        .map(|kind| taken.get(kind).copied())
        .try_fold(0, |latest, by| by.map(|by| latest.max(by)))
}
