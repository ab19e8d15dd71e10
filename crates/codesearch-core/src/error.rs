//! Shared error taxonomy (§7).
//!
//! Every crate's `thiserror` enum implements `kind()` returning one of these
//! variants, so the CLI and any future caller can match on the
//! machine-readable kind uniformly regardless of which crate raised it.

use serde::{Deserialize, Serialize};

/// Machine-readable error kind, independent of which crate raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    DependencyUnavailable,
    DependencyTimeout,
    NotFound,
    Corrupt,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::DependencyUnavailable => "dependency_unavailable",
            ErrorKind::DependencyTimeout => "dependency_timeout",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Corrupt => "corrupt",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Implemented by every crate's error enum so callers can extract a
/// taxonomy kind and a remediation suggestion without matching on variants
/// they don't know about.
pub trait TaxonomyError: std::error::Error {
    fn kind(&self) -> ErrorKind;

    /// A remediation suggestion, where one applies (§7: "a suggestion for
    /// remediation").
    fn suggestion(&self) -> Option<&str> {
        None
    }
}
