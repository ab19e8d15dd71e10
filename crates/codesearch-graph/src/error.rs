//! Graph store error types.

use codesearch_core::{ErrorKind, TaxonomyError};
use thiserror::Error;

/// Errors that can occur during graph store operations.
#[derive(Error, Debug)]
pub enum GraphStoreError {
    /// Repository is not present in the graph (§7: not_found).
    #[error("repository '{name}' not found in graph")]
    RepositoryNotFound { name: String },

    /// Per-call deadline (§5: graph query 1000ms default) was exceeded.
    #[error("graph query timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// Circuit breaker is open for this store.
    #[error("graph store unavailable: circuit breaker is open")]
    Unavailable,

    /// The remote backend returned a non-success HTTP status.
    #[error("remote graph server error: {status} - {message}")]
    RemoteServer { status: u16, message: String },

    /// Transport-level failure reaching a remote backend.
    #[error("connection to graph store failed: {0}")]
    Connection(String),

    /// Response body could not be decoded.
    #[error("malformed graph response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GraphStoreError {
    pub fn repository_not_found(name: impl Into<String>) -> Self {
        Self::RepositoryNotFound { name: name.into() }
    }

    pub fn remote_server(status: u16, message: impl Into<String>) -> Self {
        Self::RemoteServer {
            status,
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }
}

impl TaxonomyError for GraphStoreError {
    fn kind(&self) -> ErrorKind {
        match self {
            GraphStoreError::RepositoryNotFound { .. } => ErrorKind::NotFound,
            GraphStoreError::Timeout { .. } => ErrorKind::DependencyTimeout,
            GraphStoreError::Unavailable => ErrorKind::DependencyUnavailable,
            GraphStoreError::RemoteServer { .. } | GraphStoreError::Connection(_) => {
                ErrorKind::DependencyUnavailable
            }
            GraphStoreError::Serialization(_) => ErrorKind::Corrupt,
        }
    }

    fn suggestion(&self) -> Option<&str> {
        match self {
            GraphStoreError::RepositoryNotFound { .. } => {
                Some("index the repository before querying it")
            }
            GraphStoreError::Unavailable => {
                Some("the graph store breaker is open; retry after its cooldown")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_not_found_message() {
        let err = GraphStoreError::repository_not_found("acme/widgets");
        assert!(err.to_string().contains("acme/widgets"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn remote_server_message() {
        let err = GraphStoreError::remote_server(500, "internal error");
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("internal error"));
    }
}
