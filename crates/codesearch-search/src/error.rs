//! Error types for codesearch-search.

use codesearch_core::{ErrorKind, TaxonomyError};
use thiserror::Error;

/// Errors that can occur in codesearch-search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Qdrant error: {0}")]
    Qdrant(String),

    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("embedding provider rate limited, retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("repository '{0}' not found in graph")]
    RepositoryNotFound(String),

    #[error("query is empty")]
    EmptyQuery,

    #[error("top_k {0} out of range [1,50]")]
    TopKOutOfRange(usize),

    #[error("min_confidence {0} out of range [0,1]")]
    MinConfidenceOutOfRange(f64),

    #[error("call timed out after {millis}ms")]
    Timeout { millis: u64 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("qdrant client error: {0}")]
    QdrantClient(#[from] qdrant_client::QdrantError),
}

impl TaxonomyError for SearchError {
    fn kind(&self) -> ErrorKind {
        match self {
            SearchError::EmptyQuery
            | SearchError::TopKOutOfRange(_)
            | SearchError::MinConfidenceOutOfRange(_)
            | SearchError::InvalidConfig(_) => ErrorKind::InvalidInput,
            SearchError::RepositoryNotFound(_) => ErrorKind::NotFound,
            SearchError::Timeout { .. } => ErrorKind::DependencyTimeout,
            SearchError::Qdrant(_)
            | SearchError::CollectionNotFound(_)
            | SearchError::Connection(_)
            | SearchError::ProviderUnavailable(_)
            | SearchError::QdrantClient(_)
            | SearchError::RateLimited { .. } => ErrorKind::DependencyUnavailable,
            SearchError::DimensionMismatch { .. } | SearchError::Serialization(_) => {
                ErrorKind::Corrupt
            }
        }
    }
}

/// Result type for codesearch-search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
