//! Error taxonomy for the static analyser, validator, and hallucination
//! detector (§7).

use codesearch_core::{ErrorKind, TaxonomyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("failed to parse program text")]
    ParseFailed,

    #[error("graph store unavailable: {0}")]
    GraphUnavailable(String),

    #[error("repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TaxonomyError for AnalyzerError {
    fn kind(&self) -> ErrorKind {
        match self {
            AnalyzerError::ParseFailed => ErrorKind::InvalidInput,
            AnalyzerError::GraphUnavailable(_) => ErrorKind::DependencyUnavailable,
            AnalyzerError::RepositoryNotFound(_) => ErrorKind::NotFound,
            AnalyzerError::Serialization(_) => ErrorKind::Corrupt,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
