//! Embedding provider trait and types (§4.A).
//!
//! A single fixed-dimension `embed` contract, generalized from the teacher's
//! separate semantic/code dual-encoder methods (`encode_semantic`/
//! `encode_code`) down to the one embedding space this spec requires.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Type of embedding provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EmbeddingProviderType {
    #[default]
    Local,
    AzureMl,
    OpenAi,
}

impl std::fmt::Display for EmbeddingProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProviderType::Local => write!(f, "local"),
            EmbeddingProviderType::AzureMl => write!(f, "azure-ml"),
            EmbeddingProviderType::OpenAi => write!(f, "openai"),
        }
    }
}

/// Health/capability snapshot for an embedding provider.
#[derive(Debug, Clone)]
pub struct ProviderStatus {
    pub available: bool,
    pub provider_type: EmbeddingProviderType,
    pub device: String,
    pub latency_ms: Option<u64>,
    pub error: Option<String>,
}

impl ProviderStatus {
    pub fn healthy(provider_type: EmbeddingProviderType, device: impl Into<String>) -> Self {
        Self {
            available: true,
            provider_type,
            device: device.into(),
            latency_ms: None,
            error: None,
        }
    }

    pub fn unavailable(provider_type: EmbeddingProviderType, error: impl Into<String>) -> Self {
        Self {
            available: false,
            provider_type,
            device: "N/A".into(),
            latency_ms: None,
            error: Some(error.into()),
        }
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }
}

/// Produces fixed-dimension vectors for text (§4.A). Must tolerate empty
/// input (returns an empty sequence) and be safe to call concurrently.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts. Every vector has `embedding_dim()` entries.
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Connectivity/capability check.
    async fn check_status(&self) -> Result<ProviderStatus>;

    /// The dimensionality every embedding this provider returns must have.
    fn embedding_dim(&self) -> usize;

    fn provider_type(&self) -> EmbeddingProviderType;
}

/// Validate that every embedding in `vectors` has exactly `expected_dim`
/// entries. A mismatch is a fatal programming error (§4.B).
pub fn validate_dimension(vectors: &[Vec<f32>], expected_dim: usize) -> Result<()> {
    for v in vectors {
        if v.len() != expected_dim {
            return Err(SearchError::DimensionMismatch {
                expected: expected_dim,
                actual: v.len(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_type_display() {
        assert_eq!(EmbeddingProviderType::Local.to_string(), "local");
        assert_eq!(EmbeddingProviderType::AzureMl.to_string(), "azure-ml");
        assert_eq!(EmbeddingProviderType::OpenAi.to_string(), "openai");
    }

    #[test]
    fn validate_dimension_catches_mismatch() {
        let vectors = vec![vec![0.0; 4], vec![0.0; 3]];
        let err = validate_dimension(&vectors, 4).unwrap_err();
        assert!(matches!(err, SearchError::DimensionMismatch { .. }));
    }

    #[test]
    fn validate_dimension_accepts_matching_vectors() {
        let vectors = vec![vec![0.0; 4], vec![1.0; 4]];
        assert!(validate_dimension(&vectors, 4).is_ok());
    }
}
