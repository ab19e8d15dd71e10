//! Deterministic local embedding provider.
//!
//! The teacher's `LocalProvider` runs Candle + Jina models on-device; this
//! spec's reference deployment drops that GPU inference stack (see
//! DESIGN.md) in favour of a deterministic hash-based embedding used for
//! tests and offline operation. It satisfies the same trait contract and is
//! a drop-in for anything exercising the embedding boundary without a real
//! model.

use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use crate::embeddings::provider::{EmbeddingProvider, EmbeddingProviderType, ProviderStatus};
use crate::error::Result;

pub struct LocalProvider {
    dim: usize,
}

impl LocalProvider {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    /// Deterministic, seeded-by-content pseudo-embedding: splits the text's
    /// hash across the target dimension and normalises to unit length, so
    /// cosine similarity between repeated runs and between near-duplicate
    /// text is stable.
    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        if text.is_empty() {
            return vector;
        }
        for (i, slot) in vector.iter_mut().enumerate() {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            text.hash(&mut hasher);
            i.hash(&mut hasher);
            let bits = hasher.finish();
            *slot = ((bits % 2000) as f32 / 1000.0) - 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for LocalProvider {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    async fn check_status(&self) -> Result<ProviderStatus> {
        Ok(ProviderStatus::healthy(EmbeddingProviderType::Local, "CPU"))
    }

    fn embedding_dim(&self) -> usize {
        self.dim
    }

    fn provider_type(&self) -> EmbeddingProviderType {
        EmbeddingProviderType::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embeds_at_the_configured_dimension() {
        let provider = LocalProvider::new(16);
        let vectors = provider.embed(vec!["hello".to_string()]).await.unwrap();
        assert_eq!(vectors[0].len(), 16);
    }

    #[tokio::test]
    async fn empty_input_returns_empty_output() {
        let provider = LocalProvider::new(16);
        let vectors = provider.embed(vec![]).await.unwrap();
        assert!(vectors.is_empty());
    }

    #[tokio::test]
    async fn same_text_embeds_identically() {
        let provider = LocalProvider::new(8);
        let a = provider.embed(vec!["foo".to_string()]).await.unwrap();
        let b = provider.embed(vec!["foo".to_string()]).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn different_text_embeds_differently() {
        let provider = LocalProvider::new(8);
        let a = provider.embed(vec!["foo".to_string()]).await.unwrap();
        let b = provider.embed(vec!["bar".to_string()]).await.unwrap();
        assert_ne!(a, b);
    }
}
