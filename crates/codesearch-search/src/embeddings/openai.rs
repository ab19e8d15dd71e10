//! OpenAI-compatible HTTP embeddings provider.
//!
//! Ported from the teacher's `embeddings/openai.rs`: posts to the
//! `/embeddings` endpoint of any OpenAI-compatible API (OpenAI itself,
//! Azure OpenAI, Ollama), narrowed to the single fixed `embedding_dim` this
//! spec enforces.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::embeddings::provider::{
    validate_dimension, EmbeddingProvider, EmbeddingProviderType, ProviderStatus,
};
use crate::error::{Result, SearchError};

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub dim: usize,
    pub timeout: Duration,
}

pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("reqwest client configuration is valid");
        Self { config, client }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| SearchError::Connection(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited {
                retry_after_secs: response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok()),
            });
        }
        if !status.is_success() {
            return Err(SearchError::ProviderUnavailable(format!(
                "openai embeddings returned {status}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Connection(e.to_string()))?;
        let vectors: Vec<Vec<f32>> = parsed.data.into_iter().map(|d| d.embedding).collect();
        validate_dimension(&vectors, self.config.dim)?;
        Ok(vectors)
    }

    async fn check_status(&self) -> Result<ProviderStatus> {
        let start = std::time::Instant::now();
        match self.embed(vec!["ping".to_string()]).await {
            Ok(_) => Ok(ProviderStatus::healthy(EmbeddingProviderType::OpenAi, "Remote")
                .with_latency(start.elapsed().as_millis() as u64)),
            Err(e) => Ok(ProviderStatus::unavailable(
                EmbeddingProviderType::OpenAi,
                e.to_string(),
            )),
        }
    }

    fn embedding_dim(&self) -> usize {
        self.config.dim
    }

    fn provider_type(&self) -> EmbeddingProviderType {
        EmbeddingProviderType::OpenAi
    }
}
