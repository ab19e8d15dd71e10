//! Azure ML online-endpoint embeddings provider.
//!
//! Ported from the teacher's `embeddings/azure_ml.rs`: POSTs to an Azure ML
//! managed online endpoint, authenticating with a key header rather than a
//! bearer token.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::embeddings::provider::{
    validate_dimension, EmbeddingProvider, EmbeddingProviderType, ProviderStatus,
};
use crate::error::{Result, SearchError};

#[derive(Debug, Clone)]
pub struct AzureMlConfig {
    pub endpoint_url: String,
    pub api_key: String,
    pub dim: usize,
    pub timeout: Duration,
}

pub struct AzureMlProvider {
    config: AzureMlConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct AzureMlRequest {
    input: Vec<String>,
}

#[derive(Deserialize)]
struct AzureMlResponse {
    embeddings: Vec<Vec<f32>>,
}

impl AzureMlProvider {
    pub fn new(config: AzureMlConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("reqwest client configuration is valid");
        Self { config, client }
    }
}

#[async_trait]
impl EmbeddingProvider for AzureMlProvider {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .client
            .post(&self.config.endpoint_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&AzureMlRequest { input: texts })
            .send()
            .await
            .map_err(|e| SearchError::Connection(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited {
                retry_after_secs: None,
            });
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(SearchError::ProviderUnavailable(
                "azure ml authentication failed".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(SearchError::ProviderUnavailable(format!(
                "azure ml endpoint returned {status}"
            )));
        }

        let parsed: AzureMlResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Connection(e.to_string()))?;
        validate_dimension(&parsed.embeddings, self.config.dim)?;
        Ok(parsed.embeddings)
    }

    async fn check_status(&self) -> Result<ProviderStatus> {
        let start = std::time::Instant::now();
        match self.embed(vec!["ping".to_string()]).await {
            Ok(_) => Ok(
                ProviderStatus::healthy(EmbeddingProviderType::AzureMl, "Remote")
                    .with_latency(start.elapsed().as_millis() as u64),
            ),
            Err(e) => Ok(ProviderStatus::unavailable(
                EmbeddingProviderType::AzureMl,
                e.to_string(),
            )),
        }
    }

    fn embedding_dim(&self) -> usize {
        self.config.dim
    }

    fn provider_type(&self) -> EmbeddingProviderType {
        EmbeddingProviderType::AzureMl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_input_short_circuits_without_a_request() {
        let provider = AzureMlProvider::new(AzureMlConfig {
            endpoint_url: "http://localhost:1".to_string(),
            api_key: "test".to_string(),
            dim: 1536,
            timeout: Duration::from_millis(100),
        });
        let result = provider.embed(vec![]).await.unwrap();
        assert!(result.is_empty());
    }
}
