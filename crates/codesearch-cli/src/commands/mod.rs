//! CLI command implementations and composition root.
//!
//! `build_services` wires the config-selected backends into the four
//! cross-crate components every command needs: the validated search
//! engine, the indexer, the hallucination detector, and the health
//! monitor's two `HealthCheckable` stores.

pub mod check;
pub mod health;
pub mod index;
pub mod search;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use codesearch_analyzer::{HallucinationDetector, Validator as AnalyzerValidator};
use codesearch_config::CoreConfig;
use codesearch_core::Validator as ValidatorTrait;
use codesearch_core::{CircuitBreaker, ValidationCache};
use codesearch_graph::{GraphStore, HttpGraphStore, InMemoryGraphStore};
use codesearch_search::{
    AzureMlConfig, AzureMlProvider, EmbeddingProvider, Indexer, LocalProvider, OpenAiConfig,
    OpenAiProvider, QdrantConfig as VectorQdrantConfig, QdrantVectorStore, ValidatedSearchEngine,
    VectorStore, VectorSuggestionSource,
};

/// The backends and cross-crate components a command needs, built once
/// from the loaded [`CoreConfig`].
pub struct Services {
    pub graph: Arc<dyn GraphStore>,
    pub vector_store: Arc<dyn VectorStore>,
    pub cache: Arc<ValidationCache>,
    /// §4.F: one breaker per dependency.
    pub graph_breaker: Arc<CircuitBreaker>,
    pub vector_breaker: Arc<CircuitBreaker>,
    pub engine: ValidatedSearchEngine,
    pub indexer: Indexer,
    pub detector: HallucinationDetector,
}

fn build_embedder(config: &CoreConfig) -> Arc<dyn EmbeddingProvider> {
    use codesearch_config::EmbeddingProviderType;

    match config.embedding.provider {
        EmbeddingProviderType::Local => Arc::new(LocalProvider::new(config.embedding.embedding_dim)),
        EmbeddingProviderType::AzureMl => {
            let settings = config
                .embedding
                .azure_ml
                .as_ref()
                .expect("validated at load time");
            Arc::new(AzureMlProvider::new(AzureMlConfig {
                endpoint_url: settings.endpoint.clone(),
                api_key: settings.api_key.clone(),
                dim: config.embedding.embedding_dim,
                timeout: Duration::from_millis(config.timeouts.embedding_timeout_ms),
            }))
        }
        EmbeddingProviderType::Openai => {
            let settings = config
                .embedding
                .openai
                .as_ref()
                .expect("validated at load time");
            Arc::new(OpenAiProvider::new(OpenAiConfig {
                base_url: "https://api.openai.com/v1".to_string(),
                api_key: settings.api_key.clone(),
                model: settings.model.clone(),
                dim: config.embedding.embedding_dim,
                timeout: Duration::from_millis(config.timeouts.embedding_timeout_ms),
            }))
        }
    }
}

fn build_graph(config: &CoreConfig) -> Arc<dyn GraphStore> {
    match &config.backend.graph.url {
        Some(url) => Arc::new(HttpGraphStore::new(
            url.clone(),
            Duration::from_millis(config.timeouts.graph_timeout_ms),
        )),
        None => Arc::new(InMemoryGraphStore::new(Default::default())),
    }
}

/// Build every backend and cross-crate component a command might need.
pub async fn build_services(config: &CoreConfig) -> Result<Services> {
    let graph = build_graph(config);
    let embedder = build_embedder(config);

    let graph_breaker = Arc::new(CircuitBreaker::new(
        config.breaker.breaker_failure_threshold,
        Duration::from_millis(config.breaker.breaker_cooldown_ms),
    ));
    let vector_breaker = Arc::new(CircuitBreaker::new(
        config.breaker.breaker_failure_threshold,
        Duration::from_millis(config.breaker.breaker_cooldown_ms),
    ));

    let vector_store: Arc<dyn VectorStore> = Arc::new(
        QdrantVectorStore::connect(
            VectorQdrantConfig {
                url: config.backend.qdrant.url.clone(),
                api_key: config.backend.qdrant.api_key.clone(),
                embedding_dim: config.embedding.embedding_dim as u64,
                timeout_secs: config.timeouts.vector_timeout_ms / 1000,
            },
            vector_breaker.clone(),
        )
        .await
        .context("connecting to the vector store backend")?,
    );

    let cache = Arc::new(ValidationCache::new(
        config.cache.cache_max_entries,
        Duration::from_secs(config.cache.cache_ttl_secs),
    ));

    let validator: Arc<dyn ValidatorTrait> = Arc::new(AnalyzerValidator::new(
        graph.clone(),
        cache.clone(),
        graph_breaker.clone(),
    ));

    let engine = ValidatedSearchEngine::new(
        vector_store.clone(),
        embedder.clone(),
        validator.clone(),
        graph_breaker.clone(),
    );

    let indexer = Indexer::new(graph.clone(), vector_store.clone(), embedder.clone());

    let suggestions = Arc::new(VectorSuggestionSource::new(
        vector_store.clone(),
        embedder.clone(),
    ));
    let detector = HallucinationDetector::new(validator, Some(suggestions));

    Ok(Services {
        graph,
        vector_store,
        cache,
        graph_breaker,
        vector_breaker,
        engine,
        indexer,
        detector,
    })
}
