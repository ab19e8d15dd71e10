//! Configuration for the validated code search core (§6).
//!
//! Loaded from TOML with the teacher's global → local → CLI-override merge
//! order (see [`loader`]), covering every option the core recognises:
//! embedding dimension, cache sizing, per-call deadlines, circuit breaker
//! parameters, and the search-mode tuning tables, plus the ambient backend
//! connection and logging settings the core needs to stand itself up.

pub mod error;
pub mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the validated code search core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub embedding: EmbeddingConfig,
    pub backend: BackendConfig,
    pub cache: CacheConfig,
    pub timeouts: TimeoutConfig,
    pub breaker: BreakerConfig,
    pub search: SearchTuningConfig,
    pub logging: LoggingConfig,
}

/// `embedding_dim` and the provider this process embeds through (§4.A, §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProviderType,
    /// Vector dimension enforced on every write; changing requires a full reindex.
    pub embedding_dim: usize,
    pub azure_ml: Option<AzureMlSettings>,
    pub openai: Option<OpenAiSettings>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderType::Local,
            embedding_dim: 1536,
            azure_ml: None,
            openai: None,
        }
    }
}

impl EmbeddingConfig {
    /// Cross-field validation: a remote provider needs its settings block.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.provider {
            EmbeddingProviderType::Local => Ok(()),
            EmbeddingProviderType::AzureMl if self.azure_ml.is_some() => Ok(()),
            EmbeddingProviderType::AzureMl => Err(ConfigError::invalid_value(
                "embedding.azure_ml",
                "provider is azure_ml but no azure_ml settings were supplied",
            )),
            EmbeddingProviderType::Openai if self.openai.is_some() => Ok(()),
            EmbeddingProviderType::Openai => Err(ConfigError::invalid_value(
                "embedding.openai",
                "provider is openai but no openai settings were supplied",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderType {
    #[default]
    Local,
    AzureMl,
    Openai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AzureMlSettings {
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiSettings {
    pub api_key: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    16
}

fn default_openai_model() -> String {
    "text-embedding-3-small".to_string()
}

/// Connection settings for the vector store and graph store backends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub qdrant: QdrantConfig,
    pub graph: GraphConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub collection_prefix: String,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            collection_prefix: "codesearch".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub url: Option<String>,
}

/// §4.D TTL+LRU validation cache parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub cache_max_entries: usize,
    pub cache_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_max_entries: 10_000,
            cache_ttl_secs: 300,
        }
    }
}

/// Per-call deadlines (§5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub vector_timeout_ms: u64,
    pub graph_timeout_ms: u64,
    pub embedding_timeout_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            vector_timeout_ms: 500,
            graph_timeout_ms: 1000,
            embedding_timeout_ms: 5000,
        }
    }
}

/// §4.F circuit breaker parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    pub breaker_failure_threshold: u32,
    pub breaker_cooldown_ms: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            breaker_failure_threshold: 5,
            breaker_cooldown_ms: 30_000,
        }
    }
}

/// §4.J over-fetch factors and executor widths per search mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchTuningConfig {
    pub over_fetch_fast: usize,
    pub over_fetch_balanced: usize,
    pub over_fetch_thorough: usize,
    pub concurrency_fast: usize,
    pub concurrency_balanced: usize,
    pub concurrency_thorough: usize,
}

impl Default for SearchTuningConfig {
    fn default() -> Self {
        Self {
            over_fetch_fast: 1,
            over_fetch_balanced: 2,
            over_fetch_thorough: 4,
            concurrency_fast: 2,
            concurrency_balanced: 6,
            concurrency_thorough: 10,
        }
    }
}

/// Ambient logging configuration, carried regardless of the functional
/// Non-goals (observability is never scoped out).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// CLI-supplied overrides, applied last in the merge order (§6).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub qdrant_url: Option<String>,
    pub graph_url: Option<String>,
    pub log_level: Option<String>,
    pub embedding_dim: Option<usize>,
}

impl CoreConfig {
    /// Apply CLI overrides, which take precedence over any file-sourced value.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref url) = overrides.qdrant_url {
            self.backend.qdrant.url = url.clone();
        }
        if let Some(ref url) = overrides.graph_url {
            self.backend.graph.url = Some(url.clone());
        }
        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }
        if let Some(dim) = overrides.embedding_dim {
            self.embedding.embedding_dim = dim;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_values() {
        let config = CoreConfig::default();
        assert_eq!(config.embedding.embedding_dim, 1536);
        assert_eq!(config.timeouts.vector_timeout_ms, 500);
        assert_eq!(config.timeouts.graph_timeout_ms, 1000);
        assert_eq!(config.timeouts.embedding_timeout_ms, 5000);
        assert_eq!(config.search.over_fetch_fast, 1);
        assert_eq!(config.search.over_fetch_balanced, 2);
        assert_eq!(config.search.over_fetch_thorough, 4);
        assert_eq!(config.search.concurrency_fast, 2);
        assert_eq!(config.search.concurrency_balanced, 6);
        assert_eq!(config.search.concurrency_thorough, 10);
    }

    #[test]
    fn embedding_validate_requires_matching_settings() {
        let mut config = EmbeddingConfig {
            provider: EmbeddingProviderType::Openai,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        config.openai = Some(OpenAiSettings {
            api_key: "sk-test".to_string(),
            model: default_openai_model(),
            batch_size: default_batch_size(),
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn apply_overrides_replaces_only_supplied_fields() {
        let mut config = CoreConfig::default();
        let overrides = ConfigOverrides {
            qdrant_url: Some("http://cli:6334".to_string()),
            log_level: Some("trace".to_string()),
            ..Default::default()
        };
        config.apply_overrides(&overrides);
        assert_eq!(config.backend.qdrant.url, "http://cli:6334");
        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.embedding.embedding_dim, 1536);
    }

    #[test]
    fn serde_round_trips_through_toml() {
        let config = CoreConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: CoreConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
