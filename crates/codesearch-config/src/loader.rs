//! Configuration loader with inheritance support.
//!
//! Loads configuration from multiple sources and merges them:
//! 1. Global config: `~/.codesearch/config.toml`
//! 2. Local config: `.codesearch/config.toml` (in the workspace directory)
//! 3. CLI overrides
//!
//! Later sources override earlier ones.

use crate::error::ConfigError;
use crate::{ConfigOverrides, CoreConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

const CONFIG_FILE_NAME: &str = "config.toml";
const GLOBAL_CONFIG_DIR: &str = ".codesearch";
const LOCAL_CONFIG_DIR: &str = ".codesearch";

/// Configuration loader with caching and inheritance support.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory (e.g., `~/.codesearch`)
    global_config_dir: Option<PathBuf>,

    /// Cached global config
    global_config: Option<CoreConfig>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// Automatically detects the global config directory (`~/.codesearch`).
    pub fn new() -> Self {
        let global_config_dir = dirs::home_dir().map(|h| h.join(GLOBAL_CONFIG_DIR));

        Self {
            global_config_dir,
            global_config: None,
        }
    }

    /// Create a loader with a custom global config directory.
    ///
    /// Useful for testing.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir: Some(global_dir.into()),
            global_config: None,
        }
    }

    /// Get the global config file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Get the local config file path for a workspace.
    pub fn local_config_path(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(LOCAL_CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Load configuration for a workspace with optional CLI overrides.
    ///
    /// Merges config in order: global → local → overrides.
    pub fn load(
        &mut self,
        workspace_root: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<CoreConfig, ConfigError> {
        let mut config = CoreConfig::default();

        if let Some(global_config) = self.load_global()? {
            config = merge_configs(config, global_config);
        }

        if let Some(local_config) = self.load_local(workspace_root)? {
            config = merge_configs(config, local_config);
        }

        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        config
            .embedding
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(config)
    }

    /// Load only the global configuration.
    pub fn load_global(&mut self) -> Result<Option<CoreConfig>, ConfigError> {
        if let Some(ref config) = self.global_config {
            return Ok(Some(config.clone()));
        }

        let Some(global_path) = self.global_config_path() else {
            debug!("No home directory found, skipping global config");
            return Ok(None);
        };

        if !global_path.exists() {
            trace!("Global config not found at {:?}", global_path);
            return Ok(None);
        }

        debug!("Loading global config from {:?}", global_path);
        let config = load_config_file(&global_path)?;

        self.global_config = Some(config.clone());

        Ok(Some(config))
    }

    /// Load only the local configuration for a workspace.
    pub fn load_local(&self, workspace_root: &Path) -> Result<Option<CoreConfig>, ConfigError> {
        let local_path = self.local_config_path(workspace_root);

        if !local_path.exists() {
            trace!("Local config not found at {:?}", local_path);
            return Ok(None);
        }

        debug!("Loading local config from {:?}", local_path);
        load_config_file(&local_path).map(Some)
    }

    /// Save configuration to the global config file.
    pub fn save_global(&self, config: &CoreConfig) -> Result<(), ConfigError> {
        let Some(ref global_dir) = self.global_config_dir else {
            return Err(ConfigError::NoHomeDir);
        };

        let global_path = global_dir.join(CONFIG_FILE_NAME);
        save_config_file(&global_path, config)
    }

    /// Save configuration to the local config file for a workspace.
    pub fn save_local(&self, workspace_root: &Path, config: &CoreConfig) -> Result<(), ConfigError> {
        let local_path = self.local_config_path(workspace_root);
        save_config_file(&local_path, config)
    }

    /// Initialize global configuration directory.
    ///
    /// Creates `~/.codesearch/config.toml` with default configuration.
    pub fn init_global(&self) -> Result<PathBuf, ConfigError> {
        let Some(ref global_dir) = self.global_config_dir else {
            return Err(ConfigError::NoHomeDir);
        };

        if !global_dir.exists() {
            std::fs::create_dir_all(global_dir)
                .map_err(|e| ConfigError::create_dir(global_dir, e))?;
        }

        let config_path = global_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            let default_config = CoreConfig::default();
            save_config_file(&config_path, &default_config)?;
        }

        Ok(config_path)
    }

    /// Initialize local configuration for a workspace.
    ///
    /// Creates `.codesearch/config.toml` with default configuration.
    pub fn init_local(&self, workspace_root: &Path) -> Result<PathBuf, ConfigError> {
        let local_dir = workspace_root.join(LOCAL_CONFIG_DIR);

        if !local_dir.exists() {
            std::fs::create_dir_all(&local_dir)
                .map_err(|e| ConfigError::create_dir(&local_dir, e))?;
        }

        let config_path = local_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            let default_config = CoreConfig::default();
            save_config_file(&config_path, &default_config)?;
        }

        Ok(config_path)
    }

    /// Clear cached global configuration.
    ///
    /// Forces reload on next `load_global()` call.
    pub fn clear_cache(&mut self) {
        self.global_config = None;
    }
}

/// Load a configuration file from disk.
fn load_config_file(path: &Path) -> Result<CoreConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    toml::from_str(&content).map_err(|e| ConfigError::parse_toml(path, e))
}

/// Save a configuration file to disk.
fn save_config_file(path: &Path, config: &CoreConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
}

/// Merge two configurations, with `overlay` taking precedence.
///
/// This performs a field-by-field merge, allowing partial configs.
fn merge_configs(base: CoreConfig, overlay: CoreConfig) -> CoreConfig {
    CoreConfig {
        embedding: merge_embedding(base.embedding, overlay.embedding),
        backend: merge_backend(base.backend, overlay.backend),
        cache: merge_cache(base.cache, overlay.cache),
        timeouts: merge_timeouts(base.timeouts, overlay.timeouts),
        breaker: merge_breaker(base.breaker, overlay.breaker),
        search: merge_search(base.search, overlay.search),
        logging: merge_logging(base.logging, overlay.logging),
    }
}

fn merge_embedding(
    base: crate::EmbeddingConfig,
    overlay: crate::EmbeddingConfig,
) -> crate::EmbeddingConfig {
    let default_dim = crate::EmbeddingConfig::default().embedding_dim;
    crate::EmbeddingConfig {
        provider: if overlay.provider != crate::EmbeddingProviderType::Local {
            overlay.provider
        } else {
            base.provider
        },
        embedding_dim: if overlay.embedding_dim != default_dim {
            overlay.embedding_dim
        } else {
            base.embedding_dim
        },
        azure_ml: overlay.azure_ml.or(base.azure_ml),
        openai: overlay.openai.or(base.openai),
    }
}

fn merge_backend(base: crate::BackendConfig, overlay: crate::BackendConfig) -> crate::BackendConfig {
    crate::BackendConfig {
        qdrant: merge_qdrant(base.qdrant, overlay.qdrant),
        graph: crate::GraphConfig {
            url: overlay.graph.url.or(base.graph.url),
        },
    }
}

fn merge_qdrant(base: crate::QdrantConfig, overlay: crate::QdrantConfig) -> crate::QdrantConfig {
    let default = crate::QdrantConfig::default();
    crate::QdrantConfig {
        url: if overlay.url != default.url {
            overlay.url
        } else {
            base.url
        },
        api_key: overlay.api_key.or(base.api_key),
        collection_prefix: if overlay.collection_prefix != default.collection_prefix {
            overlay.collection_prefix
        } else {
            base.collection_prefix
        },
    }
}

fn merge_cache(base: crate::CacheConfig, overlay: crate::CacheConfig) -> crate::CacheConfig {
    let default = crate::CacheConfig::default();
    crate::CacheConfig {
        cache_max_entries: if overlay.cache_max_entries != default.cache_max_entries {
            overlay.cache_max_entries
        } else {
            base.cache_max_entries
        },
        cache_ttl_secs: if overlay.cache_ttl_secs != default.cache_ttl_secs {
            overlay.cache_ttl_secs
        } else {
            base.cache_ttl_secs
        },
    }
}

fn merge_timeouts(base: crate::TimeoutConfig, overlay: crate::TimeoutConfig) -> crate::TimeoutConfig {
    let default = crate::TimeoutConfig::default();
    crate::TimeoutConfig {
        vector_timeout_ms: if overlay.vector_timeout_ms != default.vector_timeout_ms {
            overlay.vector_timeout_ms
        } else {
            base.vector_timeout_ms
        },
        graph_timeout_ms: if overlay.graph_timeout_ms != default.graph_timeout_ms {
            overlay.graph_timeout_ms
        } else {
            base.graph_timeout_ms
        },
        embedding_timeout_ms: if overlay.embedding_timeout_ms != default.embedding_timeout_ms {
            overlay.embedding_timeout_ms
        } else {
            base.embedding_timeout_ms
        },
    }
}

fn merge_breaker(base: crate::BreakerConfig, overlay: crate::BreakerConfig) -> crate::BreakerConfig {
    let default = crate::BreakerConfig::default();
    crate::BreakerConfig {
        breaker_failure_threshold: if overlay.breaker_failure_threshold
            != default.breaker_failure_threshold
        {
            overlay.breaker_failure_threshold
        } else {
            base.breaker_failure_threshold
        },
        breaker_cooldown_ms: if overlay.breaker_cooldown_ms != default.breaker_cooldown_ms {
            overlay.breaker_cooldown_ms
        } else {
            base.breaker_cooldown_ms
        },
    }
}

fn merge_search(
    base: crate::SearchTuningConfig,
    overlay: crate::SearchTuningConfig,
) -> crate::SearchTuningConfig {
    let default = crate::SearchTuningConfig::default();
    crate::SearchTuningConfig {
        over_fetch_fast: pick(overlay.over_fetch_fast, base.over_fetch_fast, default.over_fetch_fast),
        over_fetch_balanced: pick(
            overlay.over_fetch_balanced,
            base.over_fetch_balanced,
            default.over_fetch_balanced,
        ),
        over_fetch_thorough: pick(
            overlay.over_fetch_thorough,
            base.over_fetch_thorough,
            default.over_fetch_thorough,
        ),
        concurrency_fast: pick(
            overlay.concurrency_fast,
            base.concurrency_fast,
            default.concurrency_fast,
        ),
        concurrency_balanced: pick(
            overlay.concurrency_balanced,
            base.concurrency_balanced,
            default.concurrency_balanced,
        ),
        concurrency_thorough: pick(
            overlay.concurrency_thorough,
            base.concurrency_thorough,
            default.concurrency_thorough,
        ),
    }
}

fn pick(overlay: usize, base: usize, default: usize) -> usize {
    if overlay != default {
        overlay
    } else {
        base
    }
}

fn merge_logging(base: crate::LoggingConfig, overlay: crate::LoggingConfig) -> crate::LoggingConfig {
    crate::LoggingConfig {
        level: if overlay.level != "info" {
            overlay.level
        } else {
            base.level
        },
        format: overlay.format,
        file: overlay.file.or(base.file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config(content: &str, dir: &Path, filename: &str) -> PathBuf {
        let config_dir = dir.join(".codesearch");
        std::fs::create_dir_all(&config_dir).unwrap();
        let path = config_dir.join(filename);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_default_config() {
        let temp = TempDir::new().unwrap();
        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(config.backend.qdrant.url, "http://localhost:6334");
        assert_eq!(config.embedding.embedding_dim, 1536);
    }

    #[test]
    fn test_load_local_config() {
        let temp = TempDir::new().unwrap();
        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        create_test_config(
            r#"
            [embedding]
            embedding_dim = 384

            [backend.qdrant]
            url = "http://custom:6334"
            "#,
            temp.path(),
            "config.toml",
        );

        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(config.embedding.embedding_dim, 384);
        assert_eq!(config.backend.qdrant.url, "http://custom:6334");
    }

    #[test]
    fn test_global_overrides_default() {
        let temp = TempDir::new().unwrap();
        let global_dir = temp.path().join("global");

        std::fs::create_dir_all(&global_dir).unwrap();
        std::fs::write(
            global_dir.join("config.toml"),
            r#"
            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        let mut loader = ConfigLoader::with_global_dir(&global_dir);
        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_local_overrides_global() {
        let temp = TempDir::new().unwrap();
        let global_dir = temp.path().join("global");

        std::fs::create_dir_all(&global_dir).unwrap();
        std::fs::write(
            global_dir.join("config.toml"),
            r#"
            [logging]
            level = "debug"

            [backend.qdrant]
            url = "http://global:6334"
            "#,
        )
        .unwrap();

        create_test_config(
            r#"
            [backend.qdrant]
            url = "http://local:6334"
            "#,
            temp.path(),
            "config.toml",
        );

        let mut loader = ConfigLoader::with_global_dir(&global_dir);
        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(config.backend.qdrant.url, "http://local:6334");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_cli_overrides_all() {
        let temp = TempDir::new().unwrap();

        create_test_config(
            r#"
            [backend.qdrant]
            url = "http://local:6334"
            "#,
            temp.path(),
            "config.toml",
        );

        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let overrides = ConfigOverrides {
            qdrant_url: Some("http://cli:6334".to_string()),
            log_level: Some("trace".to_string()),
            ..Default::default()
        };

        let config = loader.load(temp.path(), Some(&overrides)).unwrap();

        assert_eq!(config.backend.qdrant.url, "http://cli:6334");
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn test_save_and_load_config() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let mut config = CoreConfig::default();
        config.backend.qdrant.url = "http://saved:6334".to_string();
        config.logging.level = "warn".to_string();

        loader.save_local(temp.path(), &config).unwrap();

        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));
        let loaded = loader.load(temp.path(), None).unwrap();

        assert_eq!(loaded.backend.qdrant.url, "http://saved:6334");
        assert_eq!(loaded.logging.level, "warn");
    }

    #[test]
    fn test_init_local_creates_config() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let config_path = loader.init_local(temp.path()).unwrap();

        assert!(config_path.exists());
        assert!(config_path.ends_with(".codesearch/config.toml"));

        let content = std::fs::read_to_string(&config_path).unwrap();
        let _: CoreConfig = toml::from_str(&content).unwrap();
    }

    #[test]
    fn test_cache_clearing() {
        let temp = TempDir::new().unwrap();
        let global_dir = temp.path().join("global");

        std::fs::create_dir_all(&global_dir).unwrap();
        std::fs::write(
            global_dir.join("config.toml"),
            r#"
            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        let mut loader = ConfigLoader::with_global_dir(&global_dir);

        let _ = loader.load_global().unwrap();
        assert!(loader.global_config.is_some());

        loader.clear_cache();
        assert!(loader.global_config.is_none());
    }
}
