//! Health monitor (§4.L).
//!
//! Aggregates the status of the vector store, graph store, and validation
//! cache. Stores implement the small `HealthCheckable` trait defined here
//! rather than this crate depending on `codesearch-graph`/`codesearch-search`
//! directly, avoiding a dependency cycle (mirrors the teacher's
//! `Backend::health_check` returning a plain bool, generalized to a status
//! struct per component).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cache::ValidationCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Healthy,
    Degraded,
    Unreachable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: Status,
    pub detail: Option<String>,
}

impl ComponentHealth {
    pub fn healthy() -> Self {
        Self {
            status: Status::Healthy,
            detail: None,
        }
    }

    pub fn unreachable(detail: impl Into<String>) -> Self {
        Self {
            status: Status::Unreachable,
            detail: Some(detail.into()),
        }
    }

    pub fn degraded(detail: impl Into<String>) -> Self {
        Self {
            status: Status::Degraded,
            detail: Some(detail.into()),
        }
    }
}

/// Implemented by the vector store and graph store clients so `HealthMonitor`
/// can aggregate them without depending on either crate.
#[async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health(&self) -> ComponentHealth;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub vector: ComponentHealth,
    pub graph: ComponentHealth,
    pub cache_hit_rate: f64,
    pub overall: Status,
}

pub struct HealthMonitor;

impl HealthMonitor {
    /// §4.L: overall is `healthy` iff both stores report healthy and the
    /// cache hit rate is non-negative (a sanity check rather than a real
    /// threshold). A degraded vector store makes overall `degraded`; a
    /// degraded graph store alone also yields `degraded` since the engine
    /// can still serve semantic-only results.
    pub async fn status(
        vector: &dyn HealthCheckable,
        graph: &dyn HealthCheckable,
        cache: &ValidationCache,
    ) -> HealthReport {
        let vector_health = vector.health().await;
        let graph_health = graph.health().await;
        let hit_rate = cache.stats().hit_rate();

        let overall = if hit_rate >= 0.0
            && vector_health.status == Status::Healthy
            && graph_health.status == Status::Healthy
        {
            Status::Healthy
        } else {
            Status::Degraded
        };

        HealthReport {
            vector: vector_health,
            graph: graph_health,
            cache_hit_rate: hit_rate,
            overall,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Fixed(ComponentHealth);

    #[async_trait]
    impl HealthCheckable for Fixed {
        async fn health(&self) -> ComponentHealth {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn healthy_when_both_stores_are_healthy() {
        let cache = ValidationCache::new(4, Duration::from_secs(60));
        let report = HealthMonitor::status(
            &Fixed(ComponentHealth::healthy()),
            &Fixed(ComponentHealth::healthy()),
            &cache,
        )
        .await;
        assert_eq!(report.overall, Status::Healthy);
    }

    #[tokio::test]
    async fn degraded_when_graph_alone_is_down() {
        let cache = ValidationCache::new(4, Duration::from_secs(60));
        let report = HealthMonitor::status(
            &Fixed(ComponentHealth::healthy()),
            &Fixed(ComponentHealth::unreachable("graph down")),
            &cache,
        )
        .await;
        assert_eq!(report.overall, Status::Degraded);
    }

    #[tokio::test]
    async fn degraded_when_vector_store_is_down() {
        let cache = ValidationCache::new(4, Duration::from_secs(60));
        let report = HealthMonitor::status(
            &Fixed(ComponentHealth::unreachable("vector down")),
            &Fixed(ComponentHealth::healthy()),
            &cache,
        )
        .await;
        assert_eq!(report.overall, Status::Degraded);
    }
}
