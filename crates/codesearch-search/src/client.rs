//! Qdrant-backed vector store (§4.B).
//!
//! Grounded on the teacher's `QdrantStore`, narrowed from the fixed
//! semantic/code dual-collection scheme to a single collection per this
//! spec's one-embedding-space model.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    point_id::PointIdOptions, vectors_config::Config, Condition, CreateCollectionBuilder,
    CreateFieldIndexCollectionBuilder, DeletePointsBuilder, Distance, FieldType, Filter as QdrantFilter,
    PointStruct, ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder, VectorParams,
    VectorsConfig,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::json;
use tracing::{debug, info};

use codesearch_core::{Admission, CircuitBreaker, ComponentHealth, HealthCheckable};

use crate::error::{Result, SearchError};
use crate::schema::{fields, CodeExample, EntityPayload, Filter, SearchHit, COLLECTION};
use crate::store::VectorStore;

/// Configuration for connecting to Qdrant.
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub embedding_dim: u64,
    pub timeout_secs: u64,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            embedding_dim: 1536,
            timeout_secs: 30,
        }
    }
}

impl QdrantConfig {
    pub fn local() -> Self {
        Self::default()
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

pub struct QdrantVectorStore {
    client: Qdrant,
    breaker: Arc<CircuitBreaker>,
}

/// Qdrant requires point ids to be an unsigned integer or a UUID; our ids
/// are 32 lowercase hex chars (§6), which is a valid UUID once hyphenated.
fn hex32_to_uuid(id: &str) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        &id[0..8],
        &id[8..12],
        &id[12..16],
        &id[16..20],
        &id[20..32]
    )
}

fn uuid_to_hex32(uuid: &str) -> String {
    uuid.chars().filter(|c| *c != '-').collect()
}

impl QdrantVectorStore {
    /// `breaker` is this dependency's own circuit breaker (§4.F: "one
    /// instance per dependency"), admitted/recorded around every call below.
    pub async fn connect(config: QdrantConfig, breaker: Arc<CircuitBreaker>) -> Result<Self> {
        info!("connecting to Qdrant at {}", config.url);
        let mut builder = Qdrant::from_url(&config.url).timeout(Duration::from_secs(config.timeout_secs.max(1)));
        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }
        let client = builder
            .build()
            .map_err(|e| SearchError::Connection(e.to_string()))?;
        client
            .list_collections()
            .await
            .map_err(|e| SearchError::Connection(e.to_string()))?;

        let store = Self { client, breaker };
        store.ensure_collection(config.embedding_dim).await?;
        Ok(store)
    }

    /// §4.F: admit the call against this dependency's breaker, then record
    /// its outcome. Expired deadlines (the Qdrant client's own per-call
    /// timeout, set in `connect`) surface as `Err` and count as failures,
    /// same as any other dependency error (§5).
    async fn guarded<T, Fut>(&self, op: impl FnOnce() -> Fut) -> Result<T>
    where
        Fut: std::future::Future<Output = Result<T>>,
    {
        if self.breaker.admit() == Admission::Rejected {
            return Err(SearchError::Qdrant("circuit breaker open".to_string()));
        }
        let result = op().await;
        match &result {
            Ok(_) => self.breaker.record_success(),
            Err(_) => self.breaker.record_failure(),
        }
        result
    }

    async fn ensure_collection(&self, embedding_dim: u64) -> Result<()> {
        if self.client.collection_exists(COLLECTION).await? {
            return Ok(());
        }
        info!("creating collection '{COLLECTION}' (dim={embedding_dim})");
        let vectors_config = VectorsConfig {
            config: Some(Config::Params(VectorParams {
                size: embedding_dim,
                distance: Distance::Cosine.into(),
                ..Default::default()
            })),
        };
        self.client
            .create_collection(CreateCollectionBuilder::new(COLLECTION).vectors_config(vectors_config))
            .await?;

        for field in [
            fields::REPOSITORY_NAME,
            fields::FILE_PATH,
            fields::MODULE_NAME,
            fields::KIND,
            fields::NAME,
            fields::FULL_NAME,
            fields::CLASS_NAME,
            fields::LANGUAGE,
            fields::VALIDATION_STATUS,
        ] {
            self.client
                .create_field_index(CreateFieldIndexCollectionBuilder::new(
                    COLLECTION,
                    field,
                    FieldType::Keyword,
                ))
                .await?;
        }
        Ok(())
    }

    fn to_qdrant_filter(filter: &Filter) -> QdrantFilter {
        let conditions: Vec<Condition> = filter
            .equals
            .iter()
            .map(|(field, value)| Condition::matches(field.clone(), value.clone()))
            .collect();
        QdrantFilter::must(conditions)
    }

    fn payload_to_entity(payload: &qdrant_client::Payload) -> EntityPayload {
        let map: std::collections::HashMap<String, qdrant_client::qdrant::Value> = payload.clone().into();
        let get_string = |key: &str| -> String {
            map.get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .unwrap_or_default()
        };
        let get_opt_string =
            |key: &str| -> Option<String> { map.get(key).and_then(|v| v.as_str()).map(|s| s.to_string()) };
        let kind = match get_string(fields::KIND).as_str() {
            "class" => codesearch_core::EntityKind::Class,
            "method" => codesearch_core::EntityKind::Method,
            _ => codesearch_core::EntityKind::Function,
        };
        EntityPayload {
            repository_name: get_string(fields::REPOSITORY_NAME),
            file_path: get_string(fields::FILE_PATH),
            module_name: get_string(fields::MODULE_NAME),
            kind,
            name: get_string(fields::NAME),
            full_name: get_string(fields::FULL_NAME),
            class_name: get_opt_string(fields::CLASS_NAME),
            parameters: map
                .get("parameters")
                .and_then(|v| serde_json::to_value(v).ok())
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default(),
            return_type: get_opt_string("return_type"),
            language: get_string(fields::LANGUAGE),
            validation_status: get_string(fields::VALIDATION_STATUS),
        }
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn upsert(&self, points: Vec<CodeExample>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        debug!("upserting {} points", points.len());
        let qdrant_points: Vec<PointStruct> = points
            .into_iter()
            .map(|p| {
                let payload = Payload::try_from(json!({
                    fields::REPOSITORY_NAME: p.payload.repository_name,
                    fields::FILE_PATH: p.payload.file_path,
                    fields::MODULE_NAME: p.payload.module_name,
                    fields::KIND: p.payload.kind.as_str(),
                    fields::NAME: p.payload.name,
                    fields::FULL_NAME: p.payload.full_name,
                    fields::CLASS_NAME: p.payload.class_name,
                    "parameters": p.payload.parameters,
                    "return_type": p.payload.return_type,
                    fields::LANGUAGE: p.payload.language,
                    fields::VALIDATION_STATUS: p.payload.validation_status,
                    "summary": p.summary,
                }))
                .expect("payload is valid json");
                PointStruct::new(hex32_to_uuid(&p.id), p.embedding, payload)
            })
            .collect();

        self.guarded(|| async {
            self.client
                .upsert_points(UpsertPointsBuilder::new(COLLECTION, qdrant_points).wait(true))
                .await?;
            Ok(())
        })
        .await
    }

    async fn search(&self, vector: Vec<f32>, top_k: usize, filter: Option<Filter>) -> Result<Vec<SearchHit>> {
        self.guarded(|| async {
            let mut builder = SearchPointsBuilder::new(COLLECTION, vector, top_k as u64).with_payload(true);
            if let Some(filter) = &filter {
                builder = builder.filter(Self::to_qdrant_filter(filter));
            }
            let response = self.client.search_points(builder).await?;

            let mut hits: Vec<SearchHit> = response
                .result
                .into_iter()
                .filter_map(|point| {
                    let id = match point.id?.point_id_options? {
                        PointIdOptions::Uuid(u) => uuid_to_hex32(&u),
                        PointIdOptions::Num(n) => n.to_string(),
                    };
                    Some(SearchHit {
                        id,
                        score: (point.score + 1.0) / 2.0,
                        payload: Self::payload_to_entity(&point.payload.into()),
                    })
                })
                .collect();
            hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
            Ok(hits)
        })
        .await
    }

    async fn scroll(&self, filter: Filter) -> Result<Vec<CodeExample>> {
        self.guarded(|| async {
            let response = self
                .client
                .scroll(
                    ScrollPointsBuilder::new(COLLECTION)
                        .filter(Self::to_qdrant_filter(&filter))
                        .with_payload(true)
                        .with_vectors(true),
                )
                .await?;

            Ok(response
                .result
                .into_iter()
                .filter_map(|point| {
                    let id = match point.id?.point_id_options? {
                        PointIdOptions::Uuid(u) => uuid_to_hex32(&u),
                        PointIdOptions::Num(n) => n.to_string(),
                    };
                    let payload = Self::payload_to_entity(&point.payload.into());
                    let embedding = match point.vectors?.vectors_options? {
                        qdrant_client::qdrant::vectors_output::VectorsOptions::Vector(v) => {
                            match v.into_vector() {
                                qdrant_client::qdrant::vector_output::Vector::Dense(d) => d.data,
                                _ => Vec::new(),
                            }
                        }
                        _ => Vec::new(),
                    };
                    Some(CodeExample {
                        id,
                        embedding,
                        summary: String::new(),
                        payload,
                    })
                })
                .collect())
        })
        .await
    }

    async fn delete(&self, filter: Filter) -> Result<usize> {
        let count = self.count(filter.clone()).await?;
        self.guarded(|| async {
            self.client
                .delete_points(
                    DeletePointsBuilder::new(COLLECTION)
                        .points(Self::to_qdrant_filter(&filter))
                        .wait(true),
                )
                .await?;
            Ok(())
        })
        .await?;
        Ok(count)
    }

    async fn count(&self, filter: Filter) -> Result<usize> {
        self.guarded(|| async {
            let response = self
                .client
                .count(qdrant_client::qdrant::CountPointsBuilder::new(COLLECTION).filter(Self::to_qdrant_filter(&filter)))
                .await?;
            Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
        })
        .await
    }
}

#[async_trait]
impl HealthCheckable for QdrantVectorStore {
    async fn health(&self) -> ComponentHealth {
        match self.client.health_check().await {
            Ok(_) => ComponentHealth::healthy(),
            Err(e) => ComponentHealth::unreachable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex32_uuid_roundtrips() {
        let id = "0123456789abcdef0123456789abcdef";
        let uuid = hex32_to_uuid(id);
        assert_eq!(uuid_to_hex32(&uuid), id);
    }
}
