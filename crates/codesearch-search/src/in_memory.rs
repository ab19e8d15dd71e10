//! In-memory vector store used by tests and offline operation.
//!
//! Grounded on the same "keep a reference in-process backend alongside the
//! real client" idiom as `codesearch-graph::InMemoryGraphStore`.

use async_trait::async_trait;
use parking_lot::RwLock;

use codesearch_core::{ComponentHealth, HealthCheckable};

use crate::error::Result;
use crate::schema::{CodeExample, Filter, SearchHit};
use crate::store::VectorStore;

#[derive(Default)]
pub struct InMemoryVectorStore {
    points: RwLock<Vec<CodeExample>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        // map cosine similarity [-1,1] into the spec's [0,1] score range
        ((dot / (norm_a * norm_b)) + 1.0) / 2.0
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, new_points: Vec<CodeExample>) -> Result<()> {
        let mut points = self.points.write();
        for point in new_points {
            if let Some(existing) = points.iter_mut().find(|p| p.id == point.id) {
                *existing = point;
            } else {
                points.push(point);
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        filter: Option<Filter>,
    ) -> Result<Vec<SearchHit>> {
        let points = self.points.read();
        let mut hits: Vec<SearchHit> = points
            .iter()
            .filter(|p| filter.as_ref().is_none_or(|f| f.matches(&p.payload)))
            .map(|p| SearchHit {
                id: p.id.clone(),
                score: cosine_similarity(&vector, &p.embedding),
                payload: p.payload.clone(),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn scroll(&self, filter: Filter) -> Result<Vec<CodeExample>> {
        Ok(self
            .points
            .read()
            .iter()
            .filter(|p| filter.matches(&p.payload))
            .cloned()
            .collect())
    }

    async fn delete(&self, filter: Filter) -> Result<usize> {
        let mut points = self.points.write();
        let before = points.len();
        points.retain(|p| !filter.matches(&p.payload));
        Ok(before - points.len())
    }

    async fn count(&self, filter: Filter) -> Result<usize> {
        Ok(self
            .points
            .read()
            .iter()
            .filter(|p| filter.matches(&p.payload))
            .count())
    }
}

#[async_trait]
impl HealthCheckable for InMemoryVectorStore {
    async fn health(&self) -> ComponentHealth {
        ComponentHealth::healthy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codesearch_core::EntityKind;
    use crate::schema::EntityPayload;

    fn sample(id: &str, repository_name: &str, embedding: Vec<f32>) -> CodeExample {
        CodeExample {
            id: id.to_string(),
            embedding,
            summary: "summary".to_string(),
            payload: EntityPayload {
                repository_name: repository_name.to_string(),
                file_path: "a.py".to_string(),
                module_name: "a".to_string(),
                kind: EntityKind::Function,
                name: "f".to_string(),
                full_name: "f".to_string(),
                class_name: None,
                parameters: Vec::new(),
                return_type: None,
                language: "python".to_string(),
                validation_status: "validated".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent_by_id() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(vec![sample("a", "r", vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .upsert(vec![sample("a", "r", vec![0.0, 1.0])])
            .await
            .unwrap();
        let count = store.count(Filter::repository("r")).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn search_orders_by_descending_score() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(vec![
                sample("far", "r", vec![0.0, 1.0]),
                sample("near", "r", vec![1.0, 0.0]),
            ])
            .await
            .unwrap();
        let hits = store.search(vec![1.0, 0.0], 10, None).await.unwrap();
        assert_eq!(hits[0].id, "near");
    }

    #[tokio::test]
    async fn delete_removes_matching_points_only() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(vec![sample("a", "r1", vec![1.0]), sample("b", "r2", vec![1.0])])
            .await
            .unwrap();
        let removed = store.delete(Filter::repository("r1")).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.count(Filter::new()).await.unwrap(), 1);
    }
}
