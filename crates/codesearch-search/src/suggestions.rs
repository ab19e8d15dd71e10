//! Vector-store-backed suggested corrections (§4.K step 4).
//!
//! Implements `codesearch_core::SuggestionSource` so the Hallucination
//! Detector in `codesearch-analyzer` can ask for similar indexed code
//! without depending on this crate, mirroring the `Validator` contract's
//! `codesearch-analyzer` → `codesearch-core` direction the other way round.

use std::sync::Arc;

use async_trait::async_trait;
use codesearch_core::{SuggestedExample, SuggestionSource};

use crate::embeddings::EmbeddingProvider;
use crate::schema::Filter;
use crate::store::VectorStore;

pub struct VectorSuggestionSource {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl VectorSuggestionSource {
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            vector_store,
            embedder,
        }
    }
}

#[async_trait]
impl SuggestionSource for VectorSuggestionSource {
    async fn suggest(&self, repository_name: &str, synopsis: &str, limit: usize) -> Vec<SuggestedExample> {
        let Ok(mut vectors) = self.embedder.embed(vec![synopsis.to_string()]).await else {
            return Vec::new();
        };
        let Some(vector) = vectors.pop() else {
            return Vec::new();
        };

        let filter = Filter::repository(repository_name);
        let hits = match self.vector_store.search(vector, limit, Some(filter)).await {
            Ok(hits) => hits,
            Err(_) => return Vec::new(),
        };

        hits.into_iter()
            .map(|hit| SuggestedExample {
                id: hit.id,
                full_name: hit.payload.full_name,
                summary: hit.payload.name,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::LocalProvider;
    use crate::in_memory::InMemoryVectorStore;
    use crate::schema::{CodeExample, EntityPayload};
    use codesearch_core::EntityKind;

    fn example() -> CodeExample {
        CodeExample {
            id: CodeExample::compute_id("acme/widgets", "a.py", "spin", EntityKind::Method),
            embedding: vec![1.0, 0.0, 0.0, 0.0],
            summary: "method Widget.spin".to_string(),
            payload: EntityPayload {
                repository_name: "acme/widgets".to_string(),
                file_path: "a.py".to_string(),
                module_name: "widgets.a".to_string(),
                kind: EntityKind::Method,
                name: "spin".to_string(),
                full_name: "Widget.spin".to_string(),
                class_name: Some("Widget".to_string()),
                parameters: Vec::new(),
                return_type: None,
                language: "python".to_string(),
                validation_status: "validated".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn suggests_indexed_examples_scoped_to_repository() {
        let store = Arc::new(InMemoryVectorStore::new());
        store.upsert(vec![example()]).await.unwrap();
        let source = VectorSuggestionSource::new(store, Arc::new(LocalProvider::new(4)));

        let suggestions = source.suggest("acme/widgets", "spin", 5).await;
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].full_name, "Widget.spin");
    }

    #[tokio::test]
    async fn unknown_repository_yields_no_suggestions() {
        let store = Arc::new(InMemoryVectorStore::new());
        store.upsert(vec![example()]).await.unwrap();
        let source = VectorSuggestionSource::new(store, Arc::new(LocalProvider::new(4)));

        let suggestions = source.suggest("other/repo", "spin", 5).await;
        assert!(suggestions.is_empty());
    }
}
