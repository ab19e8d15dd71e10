//! In-process graph store backed by `codesearch_core::KnowledgeGraph`.
//!
//! The reference deployment and the one used in tests (grounded on the
//! teacher's `LocalBackend`, minus the file-system/Qdrant wiring that lived
//! there — this crate only owns the graph side of that split).

use async_trait::async_trait;
use parking_lot::RwLock;

use codesearch_core::{ComponentHealth, ExtractionRecord as CoreExtractionRecord, HealthCheckable, KnowledgeGraph, SignatureLookup};

use crate::error::GraphStoreError;
use crate::traits::GraphStore;

/// In-memory graph store, one `KnowledgeGraph` per process.
pub struct InMemoryGraphStore {
    graph: RwLock<KnowledgeGraph>,
}

impl InMemoryGraphStore {
    pub fn new(graph: KnowledgeGraph) -> Self {
        Self {
            graph: RwLock::new(graph),
        }
    }

    /// Mutate the underlying graph, e.g. to load fixtures in tests or to
    /// apply the (external) ingestion pipeline's output.
    pub fn with_graph_mut<R>(&self, f: impl FnOnce(&mut KnowledgeGraph) -> R) -> R {
        f(&mut self.graph.write())
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn exists(&self, repository_name: &str) -> Result<bool, GraphStoreError> {
        Ok(self.graph.read().repository_exists(repository_name))
    }

    async fn class_exists(
        &self,
        repository_name: &str,
        class_name: &str,
    ) -> Result<bool, GraphStoreError> {
        Ok(self.graph.read().class_exists(repository_name, class_name))
    }

    async fn method_exists(
        &self,
        repository_name: &str,
        class_name: &str,
        method_name: &str,
    ) -> Result<SignatureLookup, GraphStoreError> {
        Ok(self
            .graph
            .read()
            .method_exists(repository_name, class_name, method_name))
    }

    async fn function_exists(
        &self,
        repository_name: &str,
        function_name: &str,
    ) -> Result<SignatureLookup, GraphStoreError> {
        Ok(self
            .graph
            .read()
            .function_exists(repository_name, function_name))
    }

    async fn list_classes_methods_functions(
        &self,
        repository_name: &str,
    ) -> Result<Vec<CoreExtractionRecord>, GraphStoreError> {
        let graph = self.graph.read();
        if !graph.repository_exists(repository_name) {
            return Err(GraphStoreError::repository_not_found(repository_name));
        }
        Ok(graph.sweep(repository_name))
    }

    async fn method_names(
        &self,
        repository_name: &str,
        class_name: &str,
    ) -> Result<Vec<String>, GraphStoreError> {
        Ok(self.graph.read().method_names(repository_name, class_name))
    }

    async fn function_names(&self, repository_name: &str) -> Result<Vec<String>, GraphStoreError> {
        Ok(self.graph.read().function_names(repository_name))
    }
}

#[async_trait]
impl HealthCheckable for InMemoryGraphStore {
    async fn health(&self) -> ComponentHealth {
        ComponentHealth::healthy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codesearch_core::{Class, File, Method, Parameter};

    fn store_with_fixture() -> InMemoryGraphStore {
        let mut graph = KnowledgeGraph::new();
        let repo = graph.add_repository("acme/widgets");
        let file = graph.add_file(
            repo,
            File {
                path: "widgets/core.py".to_string(),
                module_name: "widgets.core".to_string(),
            },
        );
        let class = graph.add_class(
            "acme/widgets",
            file,
            Class {
                name: "Widget".to_string(),
                full_name: "Widget".to_string(),
                file_path: "widgets/core.py".to_string(),
            },
        );
        graph.add_method(
            "acme/widgets",
            "Widget",
            class,
            Method {
                name: "spin".to_string(),
                class_name: "Widget".to_string(),
                parameters: vec![Parameter::new("self", None)],
                return_type: None,
            },
        );
        InMemoryGraphStore::new(graph)
    }

    #[tokio::test]
    async fn canonical_queries_resolve_against_the_fixture() {
        let store = store_with_fixture();
        assert!(store.exists("acme/widgets").await.unwrap());
        assert!(!store.exists("acme/unknown").await.unwrap());
        assert!(store.class_exists("acme/widgets", "Widget").await.unwrap());
        let lookup = store
            .method_exists("acme/widgets", "Widget", "spin")
            .await
            .unwrap();
        assert!(lookup.found);
    }

    #[tokio::test]
    async fn sweep_on_unknown_repository_is_not_found() {
        let store = store_with_fixture();
        let err = store
            .list_classes_methods_functions("acme/unknown")
            .await
            .unwrap_err();
        assert!(matches!(err, GraphStoreError::RepositoryNotFound { .. }));
    }

    #[tokio::test]
    async fn sweep_projects_the_fixture_entities() {
        let store = store_with_fixture();
        let records = store
            .list_classes_methods_functions("acme/widgets")
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
    }
}
