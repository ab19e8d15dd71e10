//! Graph store trait definition (§4.C).
//!
//! Generalized from the teacher's `Backend` trait: the same "one trait, many
//! deployments" shape, narrowed to the five canonical queries this system
//! actually needs plus a health check.

use async_trait::async_trait;
use codesearch_core::{ExtractionRecord, HealthCheckable, SignatureLookup};

use crate::error::GraphStoreError;

/// Graph store for the knowledge graph built by the (external) ingestion
/// pipeline. Implementations must treat repository nodes as read-only (§3).
#[async_trait]
pub trait GraphStore: HealthCheckable {
    /// Canonical query 1: repository existence.
    async fn exists(&self, repository_name: &str) -> Result<bool, GraphStoreError>;

    /// Canonical query 2: class existence.
    async fn class_exists(
        &self,
        repository_name: &str,
        class_name: &str,
    ) -> Result<bool, GraphStoreError>;

    /// Canonical query 3: method existence with signature.
    async fn method_exists(
        &self,
        repository_name: &str,
        class_name: &str,
        method_name: &str,
    ) -> Result<SignatureLookup, GraphStoreError>;

    /// Canonical query 4: function existence with signature.
    async fn function_exists(
        &self,
        repository_name: &str,
        function_name: &str,
    ) -> Result<SignatureLookup, GraphStoreError>;

    /// Canonical query 5: extraction sweep, every Class/Method/Function in
    /// the repository with enough parent context to build a `CodeExample`.
    async fn list_classes_methods_functions(
        &self,
        repository_name: &str,
    ) -> Result<Vec<ExtractionRecord>, GraphStoreError>;

    /// Method names in scope, for edit-distance suggestions (§4.I).
    async fn method_names(
        &self,
        repository_name: &str,
        class_name: &str,
    ) -> Result<Vec<String>, GraphStoreError>;

    /// Function names in scope, for edit-distance suggestions (§4.I).
    async fn function_names(&self, repository_name: &str) -> Result<Vec<String>, GraphStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // the trait must stay object-safe: `GraphStoreRegistry` stores `Arc<dyn GraphStore>`
    fn _assert_object_safe(_: &dyn GraphStore) {}
}
