//! Remote graph store over HTTP.
//!
//! Generalizes the teacher's `RemoteBackend` stub into a working
//! implementation: each canonical query is POSTed as a small JSON-RPC-shaped
//! request (`{"query": "...", "parameters": {...}}`), matching §4.C's
//! requirement that parameters are passed separately, never concatenated
//! into the query string.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use codesearch_core::{ComponentHealth, ExtractionRecord, HealthCheckable, SignatureLookup};

use crate::error::GraphStoreError;
use crate::traits::GraphStore;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// Graph store backed by an HTTP server exposing the five canonical
/// queries under `POST {base_url}/query`.
pub struct HttpGraphStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGraphStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("reqwest client configuration is valid"),
        }
    }

    async fn query<T: for<'de> Deserialize<'de>>(
        &self,
        name: &str,
        parameters: serde_json::Value,
    ) -> Result<T, GraphStoreError> {
        let response = self
            .client
            .post(format!("{}/query", self.base_url))
            .json(&QueryRequest {
                query: name,
                parameters,
            })
            .send()
            .await
            .map_err(|e| GraphStoreError::connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GraphStoreError::remote_server(status.as_u16(), body));
        }

        let parsed: QueryResponse<T> = response
            .json()
            .await
            .map_err(|e| GraphStoreError::connection(e.to_string()))?;
        Ok(parsed.result)
    }
}

#[async_trait]
impl GraphStore for HttpGraphStore {
    async fn exists(&self, repository_name: &str) -> Result<bool, GraphStoreError> {
        self.query("exists", json!({ "repository_name": repository_name }))
            .await
    }

    async fn class_exists(
        &self,
        repository_name: &str,
        class_name: &str,
    ) -> Result<bool, GraphStoreError> {
        self.query(
            "class_exists",
            json!({ "repository_name": repository_name, "class_name": class_name }),
        )
        .await
    }

    async fn method_exists(
        &self,
        repository_name: &str,
        class_name: &str,
        method_name: &str,
    ) -> Result<SignatureLookup, GraphStoreError> {
        self.query(
            "method_exists",
            json!({
                "repository_name": repository_name,
                "class_name": class_name,
                "method_name": method_name,
            }),
        )
        .await
    }

    async fn function_exists(
        &self,
        repository_name: &str,
        function_name: &str,
    ) -> Result<SignatureLookup, GraphStoreError> {
        self.query(
            "function_exists",
            json!({ "repository_name": repository_name, "function_name": function_name }),
        )
        .await
    }

    async fn list_classes_methods_functions(
        &self,
        repository_name: &str,
    ) -> Result<Vec<ExtractionRecord>, GraphStoreError> {
        self.query(
            "list_classes_methods_functions",
            json!({ "repository_name": repository_name }),
        )
        .await
    }

    async fn method_names(
        &self,
        repository_name: &str,
        class_name: &str,
    ) -> Result<Vec<String>, GraphStoreError> {
        self.query(
            "method_names",
            json!({ "repository_name": repository_name, "class_name": class_name }),
        )
        .await
    }

    async fn function_names(&self, repository_name: &str) -> Result<Vec<String>, GraphStoreError> {
        self.query(
            "function_names",
            json!({ "repository_name": repository_name }),
        )
        .await
    }
}

#[async_trait]
impl HealthCheckable for HttpGraphStore {
    async fn health(&self) -> ComponentHealth {
        match self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => ComponentHealth::healthy(),
            Ok(resp) => ComponentHealth::degraded(format!("status {}", resp.status())),
            Err(e) => ComponentHealth::unreachable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_has_no_trailing_slash_assumption_issue() {
        let store = HttpGraphStore::new("http://localhost:9000", Duration::from_millis(1000));
        assert_eq!(store.base_url, "http://localhost:9000");
    }
}
