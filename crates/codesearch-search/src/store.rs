//! Vector store trait (§4.B).

use async_trait::async_trait;
use codesearch_core::HealthCheckable;

use crate::error::Result;
use crate::schema::{CodeExample, Filter, SearchHit};

/// Upsert/search/scroll/delete/count over a fixed-dimension collection of
/// `CodeExample`s (§4.B). Implementations enforce `embedding_dim` at
/// collection creation; a dimension mismatch on upsert is a fatal
/// programming error, not a recoverable `Result::Err`.
#[async_trait]
pub trait VectorStore: HealthCheckable {
    /// Idempotent by id, batch-friendly.
    async fn upsert(&self, points: Vec<CodeExample>) -> Result<()>;

    /// Descending score, ties broken by id ascending.
    async fn search(&self, vector: Vec<f32>, top_k: usize, filter: Option<Filter>) -> Result<Vec<SearchHit>>;

    /// All payloads matching `filter`.
    async fn scroll(&self, filter: Filter) -> Result<Vec<CodeExample>>;

    async fn delete(&self, filter: Filter) -> Result<usize>;

    async fn count(&self, filter: Filter) -> Result<usize>;
}
