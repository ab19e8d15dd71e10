//! codesearch-search - validated semantic code search (§4.A, §4.B, §4.G, §4.J).
//!
//! Fuses vector retrieval against a corpus of `CodeExample`s with structural
//! validation supplied by `codesearch-analyzer` through the `Validator`
//! contract in `codesearch-core`.

pub mod client;
pub mod embeddings;
pub mod engine;
pub mod error;
pub mod in_memory;
pub mod indexer;
pub mod schema;
pub mod store;
pub mod suggestions;
pub mod summary;

pub use client::{QdrantConfig, QdrantVectorStore};
pub use embeddings::{
    validate_dimension, AzureMlConfig, AzureMlProvider, EmbeddingProvider, EmbeddingProviderType,
    LocalProvider, OpenAiConfig, OpenAiProvider, ProviderStatus,
};
pub use engine::{SearchMode, ValidatedHit, ValidatedSearchEngine};
pub use error::{Result, SearchError};
pub use in_memory::InMemoryVectorStore;
pub use indexer::{Indexer, ReindexStats};
pub use schema::{fields, CodeExample, EntityPayload, Filter, SearchHit, COLLECTION};
pub use store::VectorStore;
pub use suggestions::VectorSuggestionSource;
pub use summary::build_summary;
