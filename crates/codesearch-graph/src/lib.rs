//! codesearch-graph - graph store abstraction (§4.C).
//!
//! Defines the `GraphStore` trait implementing the five canonical queries,
//! plus an in-process `petgraph`-backed implementation and a real HTTP
//! client implementation, selected per repository through a small registry.

mod error;
mod http;
mod in_memory;
mod registry;
mod traits;

pub use error::GraphStoreError;
pub use http::HttpGraphStore;
pub use in_memory::InMemoryGraphStore;
pub use registry::{GraphStoreKind, GraphStoreRegistry};
pub use traits::GraphStore;

/// Result type for graph store operations.
pub type Result<T> = std::result::Result<T, GraphStoreError>;
