//! codesearch-core - shared data model and cross-cutting services.
//!
//! Provides the knowledge-graph data model, the in-memory graph
//! representation, the TTL+LRU validation cache, the bounded-concurrency
//! executor, the circuit breaker, the health-report aggregation, and the
//! shared error taxonomy used by every other crate in the workspace.

pub mod breaker;
pub mod cache;
pub mod contracts;
pub mod error;
pub mod executor;
pub mod graph;
pub mod health;
pub mod model;

pub use breaker::{Admission, BreakerState, CircuitBreaker};
pub use cache::{CacheStats, ValidationCache, ValidationVerdict};
pub use contracts::{SuggestedExample, SuggestionSource, ValidationRef, Validator};
pub use error::{ErrorKind, TaxonomyError};
pub use executor::{run_bounded, InflightProbe, TaskResult, MAX_CONCURRENCY, MIN_CONCURRENCY};
pub use graph::{EdgeType, GraphNode, KnowledgeGraph, GRAPH_SCHEMA_VERSION};
pub use health::{ComponentHealth, HealthCheckable, HealthMonitor, HealthReport, Status};
pub use model::{
    Attribute, Class, EntityKind, ExtractionRecord, File, Function, Method, Parameter, Repository,
    SignatureLookup,
};
