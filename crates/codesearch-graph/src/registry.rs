//! Graph store selection (§9: "dynamic dispatch over adapters").
//!
//! Grounded on the teacher's `WorkspaceRegistry`, narrowed to the one thing
//! this system needs a registry for: picking which `GraphStore`
//! implementation backs a given repository name.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::http::HttpGraphStore;
use crate::in_memory::InMemoryGraphStore;
use crate::traits::GraphStore;

/// Which concrete backend a repository is served from.
#[derive(Debug, Clone)]
pub enum GraphStoreKind {
    InProcess,
    Remote { base_url: String },
}

/// Maps repository names to the `GraphStore` that serves them, defaulting
/// unregistered repositories to a shared in-memory store.
pub struct GraphStoreRegistry {
    default: Arc<dyn GraphStore>,
    overrides: HashMap<String, Arc<dyn GraphStore>>,
}

impl GraphStoreRegistry {
    pub fn new(default: Arc<dyn GraphStore>) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    pub fn register(&mut self, repository_name: impl Into<String>, kind: GraphStoreKind, timeout: Duration) {
        let store: Arc<dyn GraphStore> = match kind {
            GraphStoreKind::InProcess => Arc::new(InMemoryGraphStore::new(Default::default())),
            GraphStoreKind::Remote { base_url } => Arc::new(HttpGraphStore::new(base_url, timeout)),
        };
        self.overrides.insert(repository_name.into(), store);
    }

    pub fn resolve(&self, repository_name: &str) -> Arc<dyn GraphStore> {
        self.overrides
            .get(repository_name)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}
