//! Cross-crate contracts (§4.I, §4.J, §4.K).
//!
//! `codesearch-search`'s Validated Search Engine (§4.J) needs a validator;
//! `codesearch-analyzer`'s Hallucination Detector (§4.K) needs a vector
//! store to suggest corrections. Defining both as trait objects here lets
//! `codesearch-search` and `codesearch-analyzer` each depend only on
//! `codesearch-core` (and `codesearch-graph`), with the concrete wiring
//! done by the composition root — the same "dynamic dispatch over
//! adapters" shape as `HealthCheckable`, avoiding a dependency cycle
//! between the two crates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cache::ValidationVerdict;

/// One of the reference kinds the Static Analyser emits and the Validator
/// checks (§4.H, §4.I).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationRef {
    Import {
        module_path: String,
    },
    Class {
        class_name: String,
        module_hint: Option<String>,
    },
    Method {
        class_name: String,
        method_name: String,
        argc: Option<usize>,
        keyword_args: Vec<String>,
    },
    Function {
        function_name: String,
        module_hint: Option<String>,
        argc: Option<usize>,
        keyword_args: Vec<String>,
    },
    Attribute {
        class_name: String,
        attribute_name: String,
    },
}

/// Checks a single `ValidationRef` against the graph store and cache
/// (§4.I). Implemented by `codesearch-analyzer::Validator`.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, repository_name: &str, reference: &ValidationRef) -> ValidationVerdict;
}

/// A real `CodeExample` offered as a suggested correction (§4.K step 4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedExample {
    pub id: String,
    pub full_name: String,
    pub summary: String,
}

/// Looks up similar indexed code by a short textual synopsis (§4.K step 4).
/// Implemented by `codesearch-search`'s vector store wrapper.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn suggest(&self, repository_name: &str, synopsis: &str, limit: usize) -> Vec<SuggestedExample>;
}
