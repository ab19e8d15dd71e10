//! Vector store schema (§3, §6): a single collection of `CodeExample`s.
//!
//! Generalized from the teacher's fixed semantic/code dual-collection
//! scheme (`schema::collections::{SEMANTIC,CODE}`) down to the one
//! embedding space this spec requires.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use codesearch_core::{EntityKind, Parameter};

/// Single collection name for the one embedding space.
pub const COLLECTION: &str = "code_examples";

/// Payload field names (§6: "fixed strings", filterable by equality).
pub mod fields {
    pub const REPOSITORY_NAME: &str = "repository_name";
    pub const FILE_PATH: &str = "file_path";
    pub const MODULE_NAME: &str = "module_name";
    pub const KIND: &str = "kind";
    pub const NAME: &str = "name";
    pub const FULL_NAME: &str = "full_name";
    pub const CLASS_NAME: &str = "class_name";
    pub const LANGUAGE: &str = "language";
    pub const VALIDATION_STATUS: &str = "validation_status";
}

/// The fixed payload shape attached to every `CodeExample` (§3, §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityPayload {
    pub repository_name: String,
    pub file_path: String,
    pub module_name: String,
    pub kind: EntityKind,
    pub name: String,
    pub full_name: String,
    pub class_name: Option<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub language: String,
    pub validation_status: String,
}

/// A point to upsert into the vector store: id + vector + payload (§4.B).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeExample {
    pub id: String,
    pub embedding: Vec<f32>,
    pub summary: String,
    pub payload: EntityPayload,
}

impl CodeExample {
    /// §6: `sha256(repository_name || 0x1F || file_path || 0x1F || full_name
    /// || 0x1F || kind)` truncated to 128 bits, lowercase hex.
    pub fn compute_id(repository_name: &str, file_path: &str, full_name: &str, kind: EntityKind) -> String {
        let mut hasher = Sha256::new();
        hasher.update(repository_name.as_bytes());
        hasher.update([0x1F]);
        hasher.update(file_path.as_bytes());
        hasher.update([0x1F]);
        hasher.update(full_name.as_bytes());
        hasher.update([0x1F]);
        hasher.update(kind.as_str().as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..16])
    }
}

/// A hit returned from a vector search, score normalised to `[0,1]` (§4.B).
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub payload: EntityPayload,
}

/// A conjunction of equality constraints over payload keys (§4.B).
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub equals: Vec<(String, String)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<String>) -> Self {
        self.equals.push((field.to_string(), value.into()));
        self
    }

    pub fn repository(repository_name: impl Into<String>) -> Self {
        Self::new().eq(fields::REPOSITORY_NAME, repository_name)
    }

    pub fn matches(&self, payload: &EntityPayload) -> bool {
        self.equals.iter().all(|(field, value)| match field.as_str() {
            fields::REPOSITORY_NAME => &payload.repository_name == value,
            fields::FILE_PATH => &payload.file_path == value,
            fields::MODULE_NAME => &payload.module_name == value,
            fields::KIND => payload.kind.as_str() == value,
            fields::NAME => &payload.name == value,
            fields::FULL_NAME => &payload.full_name == value,
            fields::CLASS_NAME => payload.class_name.as_deref() == Some(value.as_str()),
            fields::LANGUAGE => &payload.language == value,
            fields::VALIDATION_STATUS => &payload.validation_status == value,
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_deterministic_and_32_hex_chars() {
        let id = CodeExample::compute_id("acme/widgets", "widgets/core.py", "Widget.spin", EntityKind::Method);
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        let again = CodeExample::compute_id("acme/widgets", "widgets/core.py", "Widget.spin", EntityKind::Method);
        assert_eq!(id, again);
    }

    #[test]
    fn id_changes_with_kind() {
        let method_id = CodeExample::compute_id("r", "f.py", "X", EntityKind::Method);
        let class_id = CodeExample::compute_id("r", "f.py", "X", EntityKind::Class);
        assert_ne!(method_id, class_id);
    }

    #[test]
    fn filter_matches_repository_equality() {
        let payload = EntityPayload {
            repository_name: "acme/widgets".to_string(),
            file_path: "a.py".to_string(),
            module_name: "a".to_string(),
            kind: EntityKind::Function,
            name: "f".to_string(),
            full_name: "f".to_string(),
            class_name: None,
            parameters: Vec::new(),
            return_type: None,
            language: "python".to_string(),
            validation_status: "validated".to_string(),
        };
        assert!(Filter::repository("acme/widgets").matches(&payload));
        assert!(!Filter::repository("other").matches(&payload));
    }
}
