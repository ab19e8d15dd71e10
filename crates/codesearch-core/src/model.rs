//! Knowledge-graph data model.
//!
//! Mirrors the entity hierarchy walked by the (external) graph-ingestion
//! pipeline: a `Repository` owns `File`s, which own `Class`es and
//! `Function`s; a `Class` owns `Method`s and `Attribute`s. This crate treats
//! all of these as read-only projections of the graph store — they are
//! never constructed from scratch here, only deserialized from query
//! results (see `codesearch-graph`).

use serde::{Deserialize, Serialize};

/// A single parameter in a method or function signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_hint: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_hint: Option<String>) -> Self {
        Self {
            name: name.into(),
            type_hint,
        }
    }
}

/// Kind of entity a `CodeExample` or validation reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Class,
    Method,
    Function,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Class => "class",
            EntityKind::Method => "method",
            EntityKind::Function => "function",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A repository node. Identified by its unique, case-sensitive `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
}

/// A file node, unique by `path` within its owning repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub path: String,
    pub module_name: String,
}

/// A class node, owned by exactly one `File`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub name: String,
    pub full_name: String,
    pub file_path: String,
}

/// A method node, owned by exactly one `Class`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub class_name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
}

/// A free-standing function, same shape as `Method` minus class membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
}

/// An attribute node, belonging to a `Class`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub type_hint: Option<String>,
    pub class_name: String,
}

/// Result of a method-existence query: found flag plus signature if present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureLookup {
    pub found: bool,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
}

/// A single record yielded by the extraction sweep (§4.C query 5): one
/// Class, Method, or Function, with enough parent context to build a
/// `CodeExample`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub kind: EntityKind,
    pub name: String,
    pub full_name: String,
    pub class_name: Option<String>,
    pub file_path: String,
    pub module_name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_display_matches_payload_string() {
        assert_eq!(EntityKind::Class.to_string(), "class");
        assert_eq!(EntityKind::Method.to_string(), "method");
        assert_eq!(EntityKind::Function.to_string(), "function");
    }

    #[test]
    fn parameter_roundtrips_through_json() {
        let p = Parameter::new("x", Some("int".to_string()));
        let json = serde_json::to_string(&p).unwrap();
        let back: Parameter = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
