//! In-memory knowledge graph representation.
//!
//! A small petgraph-backed graph of `Repository -> File -> {Class, Function}`
//! and `Class -> {Method, Attribute}` containment edges. This is the
//! structure `codesearch-graph::InMemoryGraphStore` wraps to answer the
//! canonical queries of §4.C; it is also the shape a real graph database
//! would expose, were one wired in.

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::model::{
    Attribute, Class, EntityKind, ExtractionRecord, File, Function, Method, Repository,
    SignatureLookup,
};

pub const GRAPH_SCHEMA_VERSION: &str = "1.0";

/// Containment edge. The knowledge graph used here has exactly one edge
/// kind: `Repository -> File -> {Class, Function}`, `Class -> {Method,
/// Attribute}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    Contains,
}

/// A node in the knowledge graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GraphNode {
    Repository(Repository),
    File(File),
    Class(Class),
    Method(Method),
    Function(Function),
    Attribute(Attribute),
}

/// In-memory knowledge graph.
///
/// Repository nodes are conceptually read-only from this crate's
/// perspective (§3): nothing here ever removes a repository except test
/// fixtures setting up and tearing down scenarios.
#[derive(Default)]
pub struct KnowledgeGraph {
    graph: StableGraph<GraphNode, EdgeType>,
    repositories: HashMap<String, NodeIndex>,
    classes: HashMap<(String, String), NodeIndex>,
    functions: HashMap<(String, String), NodeIndex>,
    methods: HashMap<(String, String, String), NodeIndex>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_repository(&mut self, name: impl Into<String>) -> NodeIndex {
        let name = name.into();
        if let Some(idx) = self.repositories.get(&name) {
            return *idx;
        }
        let idx = self
            .graph
            .add_node(GraphNode::Repository(Repository { name: name.clone() }));
        self.repositories.insert(name, idx);
        idx
    }

    pub fn add_file(&mut self, repo: NodeIndex, file: File) -> NodeIndex {
        let idx = self.graph.add_node(GraphNode::File(file));
        self.graph.add_edge(repo, idx, EdgeType::Contains);
        idx
    }

    pub fn add_class(&mut self, repo_name: &str, file: NodeIndex, class: Class) -> NodeIndex {
        let key = (repo_name.to_string(), class.full_name.clone());
        let idx = self.graph.add_node(GraphNode::Class(class));
        self.graph.add_edge(file, idx, EdgeType::Contains);
        self.classes.insert(key, idx);
        idx
    }

    pub fn add_function(
        &mut self,
        repo_name: &str,
        file: NodeIndex,
        function: Function,
    ) -> NodeIndex {
        let key = (repo_name.to_string(), function.name.clone());
        let idx = self.graph.add_node(GraphNode::Function(function));
        self.graph.add_edge(file, idx, EdgeType::Contains);
        self.functions.insert(key, idx);
        idx
    }

    pub fn add_method(
        &mut self,
        repo_name: &str,
        class_name: &str,
        class: NodeIndex,
        method: Method,
    ) -> NodeIndex {
        let key = (
            repo_name.to_string(),
            class_name.to_string(),
            method.name.clone(),
        );
        let idx = self.graph.add_node(GraphNode::Method(method));
        self.graph.add_edge(class, idx, EdgeType::Contains);
        self.methods.insert(key, idx);
        idx
    }

    pub fn add_attribute(&mut self, class: NodeIndex, attribute: Attribute) -> NodeIndex {
        let idx = self.graph.add_node(GraphNode::Attribute(attribute));
        self.graph.add_edge(class, idx, EdgeType::Contains);
        idx
    }

    pub fn repository_exists(&self, repository_name: &str) -> bool {
        self.repositories.contains_key(repository_name)
    }

    pub fn class_exists(&self, repository_name: &str, class_name: &str) -> bool {
        self.classes
            .contains_key(&(repository_name.to_string(), class_name.to_string()))
    }

    pub fn method_exists(
        &self,
        repository_name: &str,
        class_name: &str,
        method_name: &str,
    ) -> SignatureLookup {
        let key = (
            repository_name.to_string(),
            class_name.to_string(),
            method_name.to_string(),
        );
        match self
            .methods
            .get(&key)
            .and_then(|idx| self.graph.node_weight(*idx))
        {
            Some(GraphNode::Method(m)) => SignatureLookup {
                found: true,
                parameters: m.parameters.clone(),
                return_type: m.return_type.clone(),
            },
            _ => SignatureLookup::default(),
        }
    }

    pub fn function_exists(&self, repository_name: &str, function_name: &str) -> SignatureLookup {
        let key = (repository_name.to_string(), function_name.to_string());
        match self
            .functions
            .get(&key)
            .and_then(|idx| self.graph.node_weight(*idx))
        {
            Some(GraphNode::Function(f)) => SignatureLookup {
                found: true,
                parameters: f.parameters.clone(),
                return_type: f.return_type.clone(),
            },
            _ => SignatureLookup::default(),
        }
    }

    /// Every method name belonging to `class_name`, for edit-distance suggestions.
    pub fn method_names(&self, repository_name: &str, class_name: &str) -> Vec<String> {
        self.methods
            .keys()
            .filter(|(repo, class, _)| repo == repository_name && class == class_name)
            .map(|(_, _, method)| method.clone())
            .collect()
    }

    /// Every function name in the repository, for edit-distance suggestions.
    pub fn function_names(&self, repository_name: &str) -> Vec<String> {
        self.functions
            .keys()
            .filter(|(repo, _)| repo == repository_name)
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Extraction sweep (§4.C query 5): every Class, Method, and Function
    /// owned by `repository_name`, projected with enough parent context to
    /// build a `CodeExample`.
    pub fn sweep(&self, repository_name: &str) -> Vec<ExtractionRecord> {
        let Some(&repo_idx) = self.repositories.get(repository_name) else {
            return Vec::new();
        };

        let mut records = Vec::new();
        for file_idx in self.graph.neighbors_directed(repo_idx, Direction::Outgoing) {
            let Some(GraphNode::File(file)) = self.graph.node_weight(file_idx) else {
                continue;
            };
            for child_idx in self.graph.neighbors_directed(file_idx, Direction::Outgoing) {
                match self.graph.node_weight(child_idx) {
                    Some(GraphNode::Class(class)) => {
                        records.push(ExtractionRecord {
                            kind: EntityKind::Class,
                            name: class.name.clone(),
                            full_name: class.full_name.clone(),
                            class_name: None,
                            file_path: file.path.clone(),
                            module_name: file.module_name.clone(),
                            parameters: Vec::new(),
                            return_type: None,
                        });
                        for method_idx in
                            self.graph.neighbors_directed(child_idx, Direction::Outgoing)
                        {
                            if let Some(GraphNode::Method(method)) =
                                self.graph.node_weight(method_idx)
                            {
                                records.push(ExtractionRecord {
                                    kind: EntityKind::Method,
                                    name: method.name.clone(),
                                    full_name: format!("{}.{}", class.name, method.name),
                                    class_name: Some(class.name.clone()),
                                    file_path: file.path.clone(),
                                    module_name: file.module_name.clone(),
                                    parameters: method.parameters.clone(),
                                    return_type: method.return_type.clone(),
                                });
                            }
                        }
                    }
                    Some(GraphNode::Function(function)) => {
                        records.push(ExtractionRecord {
                            kind: EntityKind::Function,
                            name: function.name.clone(),
                            full_name: function.name.clone(),
                            class_name: None,
                            file_path: file.path.clone(),
                            module_name: file.module_name.clone(),
                            parameters: function.parameters.clone(),
                            return_type: function.return_type.clone(),
                        });
                    }
                    _ => {}
                }
            }
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Parameter;

    fn sample_graph() -> KnowledgeGraph {
        let mut g = KnowledgeGraph::new();
        let repo = g.add_repository("R");
        let file = g.add_file(
            repo,
            File {
                path: "r/c.py".to_string(),
                module_name: "r.c".to_string(),
            },
        );
        let class = g.add_class(
            "R",
            file,
            Class {
                name: "C".to_string(),
                full_name: "C".to_string(),
                file_path: "r/c.py".to_string(),
            },
        );
        g.add_method(
            "R",
            "C",
            class,
            Method {
                name: "m".to_string(),
                class_name: "C".to_string(),
                parameters: vec![
                    Parameter::new("self", None),
                    Parameter::new("x", Some("int".to_string())),
                ],
                return_type: Some("int".to_string()),
            },
        );
        g
    }

    #[test]
    fn sweep_yields_class_and_method() {
        let g = sample_graph();
        let records = g.sweep("R");
        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|r| r.full_name == "C"));
        assert!(records.iter().any(|r| r.full_name == "C.m"));
    }

    #[test]
    fn method_exists_reports_signature() {
        let g = sample_graph();
        let lookup = g.method_exists("R", "C", "m");
        assert!(lookup.found);
        assert_eq!(lookup.parameters.len(), 2);
        assert_eq!(lookup.return_type.as_deref(), Some("int"));

        let missing = g.method_exists("R", "C", "nope");
        assert!(!missing.found);
    }

    #[test]
    fn repository_and_class_existence() {
        let g = sample_graph();
        assert!(g.repository_exists("R"));
        assert!(!g.repository_exists("Q"));
        assert!(g.class_exists("R", "C"));
        assert!(!g.class_exists("R", "Z"));
    }

    #[test]
    fn sweep_on_unknown_repository_is_empty() {
        let g = sample_graph();
        assert!(g.sweep("unknown").is_empty());
    }
}
