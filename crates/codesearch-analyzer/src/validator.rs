//! Validator (§4.I).
//!
//! Grounded on the cache-then-breaker-then-backend call chain already
//! established for the graph and vector stores (`codesearch-core::cache`,
//! `codesearch-core::breaker`), composed here into the single `validate`
//! algorithm the spec describes.

use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use codesearch_core::{
    Admission, CircuitBreaker, Parameter, SignatureLookup, ValidationCache, ValidationRef,
    ValidationVerdict, Validator as ValidatorTrait,
};
use codesearch_graph::GraphStore;

/// Up to this many edit-distance-nearest names are attached as suggestions
/// when the primary name was not found (§4.I step 5).
const MAX_SUGGESTIONS: usize = 5;

pub struct Validator {
    graph: Arc<dyn GraphStore>,
    cache: Arc<ValidationCache>,
    breaker: Arc<CircuitBreaker>,
}

impl Validator {
    pub fn new(graph: Arc<dyn GraphStore>, cache: Arc<ValidationCache>, breaker: Arc<CircuitBreaker>) -> Self {
        Self { graph, cache, breaker }
    }

    fn cache_key(repository_name: &str, reference: &ValidationRef) -> String {
        let mut hasher = Sha256::new();
        hasher.update(repository_name.as_bytes());
        hasher.update([0x1f]);
        hasher.update(serde_json::to_vec(reference).unwrap_or_default());
        hex::encode(hasher.finalize())
    }

    async fn run(&self, repository_name: &str, reference: &ValidationRef) -> ValidationVerdict {
        let repo_exists = match self.graph.exists(repository_name).await {
            Ok(v) => v,
            Err(_) => {
                self.breaker.record_failure();
                return ValidationVerdict::neutral("graph_unavailable");
            }
        };

        let verdict = match reference {
            ValidationRef::Import { module_path } => self.validate_import(repo_exists, module_path),
            ValidationRef::Class {
                class_name,
                module_hint: _,
            } => self.validate_class(repository_name, repo_exists, class_name).await,
            ValidationRef::Method {
                class_name,
                method_name,
                argc,
                keyword_args,
            } => {
                self.validate_method(repository_name, repo_exists, class_name, method_name, *argc, keyword_args)
                    .await
            }
            ValidationRef::Function {
                function_name,
                module_hint: _,
                argc,
                keyword_args,
            } => {
                self.validate_function(repository_name, repo_exists, function_name, *argc, keyword_args)
                    .await
            }
            ValidationRef::Attribute {
                class_name,
                attribute_name: _,
            } => self.validate_attribute(repository_name, repo_exists, class_name).await,
        };

        match &verdict {
            Some(v) => {
                self.breaker.record_success();
                v.clone()
            }
            None => {
                self.breaker.record_failure();
                ValidationVerdict::neutral("graph_unavailable")
            }
        }
    }

    fn validate_import(&self, repo_exists: bool, module_path: &str) -> Option<ValidationVerdict> {
        // no canonical graph query resolves module paths directly (§4.C);
        // the only structural evidence available is repository existence,
        // so confidence is capped at 0.5 per the "can't be checked" rule.
        let confidence = if repo_exists { 0.5 } else { 0.0 };
        Some(ValidationVerdict {
            found: if repo_exists { None } else { Some(false) },
            confidence,
            reason: if repo_exists {
                format!("import '{module_path}' cannot be structurally verified")
            } else {
                "repository not found".to_string()
            },
            suggestions: Vec::new(),
        })
    }

    async fn validate_class(&self, repository_name: &str, repo_exists: bool, class_name: &str) -> Option<ValidationVerdict> {
        if !repo_exists {
            return Some(ValidationVerdict::new(false, 0.0, "repository not found"));
        }
        let class_exists = self.graph.class_exists(repository_name, class_name).await.ok()?;
        if class_exists {
            Some(ValidationVerdict::new(true, 0.70, format!("class '{class_name}' found")))
        } else {
            Some(ValidationVerdict::new(false, 0.30, format!("class '{class_name}' not found")))
        }
    }

    async fn validate_method(
        &self,
        repository_name: &str,
        repo_exists: bool,
        class_name: &str,
        method_name: &str,
        argc: Option<usize>,
        keyword_args: &[String],
    ) -> Option<ValidationVerdict> {
        if !repo_exists {
            return Some(ValidationVerdict::new(false, 0.0, "repository not found"));
        }
        let lookup = self
            .graph
            .method_exists(repository_name, class_name, method_name)
            .await
            .ok()?;

        if !lookup.found {
            let suggestions = self
                .suggest(repository_name, class_name, method_name, false)
                .await
                .unwrap_or_default();
            return Some(
                ValidationVerdict::new(false, 0.30, format!("method '{class_name}.{method_name}' not found"))
                    .with_suggestions(suggestions),
            );
        }

        let signature_ok = signature_matches(argc, keyword_args, &lookup, true);
        let confidence = if signature_ok { 0.30 + 0.40 + 0.30 } else { 0.30 + 0.40 };
        let reason = if signature_ok {
            format!("method '{class_name}.{method_name}' found with matching signature")
        } else {
            format!("method '{class_name}.{method_name}' found but call signature mismatches")
        };
        Some(ValidationVerdict::new(true, confidence, reason))
    }

    async fn validate_function(
        &self,
        repository_name: &str,
        repo_exists: bool,
        function_name: &str,
        argc: Option<usize>,
        keyword_args: &[String],
    ) -> Option<ValidationVerdict> {
        if !repo_exists {
            return Some(ValidationVerdict::new(false, 0.0, "repository not found"));
        }
        let lookup = self.graph.function_exists(repository_name, function_name).await.ok()?;

        if !lookup.found {
            let suggestions = self
                .suggest(repository_name, "", function_name, true)
                .await
                .unwrap_or_default();
            return Some(
                ValidationVerdict::new(false, 0.30, format!("function '{function_name}' not found"))
                    .with_suggestions(suggestions),
            );
        }

        let signature_ok = signature_matches(argc, keyword_args, &lookup, false);
        let confidence = if signature_ok { 0.30 + 0.40 + 0.30 } else { 0.30 + 0.40 };
        let reason = if signature_ok {
            format!("function '{function_name}' found with matching signature")
        } else {
            format!("function '{function_name}' found but call signature mismatches")
        };
        Some(ValidationVerdict::new(true, confidence, reason))
    }

    async fn validate_attribute(&self, repository_name: &str, repo_exists: bool, class_name: &str) -> Option<ValidationVerdict> {
        if !repo_exists {
            return Some(ValidationVerdict::new(false, 0.0, "repository not found"));
        }
        // attributes have no canonical graph query (§4.C); cap at 0.5 once
        // the owning class is confirmed, per the "can't be checked" rule.
        let class_exists = self.graph.class_exists(repository_name, class_name).await.ok()?;
        let confidence = if class_exists { 0.5 } else { 0.30 };
        Some(ValidationVerdict {
            found: if class_exists { None } else { Some(false) },
            confidence,
            reason: "attribute access cannot be structurally verified".to_string(),
            suggestions: Vec::new(),
        })
    }

    /// §4.I step 5: up to 5 edit-distance-nearest names in scope, ascending
    /// by distance then lexicographically.
    async fn suggest(
        &self,
        repository_name: &str,
        class_name: &str,
        target: &str,
        is_function: bool,
    ) -> Option<Vec<String>> {
        let candidates = if is_function {
            self.graph.function_names(repository_name).await.ok()?
        } else {
            self.graph.method_names(repository_name, class_name).await.ok()?
        };

        let mut scored: Vec<(usize, String)> = candidates
            .into_iter()
            .map(|name| (strsim::levenshtein(target, &name), name))
            .collect();
        scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        scored.truncate(MAX_SUGGESTIONS);
        Some(scored.into_iter().map(|(_, name)| name).collect())
    }
}

/// Honours a signature when the positional count falls within the
/// declared parameter range and every keyword arg is a declared parameter
/// name (§4.I step 4). `skip_first` drops `self` from the declared range
/// for methods, since it is never supplied at the call site.
fn signature_matches(argc: Option<usize>, keyword_args: &[String], lookup: &SignatureLookup, skip_first: bool) -> bool {
    let declared: &[Parameter] = if skip_first && !lookup.parameters.is_empty() {
        &lookup.parameters[1..]
    } else {
        &lookup.parameters
    };

    let argc_ok = match argc {
        Some(argc) => argc <= declared.len(),
        None => true,
    };
    let keywords_ok = keyword_args
        .iter()
        .all(|kw| declared.iter().any(|p| &p.name == kw));

    argc_ok && keywords_ok
}

#[async_trait]
impl ValidatorTrait for Validator {
    async fn validate(&self, repository_name: &str, reference: &ValidationRef) -> ValidationVerdict {
        let key = Self::cache_key(repository_name, reference);
        if let Some(verdict) = self.cache.get(&key) {
            return verdict;
        }

        if self.breaker.admit() == Admission::Rejected {
            return ValidationVerdict {
                found: None,
                confidence: 0.5,
                reason: "graph_unavailable".to_string(),
                suggestions: Vec::new(),
            };
        }

        let verdict = self.run(repository_name, reference).await;
        self.cache.put(key, verdict.clone());
        verdict
    }
}
