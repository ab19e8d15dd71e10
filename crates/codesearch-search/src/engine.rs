//! Validated Search Engine (§4.J).
//!
//! Composes the vector store (semantic retrieval) with the cross-crate
//! `Validator` contract (structural validation), following the teacher's
//! "fetch wide, then narrow" retrieval shape generalized with the confidence
//! policy this spec requires.

use std::sync::Arc;

use codesearch_core::{run_bounded, CircuitBreaker, ValidationRef, Validator};

use crate::embeddings::EmbeddingProvider;
use crate::error::{Result, SearchError};
use crate::schema::{EntityPayload, Filter, SearchHit};
use crate::store::VectorStore;

/// Retrieval/validation tuning knob (§4.J, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Fast,
    Balanced,
    Thorough,
}

impl SearchMode {
    /// §4.J step 2: `top_k * over_fetch_factor(mode)`.
    fn over_fetch_factor(self) -> usize {
        match self {
            SearchMode::Fast => 1,
            SearchMode::Balanced => 2,
            SearchMode::Thorough => 4,
        }
    }

    /// §4.J step 4: bounded concurrency executor width.
    fn concurrency(self) -> usize {
        match self {
            SearchMode::Fast => 2,
            SearchMode::Balanced => 6,
            SearchMode::Thorough => 10,
        }
    }
}

/// One validated result (§6 `smart_code_search` output shape).
#[derive(Debug, Clone)]
pub struct ValidatedHit {
    pub id: String,
    pub payload: EntityPayload,
    pub semantic_score: f32,
    pub structural_score: f64,
    pub combined_score: f64,
    pub validation_status: String,
}

/// Confidence when no structural evidence could be obtained for a ref
/// (§4.J step 5: "0.5 when no structural evidence is obtainable").
const NEUTRAL_STRUCTURAL_SCORE: f64 = 0.5;
/// §4.J step 5 weighting.
const SEMANTIC_WEIGHT: f64 = 0.4;
const STRUCTURAL_WEIGHT: f64 = 0.6;

pub struct ValidatedSearchEngine {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    validator: Arc<dyn Validator>,
    graph_breaker: Arc<CircuitBreaker>,
}

impl ValidatedSearchEngine {
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        validator: Arc<dyn Validator>,
        graph_breaker: Arc<CircuitBreaker>,
    ) -> Self {
        Self {
            vector_store,
            embedder,
            validator,
            graph_breaker,
        }
    }

    /// §4.J: `search_and_validate(query, top_k, filter?, min_confidence, mode)`.
    pub async fn search_and_validate(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<Filter>,
        min_confidence: f64,
        mode: SearchMode,
    ) -> Result<Vec<ValidatedHit>> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        if !(1..=50).contains(&top_k) {
            return Err(SearchError::TopKOutOfRange(top_k));
        }
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(SearchError::MinConfidenceOutOfRange(min_confidence));
        }

        let vectors = self.embedder.embed(vec![query.to_string()]).await?;
        let vector = vectors.into_iter().next().unwrap_or_default();

        let fetch_k = top_k * mode.over_fetch_factor();
        let hits = self.vector_store.search(vector, fetch_k, filter).await?;

        let degraded = self.graph_breaker.state() == codesearch_core::BreakerState::Open;

        let mut results = if degraded {
            hits.into_iter().map(|hit| self.degraded_hit(hit)).collect()
        } else {
            self.validate_hits(hits, mode).await
        };

        results.retain(|hit: &ValidatedHit| hit.combined_score >= min_confidence);
        results.sort_by(|a, b| {
            b.combined_score
                .total_cmp(&a.combined_score)
                .then_with(|| b.semantic_score.total_cmp(&a.semantic_score))
                .then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(top_k);
        Ok(results)
    }

    /// §4.J step 7: semantic-only fallback when the graph breaker is `Open`.
    fn degraded_hit(&self, hit: SearchHit) -> ValidatedHit {
        let semantic_score = hit.score;
        let combined_score =
            SEMANTIC_WEIGHT * semantic_score as f64 + STRUCTURAL_WEIGHT * NEUTRAL_STRUCTURAL_SCORE;
        ValidatedHit {
            id: hit.id,
            payload: hit.payload,
            semantic_score,
            structural_score: NEUTRAL_STRUCTURAL_SCORE,
            combined_score,
            validation_status: "degraded".to_string(),
        }
    }

    async fn validate_hits(&self, hits: Vec<SearchHit>, mode: SearchMode) -> Vec<ValidatedHit> {
        let validator = self.validator.clone();
        let tasks: Vec<_> = hits
            .into_iter()
            .map(|hit| {
                let validator = validator.clone();
                move || async move {
                    let refs = assemble_refs(&hit.payload);
                    let mut confidences = Vec::with_capacity(refs.len());
                    for reference in &refs {
                        let verdict = validator.validate(&hit.payload.repository_name, reference).await;
                        confidences.push(verdict.confidence);
                    }
                    let structural_score = if confidences.is_empty() {
                        NEUTRAL_STRUCTURAL_SCORE
                    } else {
                        confidences.iter().sum::<f64>() / confidences.len() as f64
                    };
                    let combined_score =
                        SEMANTIC_WEIGHT * hit.score as f64 + STRUCTURAL_WEIGHT * structural_score;
                    Ok::<_, ()>(ValidatedHit {
                        id: hit.id,
                        payload: hit.payload,
                        semantic_score: hit.score,
                        structural_score,
                        combined_score,
                        validation_status: "validated".to_string(),
                    })
                }
            })
            .collect();

        run_bounded(mode.concurrency(), tasks, None)
            .await
            .into_iter()
            .filter_map(|r| r.ok())
            .collect()
    }
}

/// §4.J step 3: the class (if any), the method/function, and the enclosing
/// module as an import, implied by a hit's payload.
fn assemble_refs(payload: &EntityPayload) -> Vec<ValidationRef> {
    let mut refs = vec![ValidationRef::Import {
        module_path: payload.module_name.clone(),
    }];

    match payload.kind {
        codesearch_core::EntityKind::Class => {
            refs.push(ValidationRef::Class {
                class_name: payload.name.clone(),
                module_hint: Some(payload.module_name.clone()),
            });
        }
        codesearch_core::EntityKind::Method => {
            if let Some(class_name) = &payload.class_name {
                refs.push(ValidationRef::Method {
                    class_name: class_name.clone(),
                    method_name: payload.name.clone(),
                    argc: None,
                    keyword_args: Vec::new(),
                });
            }
        }
        codesearch_core::EntityKind::Function => {
            refs.push(ValidationRef::Function {
                function_name: payload.name.clone(),
                module_hint: Some(payload.module_name.clone()),
                argc: None,
                keyword_args: Vec::new(),
            });
        }
    }

    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::LocalProvider;
    use crate::in_memory::InMemoryVectorStore;
    use crate::schema::CodeExample;
    use async_trait::async_trait;
    use codesearch_core::{EntityKind, ValidationVerdict};
    use std::time::Duration;

    struct FixedValidator(f64);

    #[async_trait]
    impl Validator for FixedValidator {
        async fn validate(&self, _repository_name: &str, _reference: &ValidationRef) -> ValidationVerdict {
            ValidationVerdict::new(true, self.0, "fixture")
        }
    }

    fn example(name: &str) -> CodeExample {
        CodeExample {
            id: CodeExample::compute_id("acme/widgets", "a.py", name, EntityKind::Function),
            embedding: vec![1.0, 0.0, 0.0, 0.0],
            summary: format!("function {name}"),
            payload: EntityPayload {
                repository_name: "acme/widgets".to_string(),
                file_path: "a.py".to_string(),
                module_name: "widgets.a".to_string(),
                kind: EntityKind::Function,
                name: name.to_string(),
                full_name: name.to_string(),
                class_name: None,
                parameters: Vec::new(),
                return_type: None,
                language: "python".to_string(),
                validation_status: "validated".to_string(),
            },
        }
    }

    async fn fixture(confidence: f64) -> ValidatedSearchEngine {
        let store = Arc::new(InMemoryVectorStore::new());
        store.upsert(vec![example("noop")]).await.unwrap();
        ValidatedSearchEngine::new(
            store,
            Arc::new(LocalProvider::new(4)),
            Arc::new(FixedValidator(confidence)),
            Arc::new(CircuitBreaker::new(3, Duration::from_secs(60))),
        )
    }

    #[tokio::test]
    async fn combined_score_blends_semantic_and_structural() {
        let engine = fixture(1.0).await;
        let hits = engine
            .search_and_validate("noop", 5, None, 0.0, SearchMode::Fast)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].validation_status, "validated");
        assert!(hits[0].combined_score <= 1.0);
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let engine = fixture(1.0).await;
        let err = engine
            .search_and_validate("", 5, None, 0.0, SearchMode::Fast)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::EmptyQuery));
    }

    #[tokio::test]
    async fn min_confidence_filters_out_low_scoring_hits() {
        let engine = fixture(0.0).await;
        let hits = engine
            .search_and_validate("noop", 5, None, 0.9, SearchMode::Fast)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn open_graph_breaker_degrades_to_semantic_only() {
        let engine = fixture(1.0).await;
        engine.graph_breaker.record_failure();
        engine.graph_breaker.record_failure();
        engine.graph_breaker.record_failure();
        let hits = engine
            .search_and_validate("noop", 5, None, 0.0, SearchMode::Fast)
            .await
            .unwrap();
        assert_eq!(hits[0].validation_status, "degraded");
        assert_eq!(hits[0].structural_score, 0.5);
    }
}
