//! Hallucination Detector (§4.K).
//!
//! Drives the Static Analyser and the Validator through the same bounded
//! concurrency executor the Validated Search Engine uses for its structural
//! checks, then folds per-reference verdicts into one report.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use codesearch_core::{run_bounded, SuggestionSource, ValidationRef, Validator};

use crate::error::Result;
use crate::static_analyser::{AnalysisResult, StaticAnalyser};

/// Reference kinds a `HallucinationReport` item can be about (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Import,
    Class,
    Method,
    Function,
    Attribute,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedCorrection {
    pub id: String,
    pub full_name: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportItem {
    pub kind: ItemKind,
    pub name: String,
    pub supported: bool,
    pub confidence: f64,
    pub evidence: Option<String>,
    pub suggestions: Vec<String>,
    pub suggested_corrections: Vec<SuggestedCorrection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallRisk {
    Low,
    Medium,
    High,
    Critical,
}

impl OverallRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallRisk::Low => "low",
            OverallRisk::Medium => "medium",
            OverallRisk::High => "high",
            OverallRisk::Critical => "critical",
        }
    }

    /// §4.K step 6: map the unsupported fraction to a risk band.
    fn from_unsupported_fraction(f: f64) -> Self {
        if f == 0.0 {
            OverallRisk::Low
        } else if f <= 0.1 {
            OverallRisk::Medium
        } else if f <= 0.3 {
            OverallRisk::High
        } else {
            OverallRisk::Critical
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HallucinationReport {
    pub script_path: String,
    pub overall_risk: OverallRisk,
    pub overall_confidence: f64,
    pub items: Vec<ReportItem>,
}

/// Confidence threshold above which an item counts as `supported` (§4.K
/// step 3) and `found = true` must also hold.
const SUPPORTED_CONFIDENCE_THRESHOLD: f64 = 0.6;
/// Width of the bounded concurrency executor driving per-reference
/// validations (§4.K step 2).
const VALIDATION_CONCURRENCY: usize = 8;
/// At most this many suggested corrections are attached per item (§4.K
/// step 4).
const MAX_SUGGESTED_CORRECTIONS: usize = 3;

pub struct HallucinationDetector {
    validator: Arc<dyn Validator>,
    suggestions: Option<Arc<dyn SuggestionSource>>,
}

impl HallucinationDetector {
    pub fn new(validator: Arc<dyn Validator>, suggestions: Option<Arc<dyn SuggestionSource>>) -> Self {
        Self { validator, suggestions }
    }

    /// §4.K: `check(program_text, repository_hint?, include_suggestions, detailed)`.
    pub async fn check(
        &self,
        script_path: &str,
        program_text: &str,
        repository_hint: Option<&str>,
        include_suggestions: bool,
        detailed: bool,
    ) -> Result<HallucinationReport> {
        let analysis = {
            let mut analyser = StaticAnalyser::new()?;
            analyser.analyse(program_text)?
        };
        let repository_name = repository_hint.unwrap_or_default().to_string();

        let refs = flatten(&analysis);
        if refs.is_empty() {
            return Ok(HallucinationReport {
                script_path: script_path.to_string(),
                overall_risk: OverallRisk::Low,
                overall_confidence: 1.0,
                items: Vec::new(),
            });
        }

        let validator = self.validator.clone();
        let tasks: Vec<_> = refs
            .into_iter()
            .map(|(kind, name, reference)| {
                let validator = validator.clone();
                let repository_name = repository_name.clone();
                move || async move {
                    let verdict = validator.validate(&repository_name, &reference).await;
                    Ok::<_, ()>((kind, name, verdict))
                }
            })
            .collect();

        let results = run_bounded(VALIDATION_CONCURRENCY, tasks, None).await;

        let mut items = Vec::with_capacity(results.len());
        let mut confidence_sum = 0.0;
        let mut unsupported = 0usize;

        for result in results {
            let (kind, name, verdict) = result.expect("validator tasks never fail");
            let supported = verdict.found == Some(true) && verdict.confidence >= SUPPORTED_CONFIDENCE_THRESHOLD;
            if !supported {
                unsupported += 1;
            }
            confidence_sum += verdict.confidence;

            let suggested_corrections = if include_suggestions && !supported {
                self.suggested_corrections(&repository_name, &name).await
            } else {
                Vec::new()
            };

            items.push(ReportItem {
                kind,
                name,
                supported,
                confidence: verdict.confidence,
                evidence: detailed.then_some(verdict.reason),
                suggestions: verdict.suggestions,
                suggested_corrections,
            });
        }

        let overall_confidence = confidence_sum / items.len() as f64;
        let unsupported_fraction = unsupported as f64 / items.len() as f64;

        Ok(HallucinationReport {
            script_path: script_path.to_string(),
            overall_risk: OverallRisk::from_unsupported_fraction(unsupported_fraction),
            overall_confidence,
            items,
        })
    }

    async fn suggested_corrections(&self, repository_name: &str, synopsis: &str) -> Vec<SuggestedCorrection> {
        let Some(source) = &self.suggestions else {
            return Vec::new();
        };
        source
            .suggest(repository_name, synopsis, MAX_SUGGESTED_CORRECTIONS)
            .await
            .into_iter()
            .map(|s| SuggestedCorrection {
                id: s.id,
                full_name: s.full_name,
                summary: s.summary,
            })
            .collect()
    }
}

fn flatten(analysis: &AnalysisResult) -> Vec<(ItemKind, String, ValidationRef)> {
    let mut refs = Vec::new();

    for import in &analysis.imports {
        refs.push((
            ItemKind::Import,
            import.module_path.clone(),
            ValidationRef::Import {
                module_path: import.module_path.clone(),
            },
        ));
    }
    for instantiation in &analysis.class_instantiations {
        refs.push((
            ItemKind::Class,
            instantiation.class_name.clone(),
            ValidationRef::Class {
                class_name: instantiation.class_name.clone(),
                module_hint: instantiation.module_hint.clone(),
            },
        ));
    }
    for call in &analysis.method_calls {
        let class_name = call.receiver_type_hint.clone().unwrap_or_else(|| "unknown".to_string());
        refs.push((
            ItemKind::Method,
            format!("{class_name}.{}", call.method_name),
            ValidationRef::Method {
                class_name,
                method_name: call.method_name.clone(),
                argc: Some(call.positional_argc),
                keyword_args: call.keyword_args.clone(),
            },
        ));
    }
    for call in &analysis.function_calls {
        refs.push((
            ItemKind::Function,
            call.function_name.clone(),
            ValidationRef::Function {
                function_name: call.function_name.clone(),
                module_hint: call.module_hint.clone(),
                argc: Some(call.positional_argc),
                keyword_args: call.keyword_args.clone(),
            },
        ));
    }
    for access in &analysis.attribute_accesses {
        let class_name = access.receiver_type_hint.clone().unwrap_or_else(|| "unknown".to_string());
        refs.push((
            ItemKind::Attribute,
            format!("{class_name}.{}", access.attribute_name),
            ValidationRef::Attribute {
                class_name,
                attribute_name: access.attribute_name.clone(),
            },
        ));
    }

    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use codesearch_core::{SuggestedExample, ValidationVerdict};

    struct AlwaysFound;

    #[async_trait]
    impl Validator for AlwaysFound {
        async fn validate(&self, _repository_name: &str, _reference: &ValidationRef) -> ValidationVerdict {
            ValidationVerdict::new(true, 0.95, "found")
        }
    }

    struct AlwaysMissing;

    #[async_trait]
    impl Validator for AlwaysMissing {
        async fn validate(&self, _repository_name: &str, _reference: &ValidationRef) -> ValidationVerdict {
            ValidationVerdict::new(false, 0.3, "missing")
        }
    }

    struct FixedSuggestions;

    #[async_trait]
    impl SuggestionSource for FixedSuggestions {
        async fn suggest(&self, _repository_name: &str, _synopsis: &str, _limit: usize) -> Vec<SuggestedExample> {
            vec![SuggestedExample {
                id: "abc".to_string(),
                full_name: "Widget.spin".to_string(),
                summary: "spins the widget".to_string(),
            }]
        }
    }

    #[tokio::test]
    async fn empty_program_is_low_risk_with_full_confidence() {
        let detector = HallucinationDetector::new(Arc::new(AlwaysFound), None);
        let report = detector.check("empty.py", "", None, false, false).await.unwrap();
        assert_eq!(report.overall_risk.as_str(), "low");
        assert_eq!(report.overall_confidence, 1.0);
        assert!(report.items.is_empty());
    }

    #[tokio::test]
    async fn all_supported_references_yield_low_risk() {
        let detector = HallucinationDetector::new(Arc::new(AlwaysFound), None);
        let report = detector
            .check("script.py", "import widgets\nnoop()\n", None, false, false)
            .await
            .unwrap();
        assert_eq!(report.overall_risk.as_str(), "low");
        assert!(report.items.iter().all(|i| i.supported));
    }

    #[tokio::test]
    async fn unsupported_references_attach_suggested_corrections() {
        let detector = HallucinationDetector::new(Arc::new(AlwaysMissing), Some(Arc::new(FixedSuggestions)));
        let report = detector
            .check("script.py", "noop()\n", None, true, true)
            .await
            .unwrap();
        assert_eq!(report.overall_risk.as_str(), "critical");
        assert!(!report.items[0].supported);
        assert_eq!(report.items[0].suggested_corrections.len(), 1);
        assert!(report.items[0].evidence.is_some());
    }
}
