//! Deterministic summary construction (§4.G step 4).
//!
//! Ported from the teacher's `SemanticTextBuilder` idiom (graph metadata →
//! structured description), rewritten to the spec's fixed five-field
//! template instead of the teacher's free-form code-aware summarizer, so
//! the same graph always yields byte-identical summaries.

use codesearch_core::ExtractionRecord;

/// Build the summary string embedded for one extraction record.
pub fn build_summary(record: &ExtractionRecord) -> String {
    let params = if record.parameters.is_empty() {
        "no parameters".to_string()
    } else {
        record
            .parameters
            .iter()
            .map(|p| match &p.type_hint {
                Some(t) => format!("{}: {}", p.name, t),
                None => p.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    };
    let return_type = record.return_type.as_deref().unwrap_or("unknown");

    format!(
        "{kind} {full_name} with parameters ({params}) returning {return_type}, defined in {file_path}.",
        kind = record.kind,
        full_name = record.full_name,
        params = params,
        return_type = return_type,
        file_path = record.file_path,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use codesearch_core::{EntityKind, Parameter};

    #[test]
    fn summary_is_deterministic_for_the_same_record() {
        let record = ExtractionRecord {
            kind: EntityKind::Method,
            name: "spin".to_string(),
            full_name: "Widget.spin".to_string(),
            class_name: Some("Widget".to_string()),
            file_path: "widgets/core.py".to_string(),
            module_name: "widgets.core".to_string(),
            parameters: vec![Parameter::new("self", None), Parameter::new("speed", Some("int".to_string()))],
            return_type: Some("bool".to_string()),
        };
        let a = build_summary(&record);
        let b = build_summary(&record);
        assert_eq!(a, b);
        assert!(a.contains("Widget.spin"));
        assert!(a.contains("speed: int"));
        assert!(a.contains("bool"));
        assert!(a.contains("widgets/core.py"));
    }

    #[test]
    fn summary_handles_missing_return_type_and_parameters() {
        let record = ExtractionRecord {
            kind: EntityKind::Function,
            name: "noop".to_string(),
            full_name: "noop".to_string(),
            class_name: None,
            file_path: "a.py".to_string(),
            module_name: "a".to_string(),
            parameters: Vec::new(),
            return_type: None,
        };
        let summary = build_summary(&record);
        assert!(summary.contains("no parameters"));
        assert!(summary.contains("unknown"));
    }
}
