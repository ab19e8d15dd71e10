//! codesearch-analyzer - static analysis, structural validation, and
//! hallucination detection (§4.H, §4.I, §4.K).

pub mod error;
pub mod hallucination;
pub mod static_analyser;
pub mod validator;

pub use error::{AnalyzerError, Result};
pub use hallucination::{
    HallucinationDetector, HallucinationReport, ItemKind, OverallRisk, ReportItem, SuggestedCorrection,
};
pub use static_analyser::{
    AnalysisResult, AttributeAccessRef, ClassInstantiationRef, FunctionCallRef, ImportRef, MethodCallRef,
    StaticAnalyser,
};
pub use validator::Validator;
