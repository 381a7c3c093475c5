use serde::{Deserialize, Serialize};
use thiserror::Error;

use sqlscript_analyzer::AnalyzeDiagnostic;
use sqlscript_parser::ParseDiagnostic;
use sqlscript_scanner::ScanDiagnostic;

/// A diagnostic from any stage of the pipeline, collected onto one list
/// so an embedder doesn't need to reach into three different result
/// types to show a script's problems (§6). None of these are fatal on
/// their own — scanning, parsing and analysis each recover and keep
/// going — so they live on [`crate::AnalyzedScript`] rather than being
/// returned as an `Err`.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum AnalyzeError {
    #[error("scan error: {0:?}")]
    Scan(ScanDiagnostic),
    #[error("parse error: {0:?}")]
    Parse(ParseDiagnostic),
    #[error("analysis error: {0:?}")]
    Analyze(AnalyzeDiagnostic),
}
