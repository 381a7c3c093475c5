//! # Analysis diagnostics
//!
//! Unlike the scanner and parser, name resolution doesn't abort on the
//! first problem: a duplicate alias or an ambiguous column reference
//! just leaves that one reference unresolved and the pass keeps going
//! (§4.E, §7).

use serde::{Deserialize, Serialize};
use sqlscript_ast::{Location, NodeId};
use thiserror::Error;

/// The kind of problem found while resolving names. Both variants are
/// non-fatal: the offending table or column reference simply stays
/// unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AnalyzeErrorKind {
    #[error("duplicate table alias")]
    DuplicateTableAlias,
    #[error("ambiguous column reference")]
    ColumnRefAmbiguous,
}

/// One resolution problem, carrying enough context to point an embedder
/// back at the offending source range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeDiagnostic {
    pub kind: AnalyzeErrorKind,
    pub location: Location,
    pub ast_node_id: Option<NodeId>,
    pub message: String,
}
