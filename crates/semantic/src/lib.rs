//! # sqlscript Analyzer
//!
//! Name-resolution and expression-classification passes over a parsed
//! script (§4.E, §4.F): schema registration against a [`sqlscript_catalog::Catalog`],
//! lexical scope-building, table/column reference resolution, constant
//! folding, and column-transform detection.
//!
//! The single entry point is [`analyze`]; everything else in this crate
//! is implementation detail of that one pass sequence plus the
//! [`model::AnalyzedScript`] it produces.

pub mod analyze;
pub mod classification;
pub mod error;
pub mod ids;
pub mod model;
pub mod resolution;
pub mod scope;
pub mod util;

pub use analyze::analyze;
pub use error::{AnalyzeDiagnostic, AnalyzeErrorKind};
pub use ids::{ExpressionId, ScopeId};
pub use model::{
    AnalyzedScript, ColumnTransform, Expression, ExpressionKind, LiteralType, NameScope,
    ResolvedColumn, ResolvedTableEntry, TableDeclaration, TableReference,
};
