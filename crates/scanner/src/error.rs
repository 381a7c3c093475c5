//! # Scanner diagnostics
//!
//! Lexical errors never abort scanning: they are collected into
//! [`ScannedScript::errors`](crate::scanner::ScannedScript::errors) so the
//! rest of the text still produces a usable symbol stream.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sqlscript_ast::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ScanErrorKind {
    #[error("invalid literal")]
    InvalidLiteral,
    #[error("invalid parameter")]
    InvalidParameter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanDiagnostic {
    pub kind: ScanErrorKind,
    pub location: Location,
    pub message: String,
}
