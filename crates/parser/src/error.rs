//! # Parser diagnostics
//!
//! Grammar errors never abort parsing: the driver recovers to the next
//! statement boundary and collects the error into
//! [`crate::ParsedScript::errors`].

use serde::{Deserialize, Serialize};
use sqlscript_ast::Location;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ParseErrorKind {
    #[error("grammar error")]
    Grammar,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostic {
    pub kind: ParseErrorKind,
    pub location: Location,
    pub message: String,
}
