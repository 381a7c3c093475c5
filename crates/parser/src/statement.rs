//! # Statements
//!
//! A script is an ordered sequence of statements, each covering a
//! contiguous slice of the flat node array via `root_node_id`.

use serde::{Deserialize, Serialize};
use sqlscript_ast::NodeId;

use crate::qualified_name::QualifiedNameParts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementType {
    Select,
    Create,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub statement_type: StatementType,
    pub root_node_id: NodeId,
    pub name: Option<QualifiedNameParts>,
    /// `(table ref node id, qualified name)` pairs accumulated while
    /// parsing this statement's body.
    pub table_refs: Vec<(NodeId, QualifiedNameParts)>,
    pub column_refs: Vec<NodeId>,
}
