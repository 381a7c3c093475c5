//! # Analyzed-script data model
//!
//! The output of [`crate::analyze`]: every table declaration, table
//! reference, expression and name scope discovered in a parsed script,
//! cross-linked by the ids defined in [`crate::ids`] plus the shared
//! [`sqlscript_catalog::Catalog`] ids they resolved against.
//!
//! Column lists aren't duplicated here: a [`TableDeclaration`] names a
//! catalog `TableId` and its columns are read back via
//! `Catalog::columns_of` — every declared or inline-synthesized table is
//! registered in the one shared catalog (see DESIGN.md), so there is no
//! separate script-local column list to keep in sync.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlscript_ast::NodeId;
use sqlscript_catalog::{ColumnId, DatabaseId, SchemaId, TableId};
use sqlscript_parser::QualifiedNameParts;
use sqlscript_scanner::NameId;

use crate::error::AnalyzeDiagnostic;
use crate::ids::{ExpressionId, ScopeId};

/// A table known to have been declared in this script, either via
/// `CREATE TABLE` or synthesized from a `FROM name(col, ...)` inline
/// column list that didn't match anything already in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDeclaration {
    pub ast_node_id: NodeId,
    pub database_id: DatabaseId,
    pub schema_id: SchemaId,
    pub table_id: TableId,
    pub name: QualifiedNameParts,
}

/// A catalog table a reference resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTableEntry {
    pub database_id: DatabaseId,
    pub schema_id: SchemaId,
    pub table_id: TableId,
}

/// A catalog column a column reference resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedColumn {
    pub database_id: DatabaseId,
    pub schema_id: SchemaId,
    pub table_id: TableId,
    pub column_id: ColumnId,
}

/// A `FROM` item. `resolved_table` is the first (most specific, then
/// highest-ranked) catalog match; `resolved_alternatives` holds the rest,
/// capped by the ambiguity limit used during resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReference {
    pub ast_node_id: NodeId,
    pub alias: Option<NameId>,
    pub name: QualifiedNameParts,
    pub resolved_table: Option<ResolvedTableEntry>,
    pub resolved_alternatives: Vec<ResolvedTableEntry>,
    pub scope_id: Option<ScopeId>,
    pub statement_id: Option<usize>,
}

/// The literal kind a constant-folds-to-itself expression carries. The
/// original distinguishes these by subtracting a fixed offset from the
/// parser's node-type enum; Rust enum discriminants aren't guaranteed
/// contiguous across an evolving `NodeType`, so this is an explicit
/// mapping instead (see [`LiteralType::from_node_type`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiteralType {
    Null,
    Boolean,
    Integer,
    Float,
    String,
}

impl LiteralType {
    pub fn from_node_type(node_type: sqlscript_ast::NodeType) -> Option<Self> {
        use sqlscript_ast::NodeType;
        match node_type {
            NodeType::LiteralNull => Some(Self::Null),
            NodeType::LiteralBoolean => Some(Self::Boolean),
            NodeType::LiteralInteger => Some(Self::Integer),
            NodeType::LiteralFloat => Some(Self::Float),
            NodeType::LiteralString => Some(Self::String),
            _ => None,
        }
    }
}

/// The shape of one expression node, as classified during analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExpressionKind {
    ColumnRef {
        table_alias: Option<NameId>,
        column_name: NameId,
        resolved_column: Option<ResolvedColumn>,
    },
    Literal {
        literal_type: LiteralType,
    },
    Binary {
        op: sqlscript_ast::ExpressionOperator,
        left: ExpressionId,
        right: ExpressionId,
    },
    Unary {
        op: sqlscript_ast::ExpressionOperator,
        operand: ExpressionId,
    },
    FunctionCall {
        name: NameId,
        args: Vec<ExpressionId>,
    },
}

/// One expression node plus the results of the constant and
/// column-transform classification passes (§4.F).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expression {
    pub ast_node_id: NodeId,
    pub kind: ExpressionKind,
    /// True iff every operand (recursively) is a literal.
    pub is_constant: bool,
    /// True iff this expression is a computation over exactly one
    /// non-constant operand — a "column transform" in §4.F's terms. A
    /// bare `ColumnRef` is tagged `true` too: it's the identity
    /// transform every transform chain bottoms out at.
    pub is_column_transform: bool,
    /// For a column transform, the one non-constant operand driving it;
    /// `None` for a `ColumnRef` (the chain's terminal node).
    pub target_expression_id: Option<ExpressionId>,
    pub statement_id: Option<usize>,
}

/// A name-resolution scope, rooted at a `SELECT` or `CREATE` AST node.
/// `table_references`/`expressions` hold only what was accumulated
/// directly inside this scope's own statement — nested scopes consume
/// their own refs at their own `CREATE` boundary, so nothing here is
/// double-counted (§4.E).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameScope {
    pub id: ScopeId,
    pub ast_node_id: NodeId,
    pub parent_scope: Option<ScopeId>,
    pub child_scopes: Vec<ScopeId>,
    pub table_references: Vec<usize>,
    pub expressions: Vec<ExpressionId>,
    pub referenced_tables_by_name: HashMap<String, usize>,
    pub statement_id: Option<usize>,
}

/// A resolved column transform: the root expression of a transform
/// chain plus the `ColumnRef` expression it ultimately computes over.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ColumnTransform {
    pub root_expression_id: ExpressionId,
    pub column_ref_expression_id: ExpressionId,
}

/// The complete result of analyzing one parsed script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzedScript {
    pub table_declarations: Vec<TableDeclaration>,
    pub table_references: Vec<TableReference>,
    pub expressions: Vec<Expression>,
    pub name_scopes: Vec<NameScope>,
    pub column_transforms: Vec<ColumnTransform>,
    pub errors: Vec<AnalyzeDiagnostic>,
    pub tables_by_unqualified_name: HashMap<String, Vec<usize>>,
    pub column_transforms_by_column: HashMap<ColumnId, Vec<usize>>,
}
