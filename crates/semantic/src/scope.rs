//! # Scope construction
//!
//! A single bottom-up walk over the AST that:
//!
//! - accumulates table references, column references and pending column
//!   definitions into a per-node [`NodeState`], merging every child's
//!   state into its parent as it goes (§4.E's "node state" accumulator);
//! - opens a new [`crate::model::NameScope`] whenever it reaches a
//!   `SELECT` or `CREATE` object node, migrating the accumulator's
//!   contents into the new scope and stamping `parent_scope` on any
//!   scopes nested inside it;
//! - registers `CREATE TABLE` column definitions into the shared
//!   catalog, sorted by name, so each gets a positional `ColumnId`
//!   matching its alphabetical `column_index` (§4.E);
//! - tags the interned name of a `COLUMN_DEF` with `NameTag::COLUMN_NAME`
//!   and an explicit `TABLEREF` alias with `NameTag::TABLE_ALIAS` as each
//!   is discovered, the same two sites the source tags in its own
//!   visitor (§3's "coarse tag bitmap per name").
//!
//! Column references are created here too (not in the classification
//! pass) because §4.E requires every `ColumnRef` to be tagged
//! `is_column_transform = true` the moment it's discovered — it's the
//! identity transform every chain terminates at.

use std::collections::{BTreeSet, HashMap};

use sqlscript_ast::{lookup_attribute, AttributeKey, NodeId, NodeStore, NodeType};
use sqlscript_catalog::Catalog;
use sqlscript_parser::QualifiedNameParts;
use sqlscript_scanner::{NameId, NameTag, NamesTable};

use crate::ids::{ExpressionId, ScopeId};
use crate::model::{
    AnalyzedScript, Expression, ExpressionKind, NameScope, TableDeclaration, TableReference,
};

/// Per-node accumulator merged bottom-up; drained into a [`NameScope`]
/// whenever a `SELECT`/`CREATE` boundary is crossed.
#[derive(Debug, Default)]
struct NodeState {
    child_scopes: Vec<ScopeId>,
    table_columns: Vec<(NodeId, NameId)>,
    table_references: Vec<usize>,
    expressions: Vec<ExpressionId>,
}

impl NodeState {
    fn merge(&mut self, other: &mut NodeState) {
        self.child_scopes.append(&mut other.child_scopes);
        self.table_columns.append(&mut other.table_columns);
        self.table_references.append(&mut other.table_references);
        self.expressions.append(&mut other.expressions);
    }
}

/// Read a `SQL_QUALIFIED_NAME` object node's catalog/schema/relation
/// attributes straight off the AST, mirroring the source's
/// `ReadQualifiedTableName`/`ReadQualifiedColumnName` helpers.
fn read_qualified_name(nodes: &NodeStore, qualified_name_node: NodeId) -> QualifiedNameParts {
    let catalog = lookup_attribute(nodes, qualified_name_node, AttributeKey::SqlQualifiedNameCatalog)
        .map(|n| NameId(nodes.get(n).children_begin_or_value));
    let schema = lookup_attribute(nodes, qualified_name_node, AttributeKey::SqlQualifiedNameSchema)
        .map(|n| NameId(nodes.get(n).children_begin_or_value));
    let relation_node = lookup_attribute(nodes, qualified_name_node, AttributeKey::SqlQualifiedNameRelation)
        .expect("qualified name node always carries a relation component");
    let relation = NameId(nodes.get(relation_node).children_begin_or_value);
    QualifiedNameParts { catalog, schema, relation }
}

/// The outcome of the scope-building walk: every root scope (there is
/// never more than one level of nesting in this grammar, but the
/// mechanism is general), the column lists pending for inline table
/// synthesis, and a `NodeId -> ExpressionId` index the classification
/// pass extends with every other expression kind.
pub(crate) struct ScopeBuildResult {
    pub root_scopes: BTreeSet<ScopeId>,
    pub inline_columns: HashMap<usize, Vec<NameId>>,
    pub expr_by_node: HashMap<NodeId, ExpressionId>,
}

pub(crate) fn build_scopes(
    nodes: &NodeStore,
    names: &mut NamesTable,
    catalog: &mut Catalog,
    analyzed: &mut AnalyzedScript,
) -> ScopeBuildResult {
    let mut node_states: Vec<NodeState> = (0..nodes.len()).map(|_| NodeState::default()).collect();
    let mut root_scopes: BTreeSet<ScopeId> = BTreeSet::new();
    let mut inline_columns: HashMap<usize, Vec<NameId>> = HashMap::new();
    let mut expr_by_node: HashMap<NodeId, ExpressionId> = HashMap::new();

    for id in nodes.iter_bottom_up() {
        let node_type = nodes.get(id).node_type;

        // Merge every child's already-finalized state into this node's,
        // splitting the vec so both sides can be borrowed mutably at
        // once (a child's index is always strictly less than its
        // parent's).
        if node_type.is_array() || node_type.is_object() {
            let children: Vec<NodeId> = nodes.children_of(id).to_vec();
            let elements_only = if node_type == NodeType::ObjectSqlCreate {
                lookup_attribute(nodes, id, AttributeKey::SqlCreateElements)
            } else {
                None
            };
            for child in children {
                if node_type == NodeType::ObjectSqlCreate && Some(child) != elements_only {
                    // §4.E: CREATE merges only its `elements` child, not `name`.
                    continue;
                }
                let (left, right) = node_states.split_at_mut(id.index());
                right[0].merge(&mut left[child.index()]);
            }
        }

        match node_type {
            NodeType::ObjectSqlColumnDef => {
                let Some(name_node) = lookup_attribute(nodes, id, AttributeKey::SqlColumnDefName) else {
                    continue;
                };
                let name = NameId(nodes.get(name_node).children_begin_or_value);
                names.mark(name, NameTag::COLUMN_NAME);
                node_states[id.index()].table_columns.push((id, name));
            }
            NodeType::ObjectSqlColumnRef => {
                let Some(path_node) = lookup_attribute(nodes, id, AttributeKey::SqlColumnRefPath) else {
                    continue;
                };
                let parts = read_qualified_name(nodes, path_node);
                let expr_id = ExpressionId(analyzed.expressions.len() as u32);
                analyzed.expressions.push(Expression {
                    ast_node_id: id,
                    kind: ExpressionKind::ColumnRef {
                        table_alias: parts.schema,
                        column_name: parts.relation,
                        resolved_column: None,
                    },
                    is_constant: false,
                    is_column_transform: true,
                    target_expression_id: None,
                    statement_id: None,
                });
                expr_by_node.insert(id, expr_id);
                node_states[id.index()].expressions.push(expr_id);
            }
            NodeType::ObjectSqlTableRef => {
                let Some(name_node) = lookup_attribute(nodes, id, AttributeKey::SqlTableRefName) else {
                    continue;
                };
                let name = read_qualified_name(nodes, name_node);
                let alias = lookup_attribute(nodes, id, AttributeKey::SqlTableRefAlias)
                    .map(|n| NameId(nodes.get(n).children_begin_or_value));
                if let Some(alias) = alias {
                    names.mark(alias, NameTag::TABLE_ALIAS);
                }
                let ref_idx = analyzed.table_references.len();
                analyzed.table_references.push(TableReference {
                    ast_node_id: id,
                    alias,
                    name,
                    resolved_table: None,
                    resolved_alternatives: Vec::new(),
                    scope_id: None,
                    statement_id: None,
                });
                if let Some(cols_node) = lookup_attribute(nodes, id, AttributeKey::SqlTableRefColumns) {
                    let cols: Vec<NameId> = nodes
                        .children_of(cols_node)
                        .iter()
                        .map(|c| NameId(nodes.get(*c).children_begin_or_value))
                        .collect();
                    inline_columns.insert(ref_idx, cols);
                }
                node_states[id.index()].table_references.push(ref_idx);
            }
            NodeType::ObjectSqlSelect => {
                let mut state = std::mem::take(&mut node_states[id.index()]);
                create_scope(analyzed, &mut root_scopes, &mut state, id);
                node_states[id.index()] = state;
            }
            NodeType::ObjectSqlCreate => {
                let mut state = std::mem::take(&mut node_states[id.index()]);
                register_table_declaration(nodes, names, catalog, analyzed, id, &state);
                create_scope(analyzed, &mut root_scopes, &mut state, id);
                node_states[id.index()] = state;
            }
            _ => {}
        }
    }

    ScopeBuildResult { root_scopes, inline_columns, expr_by_node }
}

/// Sort a `CREATE`'s pending columns by name and register them into the
/// catalog in that order, so `ColumnId` ordinals match `column_index`.
fn register_table_declaration(
    nodes: &NodeStore,
    names: &NamesTable,
    catalog: &mut Catalog,
    analyzed: &mut AnalyzedScript,
    create_node_id: NodeId,
    state: &NodeState,
) {
    let Some(name_node) = lookup_attribute(nodes, create_node_id, AttributeKey::SqlCreateName) else {
        return;
    };
    let name = read_qualified_name(nodes, name_node);

    let catalog_name = name.catalog.map(|n| names.text(n)).unwrap_or("");
    let schema_name = name.schema.map(|n| names.text(n)).unwrap_or("");
    let relation_name = names.text(name.relation);

    let database_id = catalog.allocate_database_id(catalog_name);
    let schema_id = catalog.allocate_schema_id(database_id, schema_name);
    let table_id = catalog.allocate_table_id(schema_id, relation_name);

    let mut columns = state.table_columns.clone();
    columns.sort_by(|a, b| names.text(a.1).cmp(names.text(b.1)));
    for (_, column_name) in &columns {
        catalog.allocate_column_id(table_id, names.text(*column_name));
    }

    analyzed.table_declarations.push(TableDeclaration {
        ast_node_id: create_node_id,
        database_id,
        schema_id,
        table_id,
        name,
    });
}

/// Drain `state` into a freshly created scope, stamping `parent_scope`
/// on every scope nested directly inside it, and leave `state` holding
/// just that new scope as its own sole child (§4.E).
fn create_scope(
    analyzed: &mut AnalyzedScript,
    root_scopes: &mut BTreeSet<ScopeId>,
    state: &mut NodeState,
    ast_node_id: NodeId,
) {
    let id = ScopeId(analyzed.name_scopes.len() as u32);
    for child in &state.child_scopes {
        analyzed.name_scopes[child.0 as usize].parent_scope = Some(id);
        root_scopes.remove(child);
    }
    let scope = NameScope {
        id,
        ast_node_id,
        parent_scope: None,
        child_scopes: std::mem::take(&mut state.child_scopes),
        table_references: std::mem::take(&mut state.table_references),
        expressions: std::mem::take(&mut state.expressions),
        referenced_tables_by_name: HashMap::new(),
        statement_id: None,
    };
    analyzed.name_scopes.push(scope);
    root_scopes.insert(id);
    state.child_scopes = vec![id];
}
