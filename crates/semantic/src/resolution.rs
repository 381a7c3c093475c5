//! # Name resolution
//!
//! Two-stage resolution over the scope tree built by [`crate::scope`]
//! (§4.E): root scopes are processed top-down via a work stack. For
//! each scope, every table reference is resolved first (so its alias
//! is registered before any column lookup needs it), then every column
//! reference still unresolved is retried against that scope's aliases,
//! and on failure against each ancestor scope in turn.
//!
//! Table refs with no catalog match but an inline `(col, ...)` list
//! synthesize a fresh catalog table on the spot — this is how
//! `FROM t(a, b)` works without a preceding `CREATE TABLE t` (§4.D,
//! §4.E, worked scenario 4).

use std::collections::BTreeSet;

use sqlscript_ast::NodeStore;
use sqlscript_catalog::{Catalog, TableLookup};
use sqlscript_parser::Statement;
use sqlscript_scanner::{NameId, NamesTable};

use crate::error::{AnalyzeDiagnostic, AnalyzeErrorKind};
use crate::ids::ScopeId;
use crate::model::{AnalyzedScript, ExpressionKind, ResolvedColumn, ResolvedTableEntry, TableDeclaration};

/// Mirrors the source's fixed cap on how many alternatives a single
/// ambiguous table reference keeps around.
const MAX_TABLE_REF_AMBIGUITY: usize = 100;

pub(crate) fn resolve_names(
    analyzed: &mut AnalyzedScript,
    nodes: &NodeStore,
    root_scopes: &BTreeSet<ScopeId>,
    inline_columns: &std::collections::HashMap<usize, Vec<NameId>>,
    catalog: &mut Catalog,
    names: &NamesTable,
) {
    let mut pending: Vec<ScopeId> = root_scopes.iter().copied().collect();
    while let Some(scope_id) = pending.pop() {
        resolve_table_refs_in_scope(analyzed, nodes, scope_id, inline_columns, catalog, names);
        resolve_column_refs_in_scope(analyzed, nodes, scope_id, catalog, names);
        let children = analyzed.name_scopes[scope_id.0 as usize].child_scopes.clone();
        pending.extend(children);
    }
}

fn resolve_table_refs_in_scope(
    analyzed: &mut AnalyzedScript,
    nodes: &NodeStore,
    scope_id: ScopeId,
    inline_columns: &std::collections::HashMap<usize, Vec<NameId>>,
    catalog: &mut Catalog,
    names: &NamesTable,
) {
    let ref_indices = analyzed.name_scopes[scope_id.0 as usize].table_references.clone();
    for ref_idx in ref_indices {
        let name = analyzed.table_references[ref_idx].name;
        let catalog_text = name.catalog.map(|id| names.text(id));
        let schema_text = name.schema.map(|id| names.text(id));
        let relation_text = names.text(name.relation);

        let lookup = TableLookup { catalog: catalog_text, schema: schema_text, relation: relation_text };
        let mut matches = Vec::new();
        catalog.resolve_table(&lookup, None, &mut matches, MAX_TABLE_REF_AMBIGUITY);

        if matches.is_empty() {
            if let Some(cols) = inline_columns.get(&ref_idx) {
                let database_id = catalog.allocate_database_id(catalog_text.unwrap_or(""));
                let schema_id = catalog.allocate_schema_id(database_id, schema_text.unwrap_or(""));
                let table_id = catalog.allocate_table_id(schema_id, relation_text);
                for col in cols {
                    catalog.allocate_column_id(table_id, names.text(*col));
                }
                if !analyzed.table_declarations.iter().any(|d| d.table_id == table_id) {
                    analyzed.table_declarations.push(TableDeclaration {
                        ast_node_id: analyzed.table_references[ref_idx].ast_node_id,
                        database_id,
                        schema_id,
                        table_id,
                        name,
                    });
                }
                matches.push(sqlscript_catalog::TableMatch {
                    database_id,
                    schema_id,
                    table_id,
                    specificity: 0,
                    rank: catalog.table_rank(table_id),
                });
            }
        }

        let Some(best) = matches.first().copied() else { continue };

        let alias_text = analyzed.table_references[ref_idx]
            .alias
            .map(|n| names.text(n).to_string())
            .unwrap_or_else(|| catalog.table_name(best.table_id).to_string());
        let key = alias_text.to_ascii_lowercase();

        let scope = &mut analyzed.name_scopes[scope_id.0 as usize];
        if scope.referenced_tables_by_name.contains_key(&key) {
            let ast_node_id = analyzed.table_references[ref_idx].ast_node_id;
            analyzed.errors.push(AnalyzeDiagnostic {
                kind: AnalyzeErrorKind::DuplicateTableAlias,
                location: nodes.get(ast_node_id).location,
                ast_node_id: Some(ast_node_id),
                message: format!("duplicate table alias '{alias_text}'"),
            });
        } else {
            scope.referenced_tables_by_name.insert(key, ref_idx);
        }

        let reference = &mut analyzed.table_references[ref_idx];
        reference.scope_id = Some(scope_id);
        reference.resolved_table = Some(ResolvedTableEntry {
            database_id: best.database_id,
            schema_id: best.schema_id,
            table_id: best.table_id,
        });
        reference.resolved_alternatives = matches[1..]
            .iter()
            .map(|m| ResolvedTableEntry { database_id: m.database_id, schema_id: m.schema_id, table_id: m.table_id })
            .collect();
    }
}

fn resolve_column_refs_in_scope(
    analyzed: &mut AnalyzedScript,
    nodes: &NodeStore,
    scope_id: ScopeId,
    catalog: &Catalog,
    names: &NamesTable,
) {
    let mut unresolved: Vec<crate::ids::ExpressionId> = analyzed.name_scopes[scope_id.0 as usize]
        .expressions
        .iter()
        .copied()
        .filter(|eid| matches!(&analyzed.expressions[eid.0 as usize].kind, ExpressionKind::ColumnRef { resolved_column: None, .. }))
        .collect();

    let mut target = Some(scope_id);
    while let Some(tid) = target {
        let mut still_unresolved = Vec::new();
        for eid in unresolved {
            let (table_alias, column_name) = match &analyzed.expressions[eid.0 as usize].kind {
                ExpressionKind::ColumnRef { table_alias, column_name, .. } => (*table_alias, *column_name),
                _ => unreachable!("scope only ever accumulates ColumnRef expressions"),
            };

            let resolved = if let Some(alias) = table_alias {
                resolve_qualified(analyzed, tid, catalog, names, alias, column_name)
            } else {
                resolve_unqualified(analyzed, nodes, tid, catalog, names, eid, column_name)
            };

            if let Some((entry, column_id)) = resolved {
                if let ExpressionKind::ColumnRef { resolved_column, .. } = &mut analyzed.expressions[eid.0 as usize].kind {
                    *resolved_column = Some(ResolvedColumn {
                        database_id: entry.database_id,
                        schema_id: entry.schema_id,
                        table_id: entry.table_id,
                        column_id,
                    });
                }
            } else {
                still_unresolved.push(eid);
            }
        }
        unresolved = still_unresolved;
        if unresolved.is_empty() {
            break;
        }
        target = analyzed.name_scopes[tid.0 as usize].parent_scope;
    }
}

fn resolve_qualified(
    analyzed: &AnalyzedScript,
    scope_id: ScopeId,
    catalog: &Catalog,
    names: &NamesTable,
    alias: NameId,
    column_name: NameId,
) -> Option<(ResolvedTableEntry, sqlscript_catalog::ColumnId)> {
    let alias_key = names.text(alias).to_ascii_lowercase();
    let ref_idx = *analyzed.name_scopes[scope_id.0 as usize].referenced_tables_by_name.get(&alias_key)?;
    let entry = analyzed.table_references[ref_idx].resolved_table?;
    let column_id = catalog.resolve_column(entry.table_id, names.text(column_name))?;
    Some((entry, column_id))
}

fn resolve_unqualified(
    analyzed: &mut AnalyzedScript,
    nodes: &NodeStore,
    scope_id: ScopeId,
    catalog: &Catalog,
    names: &NamesTable,
    expr_id: crate::ids::ExpressionId,
    column_name: NameId,
) -> Option<(ResolvedTableEntry, sqlscript_catalog::ColumnId)> {
    let mut candidates: Vec<(usize, ResolvedTableEntry, sqlscript_catalog::ColumnId)> = Vec::new();
    for &ref_idx in analyzed.name_scopes[scope_id.0 as usize].referenced_tables_by_name.values() {
        let Some(entry) = analyzed.table_references[ref_idx].resolved_table else { continue };
        if let Some(column_id) = catalog.resolve_column(entry.table_id, names.text(column_name)) {
            candidates.push((ref_idx, entry, column_id));
        }
    }

    if candidates.len() > 1 {
        let ast_node_id = analyzed.expressions[expr_id.0 as usize].ast_node_id;
        let mut labels: Vec<String> = candidates
            .iter()
            .map(|(ref_idx, entry, _)| {
                let alias = analyzed.table_references[*ref_idx]
                    .alias
                    .map(|n| names.text(n).to_string())
                    .unwrap_or_else(|| catalog.table_name(entry.table_id).to_string());
                format!("{}.{}", alias.to_ascii_lowercase(), names.text(column_name).to_ascii_lowercase())
            })
            .collect();
        labels.sort();
        analyzed.errors.push(AnalyzeDiagnostic {
            kind: AnalyzeErrorKind::ColumnRefAmbiguous,
            location: nodes.get(ast_node_id).location,
            ast_node_id: Some(ast_node_id),
            message: format!("column reference is ambiguous, candidates: {}", labels.join(", ")),
        });
        return None;
    }

    candidates.into_iter().next().map(|(_, entry, column_id)| (entry, column_id))
}

/// Assign each item in `items` the index of the statement whose AST
/// range it falls in, via one forward walk: statements are laid out so
/// that every node belonging to statement `i` has an id no greater than
/// `statements[i].root_node_id`, and strictly greater than
/// `statements[i - 1].root_node_id` (§4.E).
fn assign_ids<T>(
    items: &mut [T],
    statements: &[Statement],
    node_id: impl Fn(&T) -> sqlscript_ast::NodeId,
    set: impl Fn(&mut T, Option<usize>),
) {
    let mut stmt_idx = 0usize;
    for item in items.iter_mut() {
        let id = node_id(item);
        while stmt_idx < statements.len() && statements[stmt_idx].root_node_id.0 < id.0 {
            stmt_idx += 1;
        }
        set(item, (stmt_idx < statements.len()).then_some(stmt_idx));
    }
}

pub(crate) fn assign_statement_ids(analyzed: &mut AnalyzedScript, statements: &[Statement]) {
    assign_ids(&mut analyzed.table_references, statements, |r| r.ast_node_id, |r, s| r.statement_id = s);
    assign_ids(&mut analyzed.expressions, statements, |e| e.ast_node_id, |e, s| e.statement_id = s);
    assign_ids(&mut analyzed.name_scopes, statements, |s| s.ast_node_id, |s, v| s.statement_id = v);
}
