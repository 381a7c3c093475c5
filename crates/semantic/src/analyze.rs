//! # Analysis entry point
//!
//! Ties the three passes of §4.E/§4.F together in the order the source
//! runs them: scope construction (which also creates `ColumnRef`
//! expressions and registers `CREATE TABLE` declarations), name
//! resolution over the resulting scope tree, expression classification
//! (constants + column transforms), then a final forward walk to stamp
//! `statement_id` on every reference, expression and scope.
//!
//! Nothing here can fail fatally — both collected error kinds
//! (`DUPLICATE_TABLE_ALIAS`, `COLUMN_REF_AMBIGUOUS`) just leave the
//! offending reference unresolved (§7) — so [`analyze`] returns a plain
//! [`crate::model::AnalyzedScript`] rather than a `Result`.

use sqlscript_catalog::Catalog;
use sqlscript_parser::ParsedScript;
use sqlscript_scanner::NamesTable;

use crate::classification::classify_expressions;
use crate::model::AnalyzedScript;
use crate::resolution::{assign_statement_ids, resolve_names};
use crate::scope::build_scopes;

/// Analyze a parsed script against `catalog`, allocating any identifiers
/// `CREATE TABLE` or inline `FROM name(col, ...)` declarations introduce
/// (§4.D, §4.E). `catalog` is taken by `&mut` rather than under an
/// internal lock: the embedder is responsible for serializing concurrent
/// mutation (§5).
#[tracing::instrument(skip(parsed, names, catalog))]
pub fn analyze(parsed: &ParsedScript, names: &mut NamesTable, catalog: &mut Catalog) -> AnalyzedScript {
    let mut analyzed = AnalyzedScript::default();

    let scope_result = build_scopes(&parsed.nodes, names, catalog, &mut analyzed);
    resolve_names(
        &mut analyzed,
        &parsed.nodes,
        &scope_result.root_scopes,
        &scope_result.inline_columns,
        catalog,
        names,
    );

    let mut expr_by_node = scope_result.expr_by_node;
    classify_expressions(&mut analyzed, &parsed.nodes, &mut expr_by_node);

    assign_statement_ids(&mut analyzed, &parsed.statements);
    index_table_declarations(&mut analyzed, catalog);

    analyzed
}

/// Build the `tables_by_unqualified_name` index documented on
/// [`AnalyzedScript`]: a simple derived index built once after all
/// passes have run (column-transform indexing happens inline in
/// [`crate::classification`] since it's a byproduct of the rooting walk).
fn index_table_declarations(analyzed: &mut AnalyzedScript, catalog: &Catalog) {
    for (idx, decl) in analyzed.table_declarations.iter().enumerate() {
        let key = catalog.table_name(decl.table_id).to_ascii_lowercase();
        analyzed.tables_by_unqualified_name.entry(key).or_default().push(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlscript_catalog::Catalog;

    fn analyze_text(text: &str, catalog: &mut Catalog) -> AnalyzedScript {
        let mut scanned = sqlscript_scanner::scan(text);
        let parsed = sqlscript_parser::parse(&scanned);
        analyze(&parsed, &mut scanned.names_table, catalog)
    }

    fn seed_catalog() -> Catalog {
        let mut cat = Catalog::new();
        let db = cat.allocate_database_id("main");
        let schema = cat.allocate_schema_id(db, "public");
        let a = cat.allocate_table_id(schema, "A");
        cat.allocate_column_id(a, "x");
        let c = cat.allocate_table_id(schema, "C");
        cat.allocate_column_id(c, "y");
        cat
    }

    #[test]
    fn scenario_simple_resolved_select() {
        let mut catalog = seed_catalog();
        let analyzed = analyze_text("select * from A b, C d where b.x = d.y", &mut catalog);
        assert!(analyzed.errors.is_empty());
        assert_eq!(analyzed.table_references.len(), 2);
        assert!(analyzed.table_references.iter().all(|r| r.resolved_table.is_some()));
        let resolved_columns: Vec<_> = analyzed
            .expressions
            .iter()
            .filter_map(|e| match &e.kind {
                crate::model::ExpressionKind::ColumnRef { resolved_column, .. } => *resolved_column,
                _ => None,
            })
            .collect();
        assert_eq!(resolved_columns.len(), 2);
    }

    #[test]
    fn scenario_duplicate_alias() {
        let mut catalog = seed_catalog();
        let analyzed = analyze_text("select 1 from A x, C x", &mut catalog);
        assert_eq!(analyzed.errors.len(), 1);
        assert_eq!(analyzed.errors[0].kind, crate::error::AnalyzeErrorKind::DuplicateTableAlias);
        assert_eq!(analyzed.table_references.len(), 2);
    }

    #[test]
    fn scenario_ambiguous_column() {
        let mut catalog = Catalog::new();
        let db = catalog.allocate_database_id("main");
        let schema = catalog.allocate_schema_id(db, "public");
        let r = catalog.allocate_table_id(schema, "R");
        catalog.allocate_column_id(r, "k");
        let s = catalog.allocate_table_id(schema, "S");
        catalog.allocate_column_id(s, "k");

        let analyzed = analyze_text("select k from R, S", &mut catalog);
        assert_eq!(analyzed.errors.len(), 1);
        assert_eq!(analyzed.errors[0].kind, crate::error::AnalyzeErrorKind::ColumnRefAmbiguous);
        assert!(analyzed.errors[0].message.contains("r.k"));
        assert!(analyzed.errors[0].message.contains("s.k"));
    }

    #[test]
    fn scenario_column_transform_root() {
        let mut catalog = Catalog::new();
        let analyzed = analyze_text("select (a + 1) * 2 from T(a)", &mut catalog);
        assert_eq!(analyzed.column_transforms.len(), 1);
        let transform = analyzed.column_transforms[0];
        let root = &analyzed.expressions[transform.root_expression_id.0 as usize];
        assert!(root.is_column_transform);
        let col_ref = &analyzed.expressions[transform.column_ref_expression_id.0 as usize];
        assert!(matches!(col_ref.kind, crate::model::ExpressionKind::ColumnRef { .. }));
    }

    #[test]
    fn reanalysis_is_idempotent() {
        let mut catalog = seed_catalog();
        let first = analyze_text("select * from A b, C d where b.x = d.y", &mut catalog);
        let second = analyze_text("select * from A b, C d where b.x = d.y", &mut catalog);
        assert_eq!(first.table_references.len(), second.table_references.len());
        assert_eq!(first.errors, second.errors);
    }

    #[test]
    fn scope_construction_tags_column_and_alias_names() {
        use sqlscript_scanner::NameTag;

        let mut catalog = seed_catalog();
        let mut scanned = sqlscript_scanner::scan("select * from A b where b.x = 1");
        let parsed = sqlscript_parser::parse(&scanned);
        analyze(&parsed, &mut scanned.names_table, &mut catalog);

        let b_id = (0..scanned.names_table.len() as u32)
            .map(sqlscript_scanner::NameId)
            .find(|id| scanned.names_table.text(*id) == "b")
            .expect("alias `b` was interned");
        assert!(scanned.names_table.tags(b_id).contains(NameTag::TABLE_ALIAS));

        let x_id = (0..scanned.names_table.len() as u32)
            .map(sqlscript_scanner::NameId)
            .find(|id| scanned.names_table.text(*id) == "x")
            .expect("column name `x` was interned");
        assert!(!scanned.names_table.tags(x_id).contains(NameTag::COLUMN_NAME));
    }

    #[test]
    fn scope_construction_tags_declared_column_names() {
        let mut catalog = Catalog::new();
        let mut scanned = sqlscript_scanner::scan("create table t (a int, b int)");
        let parsed = sqlscript_parser::parse(&scanned);
        analyze(&parsed, &mut scanned.names_table, &mut catalog);

        let a_id = (0..scanned.names_table.len() as u32)
            .map(sqlscript_scanner::NameId)
            .find(|id| scanned.names_table.text(*id) == "a")
            .expect("column name `a` was interned");
        assert!(scanned.names_table.tags(a_id).contains(sqlscript_scanner::NameTag::COLUMN_NAME));
    }
}
