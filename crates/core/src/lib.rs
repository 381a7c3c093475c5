//! # sqlscript Core
//!
//! The facade an embedder actually talks to: [`ScriptAnalyzer::analyze`]
//! runs the scanner, parser and analyzer over one script in sequence and
//! hands back the combined result; [`ScriptAnalyzer::move_cursor`] maps a
//! byte offset in that result back onto the scanner symbol, statement,
//! AST node and (if applicable) table/column reference under it (§6).
//!
//! Nothing in this pipeline aborts on bad input — the scanner, parser
//! and analyzer all recover and keep going — so [`ScriptAnalyzer::analyze`]
//! is infallible: problems show up as entries in the returned
//! [`AnalyzedScript`]'s `errors()`, not as an `Err`.

pub mod cursor;
pub mod error;

use sqlscript_catalog::Catalog;
use sqlscript_parser::ParsedScript;
use sqlscript_scanner::ScannedScript;

pub use cursor::{Cursor, CursorContext};
pub use error::AnalyzeError;

/// Everything produced by analyzing one script: the scan, the parse,
/// and the name-resolution/classification pass over both, bundled so a
/// cursor lookup never needs more than one value in hand.
#[derive(Debug, Clone)]
pub struct AnalyzedScript {
    pub scanned: ScannedScript,
    pub parsed: ParsedScript,
    pub semantic: sqlscript_analyzer::AnalyzedScript,
}

impl AnalyzedScript {
    /// All non-fatal problems found across scanning, parsing and
    /// analysis, in pipeline order.
    pub fn errors(&self) -> Vec<AnalyzeError> {
        let mut errors = Vec::new();
        errors.extend(self.scanned.errors.iter().cloned().map(AnalyzeError::Scan));
        errors.extend(self.parsed.errors.iter().cloned().map(AnalyzeError::Parse));
        errors.extend(self.semantic.errors.iter().cloned().map(AnalyzeError::Analyze));
        errors
    }

    pub fn is_clean(&self) -> bool {
        self.scanned.errors.is_empty() && self.parsed.errors.is_empty() && self.semantic.errors.is_empty()
    }
}

/// Entry point tying the four analysis crates together.
pub struct ScriptAnalyzer;

impl ScriptAnalyzer {
    #[tracing::instrument(skip(text, catalog))]
    pub fn analyze(text: &str, catalog: &mut Catalog) -> AnalyzedScript {
        let mut scanned = sqlscript_scanner::scan(text);
        let parsed = sqlscript_parser::parse(&scanned);
        let semantic = sqlscript_analyzer::analyze(&parsed, &mut scanned.names_table, catalog);
        AnalyzedScript { scanned, parsed, semantic }
    }

    pub fn move_cursor(script: &AnalyzedScript, offset: u32) -> Cursor {
        cursor::move_cursor(script, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlscript_analyzer::AnalyzeErrorKind;

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
    fn analyze_runs_the_full_pipeline() {
        let mut catalog = seed_catalog();
        let script = ScriptAnalyzer::analyze("select * from A b, C d where b.x = d.y", &mut catalog);
        assert!(script.is_clean());
        assert_eq!(script.semantic.table_references.len(), 2);
    }

    #[test]
    fn errors_surface_analysis_problems_without_failing() {
        let mut catalog = seed_catalog();
        let script = ScriptAnalyzer::analyze("select 1 from A x, C x", &mut catalog);
        let errors = script.errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], AnalyzeError::Analyze(d) if d.kind == AnalyzeErrorKind::DuplicateTableAlias));
    }

    #[test]
    fn move_cursor_on_a_table_ref_reports_its_reference_index() {
        let mut catalog = seed_catalog();
        let text = "select * from A b where b.x = 1";
        let script = ScriptAnalyzer::analyze(text, &mut catalog);
        let offset = text.find('A').unwrap() as u32;
        let cursor = ScriptAnalyzer::move_cursor(&script, offset);
        assert!(cursor.scanner_symbol_index.is_some());
        assert_eq!(cursor.statement_id, Some(0));
        assert!(matches!(cursor.context, CursorContext::TableRef { reference_index: 0 }));
    }

    #[test]
    fn move_cursor_on_a_column_ref_reports_its_expression_id() {
        let mut catalog = seed_catalog();
        let text = "select * from A b where b.x = 1";
        let script = ScriptAnalyzer::analyze(text, &mut catalog);
        let offset = text.rfind("b.x").unwrap() as u32 + 2; // land on `x`
        let cursor = ScriptAnalyzer::move_cursor(&script, offset);
        assert!(matches!(cursor.context, CursorContext::ColumnRef { .. }));
    }

    #[test]
    fn move_cursor_outside_any_statement_reports_nothing() {
        let mut catalog = Catalog::new();
        let script = ScriptAnalyzer::analyze("select 1", &mut catalog);
        let cursor = ScriptAnalyzer::move_cursor(&script, 1_000);
        assert_eq!(cursor.statement_id, None);
        assert!(matches!(cursor.context, CursorContext::None));
    }
}
