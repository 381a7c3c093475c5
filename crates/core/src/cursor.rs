//! # Cursor placement
//!
//! Maps a byte offset in the original text back onto everything an
//! embedder (an LSP's hover/completion handler, say) needs to answer
//! "what is under the cursor": the scanner symbol, the enclosing
//! statement, the deepest AST node, and — if that node sits inside a
//! table or column reference — which one (§6).

use serde::{Deserialize, Serialize};
use sqlscript_ast::{NodeId, NodeStore, NodeType};
use sqlscript_analyzer::ExpressionId;

use crate::AnalyzedScript;

/// What kind of reference the cursor landed inside, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorContext {
    /// Index into `AnalyzedScript::semantic().table_references`.
    TableRef { reference_index: usize },
    ColumnRef { expression_id: ExpressionId },
    None,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cursor {
    /// Index into the scanner's symbol list, if the offset falls on a token.
    pub scanner_symbol_index: Option<usize>,
    /// Index into `ParsedScript::statements`.
    pub statement_id: Option<usize>,
    pub ast_node_id: Option<NodeId>,
    pub context: CursorContext,
}

pub(crate) fn move_cursor(script: &AnalyzedScript, offset: u32) -> Cursor {
    let scanner_symbol_index = script.scanned.symbol_at_offset(offset);

    let statement_id = script
        .parsed
        .statements
        .iter()
        .position(|stmt| script.parsed.nodes.get(stmt.root_node_id).location.contains_offset(offset));

    let ast_node_id = statement_id.and_then(|idx| {
        let root = script.parsed.statements[idx].root_node_id;
        find_deepest_containing(&script.parsed.nodes, root, offset)
    });

    let context = ast_node_id.map_or(CursorContext::None, |node_id| {
        resolve_context(&script.parsed.nodes, &script.semantic, node_id)
    });

    Cursor { scanner_symbol_index, statement_id, ast_node_id, context }
}

fn find_deepest_containing(nodes: &NodeStore, id: NodeId, offset: u32) -> Option<NodeId> {
    let node = nodes.get(id);
    if !node.location.contains_offset(offset) {
        return None;
    }
    if node.node_type.is_array() || node.node_type.is_object() {
        for &child in nodes.children_of(id) {
            if let Some(found) = find_deepest_containing(nodes, child, offset) {
                return Some(found);
            }
        }
    }
    Some(id)
}

/// Walk from `node_id` up through its ancestors looking for the nearest
/// table-ref or column-ref object node, then cross-reference it against
/// the analyzed script's own tables.
fn resolve_context(
    nodes: &NodeStore,
    semantic: &sqlscript_analyzer::AnalyzedScript,
    node_id: NodeId,
) -> CursorContext {
    let mut current = node_id;
    loop {
        let node = nodes.get(current);
        match node.node_type {
            NodeType::ObjectSqlTableRef => {
                if let Some(idx) = semantic.table_references.iter().position(|r| r.ast_node_id == current) {
                    return CursorContext::TableRef { reference_index: idx };
                }
                return CursorContext::None;
            }
            NodeType::ObjectSqlColumnRef => {
                if let Some(expr) = semantic.expressions.iter().enumerate().find(|(_, e)| e.ast_node_id == current) {
                    return CursorContext::ColumnRef { expression_id: ExpressionId(expr.0 as u32) };
                }
                return CursorContext::None;
            }
            _ => {}
        }
        if node.is_unparented() {
            return CursorContext::None;
        }
        current = node.parent;
    }
}
