//! # Expression classification
//!
//! Two passes from §4.F, combined into a single bottom-up walk:
//!
//! - **Constant folding**: a literal is trivially constant; any other
//!   expression is constant iff every one of its operands is.
//! - **Column transforms**: an arithmetic binary/unary op, or a
//!   modifier-free function call, whose operands are exactly one
//!   non-constant expression plus zero or more constants is reclassified
//!   as a computation over that one operand (`target_expression_id`).
//!   `ColumnRef` is the identity transform every chain bottoms out at
//!   (tagged during scope construction, see [`crate::scope`]).
//!
//! The source streams these as two separate visitor passes because its
//! AST is built incrementally; ours is already fully materialized in
//! node-id order before either pass runs, and that order already
//! guarantees every operand is visited before the expression that uses
//! it, so folding them into one walk changes nothing observable.
//!
//! After classification, a **rooting** step walks the AST again to find
//! the topmost node of each transform chain (a transform whose AST
//! parent is *also* a transform isn't a root) and follows
//! `target_expression_id` down to the terminal `ColumnRef`, recording
//! `(root, column_ref)` pairs indexed by the column they resolved to.

use std::collections::HashMap;

use sqlscript_ast::{lookup_attributes, AttributeKey, ExpressionOperator, NodeId, NodeStore, NodeType, NO_PARENT};
use sqlscript_scanner::NameId;

use crate::ids::ExpressionId;
use crate::model::{AnalyzedScript, ColumnTransform, Expression, ExpressionKind, LiteralType};

pub(crate) fn classify_expressions(
    analyzed: &mut AnalyzedScript,
    nodes: &NodeStore,
    expr_by_node: &mut HashMap<NodeId, ExpressionId>,
) {
    for id in nodes.iter_bottom_up() {
        let node_type = nodes.get(id).node_type;

        if let Some(literal_type) = LiteralType::from_node_type(node_type) {
            push_expression(analyzed, expr_by_node, id, ExpressionKind::Literal { literal_type }, true, false, None);
            continue;
        }

        match node_type {
            NodeType::ObjectSqlNaryExpression => classify_nary(analyzed, nodes, expr_by_node, id),
            NodeType::ObjectSqlFunctionExpression => classify_function_call(analyzed, nodes, expr_by_node, id),
            _ => {}
        }
    }

    root_column_transforms(analyzed, nodes, expr_by_node);
}

/// Tally how many of `args` are column transforms vs. constants. Any
/// argument with neither classification (e.g. an unsupported or
/// unresolved operand) disqualifies the whole expression.
struct ArgTally {
    transform_count: usize,
    constant_count: usize,
    transform_index: Option<usize>,
    is_constant: bool,
    qualifies: bool,
}

fn tally_args(analyzed: &AnalyzedScript, args: &[Option<ExpressionId>]) -> ArgTally {
    let mut transform_count = 0;
    let mut constant_count = 0;
    let mut transform_index = None;
    let mut all_present = !args.is_empty();
    for (i, arg) in args.iter().enumerate() {
        match arg {
            Some(eid) => {
                let expr = &analyzed.expressions[eid.0 as usize];
                if expr.is_column_transform {
                    transform_count += 1;
                    transform_index = Some(i);
                } else if expr.is_constant {
                    constant_count += 1;
                }
            }
            None => all_present = false,
        }
    }
    let is_constant = all_present && constant_count == args.len();
    let qualifies = all_present && transform_count == 1 && transform_count + constant_count == args.len();
    ArgTally { transform_count, constant_count, transform_index, is_constant, qualifies }
}

fn classify_nary(
    analyzed: &mut AnalyzedScript,
    nodes: &NodeStore,
    expr_by_node: &mut HashMap<NodeId, ExpressionId>,
    id: NodeId,
) {
    let [op_node, args_node] =
        lookup_attributes(nodes, id, [AttributeKey::SqlExpressionOperator, AttributeKey::SqlExpressionArgs]);
    let (Some(op_node), Some(args_node)) = (op_node, args_node) else { return };
    let Some(op) = ExpressionOperator::from_u32(nodes.get(op_node).children_begin_or_value) else { return };

    let arg_ids: Vec<NodeId> = nodes.children_of(args_node).to_vec();
    let args: Vec<Option<ExpressionId>> = arg_ids.iter().map(|a| expr_by_node.get(a).copied()).collect();
    if args.iter().any(Option::is_none) {
        return;
    }
    let args: Vec<ExpressionId> = args.into_iter().map(Option::unwrap).collect();

    let tally = tally_args(analyzed, &args.iter().map(|e| Some(*e)).collect::<Vec<_>>());
    // Unary NEGATE/NOT are never reclassified as transforms, matching the
    // source's explicit no-op for these two operators.
    let is_transform = op.is_arithmetic() && tally.qualifies;
    let target = if is_transform { tally.transform_index.map(|i| args[i]) } else { None };

    let kind = match args.len() {
        1 => ExpressionKind::Unary { op, operand: args[0] },
        2 => ExpressionKind::Binary { op, left: args[0], right: args[1] },
        _ => return,
    };
    push_expression(analyzed, expr_by_node, id, kind, tally.is_constant, is_transform, target);
}

fn classify_function_call(
    analyzed: &mut AnalyzedScript,
    nodes: &NodeStore,
    expr_by_node: &mut HashMap<NodeId, ExpressionId>,
    id: NodeId,
) {
    let [name_node, args_node, modifiers_node] = lookup_attributes(
        nodes,
        id,
        [AttributeKey::SqlFunctionName, AttributeKey::SqlFunctionArgs, AttributeKey::SqlFunctionModifiers],
    );
    let Some(name_node) = name_node else { return };
    let name = NameId(nodes.get(name_node).children_begin_or_value);

    let has_modifiers = modifiers_node.map(|m| !nodes.children_of(m).is_empty()).unwrap_or(false);
    let arg_ids: Vec<NodeId> = args_node.map(|a| nodes.children_of(a).to_vec()).unwrap_or_default();

    // A `*` argument (e.g. `count(*)`) has no expression entry, so it
    // can't be a transform's lone operand; such calls simply never
    // qualify below.
    let arg_exprs: Vec<Option<ExpressionId>> = arg_ids.iter().map(|a| expr_by_node.get(a).copied()).collect();
    let tally = tally_args(analyzed, &arg_exprs);
    let is_transform = !has_modifiers && tally.qualifies;
    let target = if is_transform { tally.transform_index.and_then(|i| arg_exprs[i]) } else { None };

    let kind = ExpressionKind::FunctionCall { name, args: arg_exprs.into_iter().flatten().collect() };
    push_expression(analyzed, expr_by_node, id, kind, tally.is_constant, is_transform, target);
}

fn push_expression(
    analyzed: &mut AnalyzedScript,
    expr_by_node: &mut HashMap<NodeId, ExpressionId>,
    ast_node_id: NodeId,
    kind: ExpressionKind,
    is_constant: bool,
    is_column_transform: bool,
    target_expression_id: Option<ExpressionId>,
) {
    let id = ExpressionId(analyzed.expressions.len() as u32);
    analyzed.expressions.push(Expression {
        ast_node_id,
        kind,
        is_constant,
        is_column_transform,
        target_expression_id,
        statement_id: None,
    });
    expr_by_node.insert(ast_node_id, id);
}

fn root_column_transforms(analyzed: &mut AnalyzedScript, nodes: &NodeStore, expr_by_node: &HashMap<NodeId, ExpressionId>) {
    for id in nodes.iter_bottom_up() {
        let Some(&expr_id) = expr_by_node.get(&id) else { continue };
        let expr = &analyzed.expressions[expr_id.0 as usize];
        if !expr.is_column_transform || matches!(expr.kind, ExpressionKind::ColumnRef { .. }) {
            continue;
        }

        let parent = nodes.get(id).parent;
        if parent != NO_PARENT {
            if let Some(&parent_expr_id) = expr_by_node.get(&parent) {
                if analyzed.expressions[parent_expr_id.0 as usize].is_column_transform {
                    continue; // not the root of its chain
                }
            }
        }

        let mut cursor = expr_id;
        loop {
            let e = &analyzed.expressions[cursor.0 as usize];
            if matches!(e.kind, ExpressionKind::ColumnRef { .. }) {
                break;
            }
            match e.target_expression_id {
                Some(next) => cursor = next,
                None => break,
            }
        }

        let ExpressionKind::ColumnRef { resolved_column, .. } = &analyzed.expressions[cursor.0 as usize].kind else {
            continue;
        };
        let resolved_column = *resolved_column;

        let idx = analyzed.column_transforms.len();
        analyzed.column_transforms.push(ColumnTransform { root_expression_id: expr_id, column_ref_expression_id: cursor });
        if let Some(rc) = resolved_column {
            analyzed.column_transforms_by_column.entry(rc.column_id).or_default().push(idx);
        }
    }
}
