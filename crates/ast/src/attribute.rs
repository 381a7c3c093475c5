//! # Attribute keys and lookup
//!
//! Object nodes carry an attribute slice: children tagged with an
//! [`AttributeKey`] rather than positional indices. `lookup_attribute` and
//! `lookup_attributes` pull specific children out of that slice by key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::node::{NodeId, NodeStore};

/// Tag carried by every child of an object node, naming which grammar slot
/// it fills. Unknown keys are simply absent from the slice and resolve to
/// `None` on lookup.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKey {
    SqlSelectDistinct,
    SqlSelectProjection,
    SqlSelectFrom,
    SqlSelectWhere,
    SqlSelectItemExpr,
    SqlSelectItemAlias,
    SqlTableRefName,
    SqlTableRefAlias,
    /// Derived column list on a `FROM name(col, ...)` item; see
    /// `sqlscript-parser`'s table-ref grammar and the analyzer's inline
    /// table-declaration synthesis.
    SqlTableRefColumns,
    SqlColumnRefPath,
    SqlColumnDefName,
    SqlColumnDefType,
    SqlCreateName,
    SqlCreateElements,
    SqlExpressionOperator,
    SqlExpressionArgs,
    SqlFunctionName,
    SqlFunctionArgs,
    SqlFunctionModifiers,
    SqlQualifiedNameCatalog,
    SqlQualifiedNameSchema,
    SqlQualifiedNameRelation,
    SqlQualifiedNameIndex,
}

/// Single-key lookup: a linear scan of `node`'s attribute slice.
pub fn lookup_attribute(store: &NodeStore, node: NodeId, key: AttributeKey) -> Option<NodeId> {
    store
        .children_of(node)
        .iter()
        .copied()
        .find(|&child| store.get(child).attribute_key == Some(key))
}

/// Multi-key lookup: a small hash built once over `keys` turns the single
/// scan of the attribute slice into an O(1) lookup per child, keeping the
/// whole call O(n) in the slice rather than O(n·N) for N requested keys.
pub fn lookup_attributes<const N: usize>(
    store: &NodeStore,
    node: NodeId,
    keys: [AttributeKey; N],
) -> [Option<NodeId>; N] {
    let slot_of: HashMap<AttributeKey, usize> = keys.iter().copied().zip(0..N).collect();
    let mut out = [None; N];
    for child in store.children_of(node) {
        if let Some(child_key) = store.get(*child).attribute_key {
            if let Some(&slot) = slot_of.get(&child_key) {
                out[slot] = Some(*child);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;
    use crate::node::NodeType;

    #[test]
    fn single_key_lookup_finds_tagged_child() {
        let mut store = NodeStore::new();
        let name = store.add_scalar(Location::new(0, 1), NodeType::StringRef, 0);
        let obj = store.add_object(
            Location::new(0, 1),
            NodeType::ObjectSqlColumnRef,
            vec![(AttributeKey::SqlColumnRefPath, name)],
        );
        assert_eq!(lookup_attribute(&store, obj, AttributeKey::SqlColumnRefPath), Some(name));
        assert_eq!(lookup_attribute(&store, obj, AttributeKey::SqlSelectWhere), None);
    }

    #[test]
    fn multi_key_lookup_fills_all_slots_in_one_pass() {
        let mut store = NodeStore::new();
        let op = store.add_scalar(Location::new(0, 1), NodeType::EnumExpressionOperator, 0);
        let args = store.add_array(Location::new(0, 1), vec![]);
        let obj = store.add_object(
            Location::new(0, 1),
            NodeType::ObjectSqlNaryExpression,
            vec![
                (AttributeKey::SqlExpressionOperator, op),
                (AttributeKey::SqlExpressionArgs, args),
            ],
        );
        let [found_op, found_args] = lookup_attributes(
            &store,
            obj,
            [AttributeKey::SqlExpressionOperator, AttributeKey::SqlExpressionArgs],
        );
        assert_eq!(found_op, Some(op));
        assert_eq!(found_args, Some(args));
    }
}
