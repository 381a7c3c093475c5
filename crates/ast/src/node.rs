//! # Node record and node store
//!
//! The AST atom is a fixed-shape [`Node`] record; every node of every
//! script lives in one contiguous, append-only [`NodeStore`]. Children are
//! always appended before their parent (bottom-up construction), so a
//! node's own id is always greater than any of its children's ids.

use serde::{Deserialize, Serialize};

use crate::location::Location;

/// Index into a [`NodeStore`]. Children always precede their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Sentinel used for `parent` before a node has been attached to anything.
pub const NO_PARENT: NodeId = NodeId(u32::MAX);

/// Discriminant for a [`Node`]. Variants partition into scalars (carry a
/// value directly or via a side table), arrays (`children_*` denotes a
/// plain slice of node ids) and objects (`children_*` denotes a slice of
/// attribute-tagged node ids, see [`crate::attribute::AttributeKey`]).
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    Null,
    Bool,
    UI32,
    /// Index into the scanner's interned names table.
    StringRef,
    LiteralNull,
    LiteralBoolean,
    /// Index into the parsed script's `int_literals` side table.
    LiteralInteger,
    /// Index into the parsed script's `float_literals` side table.
    LiteralFloat,
    /// Index into the scanner's interned names table.
    LiteralString,
    EnumExpressionOperator,
    /// `SELECT *` / `function(*)` wildcard; carries no value.
    Wildcard,
    /// Plain array of child node ids.
    Array,
    ObjectSqlSelect,
    ObjectSqlSelectItem,
    ObjectSqlTableRef,
    ObjectSqlCreate,
    ObjectSqlColumnDef,
    ObjectSqlColumnRef,
    ObjectSqlQualifiedName,
    ObjectSqlIndirectionIndex,
    ObjectSqlNaryExpression,
    ObjectSqlFunctionExpression,
}

impl NodeType {
    /// Object nodes carry an attribute slice; this is the boundary the
    /// source calls `OBJECT_KEYS_` and uses as a numeric threshold. We
    /// express the same partition as an explicit predicate instead of a
    /// magic enum-ordinal comparison.
    pub fn is_object(self) -> bool {
        matches!(
            self,
            NodeType::ObjectSqlSelect
                | NodeType::ObjectSqlSelectItem
                | NodeType::ObjectSqlTableRef
                | NodeType::ObjectSqlCreate
                | NodeType::ObjectSqlColumnDef
                | NodeType::ObjectSqlColumnRef
                | NodeType::ObjectSqlQualifiedName
                | NodeType::ObjectSqlIndirectionIndex
                | NodeType::ObjectSqlNaryExpression
                | NodeType::ObjectSqlFunctionExpression
        )
    }

    pub fn is_array(self) -> bool {
        matches!(self, NodeType::Array)
    }
}

/// The AST atom: `{ location, node_type, attribute_key, parent,
/// children_begin_or_value, children_count }`.
///
/// For scalars, `children_begin_or_value` carries the value (or an index
/// into a side table) and `children_count` is unused (`0`). For arrays and
/// objects, `children_begin_or_value` is the start index into the owning
/// store's attribute/child slice and `children_count` is its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub location: Location,
    pub node_type: NodeType,
    pub attribute_key: Option<crate::attribute::AttributeKey>,
    pub parent: NodeId,
    pub children_begin_or_value: u32,
    pub children_count: u32,
}

impl Node {
    pub fn is_unparented(&self) -> bool {
        self.parent == NO_PARENT
    }
}

/// Append-only store of [`Node`] records plus the side tables wide scalar
/// values are interned into.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeStore {
    nodes: Vec<Node>,
    /// Flat storage backing every array/object's `children_*` slice:
    /// array children are bare [`NodeId`]s; object children are
    /// `(AttributeKey, NodeId)` pairs referenced through the node itself
    /// (the key lives on the child node's `attribute_key`).
    children: Vec<NodeId>,
    pub int_literals: Vec<i64>,
    pub float_literals: Vec<f64>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Append a scalar node (no children). Returns the freshly assigned id.
    pub fn add_scalar(
        &mut self,
        location: Location,
        node_type: NodeType,
        value: u32,
    ) -> NodeId {
        debug_assert!(!node_type.is_object() && !node_type.is_array());
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            location,
            node_type,
            attribute_key: None,
            parent: NO_PARENT,
            children_begin_or_value: value,
            children_count: 0,
        });
        id
    }

    /// Append an array node over `children`, stamping each child's parent.
    pub fn add_array(&mut self, location: Location, children: Vec<NodeId>) -> NodeId {
        let begin = self.children.len() as u32;
        let count = children.len() as u32;
        let id = NodeId(self.nodes.len() as u32);
        for child in &children {
            self.get_mut(*child).parent = id;
        }
        self.children.extend(children);
        self.nodes.push(Node {
            location,
            node_type: NodeType::Array,
            attribute_key: None,
            parent: NO_PARENT,
            children_begin_or_value: begin,
            children_count: count,
        });
        id
    }

    /// Append an object node over `(key, child)` attribute pairs, stamping
    /// each child's `attribute_key` and `parent`. Distinct-key membership
    /// (the "every object node's attribute slice contains distinct
    /// attribute_key values" invariant) is the caller's responsibility: the
    /// parser driver builds attribute lists from disjoint grammar slots, so
    /// duplicates cannot occur by construction.
    pub fn add_object(
        &mut self,
        location: Location,
        node_type: NodeType,
        attributes: Vec<(crate::attribute::AttributeKey, NodeId)>,
    ) -> NodeId {
        debug_assert!(node_type.is_object());
        let begin = self.children.len() as u32;
        let count = attributes.len() as u32;
        let id = NodeId(self.nodes.len() as u32);
        for (key, child) in &attributes {
            let node = self.get_mut(*child);
            node.attribute_key = Some(*key);
            node.parent = id;
        }
        self.children.extend(attributes.iter().map(|(_, c)| *c));
        self.nodes.push(Node {
            location,
            node_type,
            attribute_key: None,
            parent: NO_PARENT,
            children_begin_or_value: begin,
            children_count: count,
        });
        id
    }

    /// The raw child/attribute slice of an array or object node.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        let node = self.get(id);
        debug_assert!(node.node_type.is_array() || node.node_type.is_object());
        let begin = node.children_begin_or_value as usize;
        let count = node.children_count as usize;
        &self.children[begin..begin + count]
    }

    /// Iterate node ids in storage order, which is bottom-up: every child
    /// is visited strictly before its parent.
    pub fn iter_bottom_up(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    /// Debug-only human description, used in test assertions.
    #[cfg(test)]
    pub fn describe(&self, id: NodeId) -> String {
        format!("{:?}@{}", self.get(id).node_type, id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeKey;

    #[test]
    fn children_precede_parent() {
        let mut store = NodeStore::new();
        let a = store.add_scalar(Location::new(0, 1), NodeType::LiteralInteger, 0);
        let b = store.add_scalar(Location::new(2, 1), NodeType::LiteralInteger, 1);
        let parent = store.add_array(Location::new(0, 3), vec![a, b]);
        assert!(a.0 < parent.0);
        assert!(b.0 < parent.0);
        assert_eq!(store.get(a).parent, parent);
        assert_eq!(store.get(b).parent, parent);
    }

    #[test]
    fn object_stamps_attribute_keys() {
        let mut store = NodeStore::new();
        let name = store.add_scalar(Location::new(0, 1), NodeType::StringRef, 0);
        let obj = store.add_object(
            Location::new(0, 1),
            NodeType::ObjectSqlColumnRef,
            vec![(AttributeKey::SqlColumnRefPath, name)],
        );
        assert_eq!(store.get(name).attribute_key, Some(AttributeKey::SqlColumnRefPath));
        assert_eq!(store.get(name).parent, obj);
    }

    #[test]
    fn unparented_sentinel_on_construction() {
        let mut store = NodeStore::new();
        let n = store.add_scalar(Location::new(0, 1), NodeType::LiteralInteger, 7);
        assert!(store.get(n).is_unparented());
    }
}
