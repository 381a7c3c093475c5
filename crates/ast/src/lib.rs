//! # sqlscript AST
//!
//! Flat, integer-keyed node array plus attribute-oriented lookup. This is
//! the shared atom other crates in the workspace build on: the scanner
//! produces none of it, the parser driver appends to it, and the analyzer
//! walks it read-only.

pub mod attribute;
pub mod location;
pub mod node;
pub mod operator;

pub use attribute::{lookup_attribute, lookup_attributes, AttributeKey};
pub use location::Location;
pub use node::{Node, NodeId, NodeStore, NodeType, NO_PARENT};
pub use operator::ExpressionOperator;
