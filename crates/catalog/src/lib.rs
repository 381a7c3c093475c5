//! # sqlscript Catalog
//!
//! Process-scope registry of database/schema/table/column ids consulted
//! during name resolution (§4.D). Independent of the parser and scanner
//! crates: an embedder builds and maintains one `Catalog` across many
//! scripts.

pub mod catalog;
pub mod ids;

pub use catalog::{Catalog, TableLookup, TableMatch};
pub use ids::{ColumnId, DatabaseId, SchemaId, TableId};
