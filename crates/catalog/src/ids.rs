//! # Catalog id newtypes
//!
//! Monotonically allocated, never reclaimed except on full catalog
//! teardown (§5): insertions never invalidate earlier-assigned ids.

use serde::{Deserialize, Serialize};

macro_rules! catalog_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);
    };
}

catalog_id!(DatabaseId);
catalog_id!(SchemaId);
catalog_id!(TableId);
catalog_id!(ColumnId);
