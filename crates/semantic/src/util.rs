//! Small utilities shared by, or reserved for, the analysis passes.

pub mod union_find;
