//! # Interned names table
//!
//! Identifier and string-literal text is interned once per script; every
//! later reference is a cheap [`NameId`] rather than an owned `String`.
//! Each interned name also carries a coarse tag bitmap (set by later
//! stages, e.g. the analyzer marking a name as having been used as a
//! column name or table alias).

use std::collections::HashMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NameId(pub u32);

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct NameTag: u8 {
        const COLUMN_NAME = 1 << 0;
        const TABLE_ALIAS = 1 << 1;
        const TABLE_NAME = 1 << 2;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamesTable {
    text: Vec<String>,
    tags: Vec<NameTag>,
    by_text: HashMap<String, NameId>,
}

impl NamesTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: &str) -> NameId {
        if let Some(id) = self.by_text.get(text) {
            return *id;
        }
        let id = NameId(self.text.len() as u32);
        self.text.push(text.to_string());
        self.tags.push(NameTag::default());
        self.by_text.insert(text.to_string(), id);
        id
    }

    pub fn text(&self, id: NameId) -> &str {
        &self.text[id.0 as usize]
    }

    pub fn mark(&mut self, id: NameId, tag: NameTag) {
        self.tags[id.0 as usize] |= tag;
    }

    pub fn tags(&self, id: NameId) -> NameTag {
        self.tags[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut names = NamesTable::new();
        let a = names.intern("foo");
        let b = names.intern("foo");
        assert_eq!(a, b);
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn tags_accumulate() {
        let mut names = NamesTable::new();
        let id = names.intern("x");
        names.mark(id, NameTag::COLUMN_NAME);
        names.mark(id, NameTag::TABLE_ALIAS);
        assert!(names.tags(id).contains(NameTag::COLUMN_NAME));
        assert!(names.tags(id).contains(NameTag::TABLE_ALIAS));
    }
}
