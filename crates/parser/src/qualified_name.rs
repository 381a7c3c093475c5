//! # Qualified names
//!
//! A dotted identifier path of length 1/2/3 expands to `{relation}`,
//! `{schema,relation}`, `{catalog,schema,relation}` respectively. For
//! length >= 3, the *last three* components are taken as
//! `catalog, schema, relation` — the conservative, bug-fixed reading of
//! the original indexing (see DESIGN.md).

use serde::{Deserialize, Serialize};
use sqlscript_scanner::NameId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifiedNameParts {
    pub catalog: Option<NameId>,
    pub schema: Option<NameId>,
    pub relation: NameId,
}

impl QualifiedNameParts {
    pub fn from_parts(parts: &[(sqlscript_ast::Location, NameId)]) -> Option<Self> {
        match parts.len() {
            0 => None,
            1 => Some(Self { catalog: None, schema: None, relation: parts[0].1 }),
            2 => Some(Self {
                catalog: None,
                schema: Some(parts[0].1),
                relation: parts[1].1,
            }),
            n => Some(Self {
                catalog: Some(parts[n - 3].1),
                schema: Some(parts[n - 2].1),
                relation: parts[n - 1].1,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> NameId {
        NameId(n)
    }
    fn loc() -> sqlscript_ast::Location {
        sqlscript_ast::Location::default()
    }

    #[test]
    fn single_component_is_relation_only() {
        let parts = QualifiedNameParts::from_parts(&[(loc(), id(5))]).unwrap();
        assert_eq!(parts.relation, id(5));
        assert_eq!(parts.schema, None);
        assert_eq!(parts.catalog, None);
    }

    #[test]
    fn three_components_use_corrected_indexing() {
        let parts =
            QualifiedNameParts::from_parts(&[(loc(), id(1)), (loc(), id(2)), (loc(), id(3))])
                .unwrap();
        assert_eq!(parts.catalog, Some(id(1)));
        assert_eq!(parts.schema, Some(id(2)));
        assert_eq!(parts.relation, id(3));
    }
}
