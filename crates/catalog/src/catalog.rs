//! # Catalog
//!
//! A plain, in-process, synchronous registry of databases, schemas,
//! tables and columns (§4.D). There is no internal lock: the embedder
//! serializes mutation by holding `&mut Catalog` for the duration of an
//! allocation or a batch of allocations (§5). Name lookups are
//! case-insensitive, matching typical unquoted-SQL-identifier folding.

use std::collections::HashMap;

use crate::ids::{ColumnId, DatabaseId, SchemaId, TableId};

#[derive(Debug, Clone)]
struct DatabaseEntry {
    name: String,
}

#[derive(Debug, Clone)]
struct SchemaEntry {
    database_id: DatabaseId,
    name: String,
}

#[derive(Debug, Clone)]
struct TableEntry {
    schema_id: SchemaId,
    name: String,
    /// Tie-break weight for ambiguous resolution (§4.D); defaults to
    /// insertion order, overridable via [`Catalog::with_rank`].
    rank: u32,
}

#[derive(Debug, Clone)]
struct ColumnEntry {
    table_id: TableId,
    name: String,
}

/// A table qualified-name lookup; any component left `None` matches any
/// value for that component.
#[derive(Debug, Clone, Copy)]
pub struct TableLookup<'a> {
    pub catalog: Option<&'a str>,
    pub schema: Option<&'a str>,
    pub relation: &'a str,
}

/// One candidate returned by [`Catalog::resolve_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableMatch {
    pub database_id: DatabaseId,
    pub schema_id: SchemaId,
    pub table_id: TableId,
    /// How many qualified-name components were given *and* matched
    /// (0..=2, `catalog` and `schema`); used as the "schema specificity"
    /// tie-break so a fully qualified match outranks a bare-name one.
    pub specificity: u8,
    pub rank: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    databases: Vec<DatabaseEntry>,
    schemas: Vec<SchemaEntry>,
    tables: Vec<TableEntry>,
    columns: Vec<ColumnEntry>,
    database_index: HashMap<String, DatabaseId>,
    schema_index: HashMap<(DatabaseId, String), SchemaId>,
    table_index: HashMap<(SchemaId, String), TableId>,
    column_index: HashMap<(TableId, String), ColumnId>,
}

fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_database_id(&mut self, name: &str) -> DatabaseId {
        let key = fold(name);
        if let Some(id) = self.database_index.get(&key) {
            return *id;
        }
        let id = DatabaseId(self.databases.len() as u32);
        self.databases.push(DatabaseEntry { name: name.to_string() });
        self.database_index.insert(key, id);
        id
    }

    pub fn allocate_schema_id(&mut self, database: DatabaseId, name: &str) -> SchemaId {
        let key = (database, fold(name));
        if let Some(id) = self.schema_index.get(&key) {
            return *id;
        }
        let id = SchemaId(self.schemas.len() as u32);
        self.schemas.push(SchemaEntry { database_id: database, name: name.to_string() });
        self.schema_index.insert(key, id);
        id
    }

    pub fn allocate_table_id(&mut self, schema: SchemaId, name: &str) -> TableId {
        let key = (schema, fold(name));
        if let Some(id) = self.table_index.get(&key) {
            return *id;
        }
        let rank = self.tables.len() as u32;
        let id = TableId(self.tables.len() as u32);
        self.tables.push(TableEntry { schema_id: schema, name: name.to_string(), rank });
        self.table_index.insert(key, id);
        id
    }

    pub fn allocate_column_id(&mut self, table: TableId, name: &str) -> ColumnId {
        let key = (table, fold(name));
        if let Some(id) = self.column_index.get(&key) {
            return *id;
        }
        let id = ColumnId(self.columns.len() as u32);
        self.columns.push(ColumnEntry { table_id: table, name: name.to_string() });
        self.column_index.insert(key, id);
        id
    }

    /// Override a table's tie-break rank; lets the embedder mark catalog
    /// provenance (e.g. "this table came from the script's own connection"
    /// vs. a lower-priority attached schema).
    pub fn with_rank(&mut self, table: TableId, rank: u32) -> &mut Self {
        self.tables[table.0 as usize].rank = rank;
        self
    }

    pub fn database_name(&self, id: DatabaseId) -> &str {
        &self.databases[id.0 as usize].name
    }

    pub fn schema_name(&self, id: SchemaId) -> &str {
        &self.schemas[id.0 as usize].name
    }

    pub fn table_name(&self, id: TableId) -> &str {
        &self.tables[id.0 as usize].name
    }

    pub fn column_name(&self, id: ColumnId) -> &str {
        &self.columns[id.0 as usize].name
    }

    pub fn table_schema(&self, id: TableId) -> SchemaId {
        self.tables[id.0 as usize].schema_id
    }

    pub fn schema_database(&self, id: SchemaId) -> DatabaseId {
        self.schemas[id.0 as usize].database_id
    }

    pub fn table_rank(&self, id: TableId) -> u32 {
        self.tables[id.0 as usize].rank
    }

    pub fn columns_of(&self, table: TableId) -> impl Iterator<Item = ColumnId> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter_map(move |(i, c)| (c.table_id == table).then_some(ColumnId(i as u32)))
    }

    pub fn resolve_column(&self, table: TableId, name: &str) -> Option<ColumnId> {
        self.column_index.get(&(table, fold(name))).copied()
    }

    /// Search order: exact match on every supplied component outranks a
    /// bare-name match via the `specificity` tie-break, so sorting by
    /// `(same-rank-as-originator, specificity desc, rank asc)` realizes
    /// "(1) exact match on all three components, (2) best partial match
    /// honoring provided components" from §4.D in one pass. Results are
    /// truncated to `max_ambiguity` and appended to `out`.
    pub fn resolve_table(
        &self,
        lookup: &TableLookup<'_>,
        originating_rank: Option<u32>,
        out: &mut Vec<TableMatch>,
        max_ambiguity: usize,
    ) {
        let mut candidates: Vec<TableMatch> = Vec::new();
        for (idx, table) in self.tables.iter().enumerate() {
            if !table.name.eq_ignore_ascii_case(lookup.relation) {
                continue;
            }
            let schema = &self.schemas[table.schema_id.0 as usize];
            let mut specificity = 0u8;
            if let Some(want_schema) = lookup.schema {
                if !schema.name.eq_ignore_ascii_case(want_schema) {
                    continue;
                }
                specificity += 1;
            }
            let database = &self.databases[schema.database_id.0 as usize];
            if let Some(want_catalog) = lookup.catalog {
                if !database.name.eq_ignore_ascii_case(want_catalog) {
                    continue;
                }
                specificity += 1;
            }
            candidates.push(TableMatch {
                database_id: schema.database_id,
                schema_id: table.schema_id,
                table_id: TableId(idx as u32),
                specificity,
                rank: table.rank,
            });
        }
        candidates.sort_by(|a, b| {
            let a_same = Some(a.rank) == originating_rank;
            let b_same = Some(b.rank) == originating_rank;
            b_same
                .cmp(&a_same)
                .then(b.specificity.cmp(&a.specificity))
                .then(a.rank.cmp(&b.rank))
        });
        out.extend(candidates.into_iter().take(max_ambiguity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Catalog, TableId, TableId) {
        let mut cat = Catalog::new();
        let db = cat.allocate_database_id("main");
        let schema = cat.allocate_schema_id(db, "public");
        let a = cat.allocate_table_id(schema, "A");
        let c = cat.allocate_table_id(schema, "C");
        cat.allocate_column_id(a, "x");
        cat.allocate_column_id(c, "y");
        (cat, a, c)
    }

    #[test]
    fn allocation_is_idempotent_by_name() {
        let mut cat = Catalog::new();
        let db1 = cat.allocate_database_id("main");
        let db2 = cat.allocate_database_id("MAIN");
        assert_eq!(db1, db2);
    }

    #[test]
    fn resolves_bare_relation_name() {
        let (cat, a, _) = fixture();
        let mut out = Vec::new();
        cat.resolve_table(&TableLookup { catalog: None, schema: None, relation: "a" }, None, &mut out, 8);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].table_id, a);
    }

    #[test]
    fn qualified_lookup_outranks_bare_name_on_ambiguity() {
        let mut cat = Catalog::new();
        let db1 = cat.allocate_database_id("db1");
        let s1 = cat.allocate_schema_id(db1, "public");
        let t1 = cat.allocate_table_id(s1, "widgets");
        let db2 = cat.allocate_database_id("db2");
        let s2 = cat.allocate_schema_id(db2, "public");
        let _t2 = cat.allocate_table_id(s2, "widgets");

        let mut out = Vec::new();
        cat.resolve_table(
            &TableLookup { catalog: Some("db1"), schema: Some("public"), relation: "widgets" },
            None,
            &mut out,
            8,
        );
        assert_eq!(out[0].table_id, t1);
        assert_eq!(out[0].specificity, 2);
    }

    #[test]
    fn column_resolution_is_case_insensitive() {
        let (cat, a, _) = fixture();
        assert!(cat.resolve_column(a, "X").is_some());
    }

    #[test]
    fn max_ambiguity_truncates_results() {
        let mut cat = Catalog::new();
        let db = cat.allocate_database_id("main");
        for schema_name in ["s1", "s2", "s3"] {
            let schema = cat.allocate_schema_id(db, schema_name);
            cat.allocate_table_id(schema, "t");
        }
        let mut out = Vec::new();
        cat.resolve_table(&TableLookup { catalog: None, schema: None, relation: "t" }, None, &mut out, 2);
        assert_eq!(out.len(), 2);
    }
}
