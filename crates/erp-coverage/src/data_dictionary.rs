//! The data dictionary — the schema knowledge populated by the
//! data-dictionary extractor before any other extractor runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub data_type: String,
    pub length: Option<u32>,
    pub nullable: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForeignKey {
    pub field: String,
    pub references_table: String,
    pub references_field: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub fields: Vec<String>,
    pub unique: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<FieldDescriptor>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<IndexDescriptor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataDictionaryStats {
    pub table_count: usize,
    pub field_count: usize,
    pub relationship_count: usize,
}

/// Schema knowledge extracted from the source system: every known
/// table, its fields/keys/indexes, plus cross-table relationships and
/// views. Populated once, during orchestration phase 2, and treated as
/// read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataDictionary {
    pub tables: BTreeMap<String, TableSchema>,
    pub data_elements: BTreeMap<String, String>,
    pub domains: BTreeMap<String, String>,
    pub views: Vec<String>,
    pub relationships: Vec<ForeignKey>,
    pub stats: DataDictionaryStats,
}

impl DataDictionary {
    pub fn known_table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}
