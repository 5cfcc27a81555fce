//! Record lookup by table and id
//!
//! The storage engine that builds these records lives outside this crate.
//! `RecordStore` reads its JSON dumps: one `<Table>.json` file per table,
//! holding an array of records (or an object of records) with every foreign
//! key already replaced by the referenced record.

use ahash::AHashMap;
use serde_json::Value;
use std::path::Path;

use super::fields::Fields;
use crate::core::error::{ExportError, Result};

/// Source tables the compiler reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    CharaData,
    CharaModeData,
    CharaUniqueCombo,
    DragonData,
    SkillData,
    AbilityData,
    PlayerAction,
    WeaponType,
}

impl Table {
    pub const ALL: [Table; 8] = [
        Table::CharaData,
        Table::CharaModeData,
        Table::CharaUniqueCombo,
        Table::DragonData,
        Table::SkillData,
        Table::AbilityData,
        Table::PlayerAction,
        Table::WeaponType,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::CharaData => "CharaData",
            Table::CharaModeData => "CharaModeData",
            Table::CharaUniqueCombo => "CharaUniqueCombo",
            Table::DragonData => "DragonData",
            Table::SkillData => "SkillData",
            Table::AbilityData => "AbilityData",
            Table::PlayerAction => "PlayerAction",
            Table::WeaponType => "WeaponType",
        }
    }
}

/// Pure synchronous lookup into the dereferenced record graph
pub trait RecordSource: Sync {
    /// Fetch one record by `_Id`
    fn get_record(&self, table: Table, id: u64) -> Result<Option<Value>>;

    /// Fetch every record of a table accepted by `filter`, in source order
    fn get_all(&self, table: Table, filter: &dyn Fn(&Value) -> bool) -> Result<Vec<Value>>;

    /// Fetch one record that the schema guarantees to exist
    fn require(&self, table: Table, id: u64) -> Result<Value> {
        self.get_record(table, id)?
            .ok_or_else(|| ExportError::RecordNotFound {
                table: table.name().to_string(),
                id: id.to_string(),
            })
    }
}

/// In-memory tables indexed by `_Id`
#[derive(Debug, Default)]
pub struct RecordStore {
    tables: AHashMap<Table, Vec<Value>>,
    index: AHashMap<(Table, u64), usize>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every known table found in `dir`; absent files are empty tables
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut store = Self::new();
        for table in Table::ALL {
            let path = dir.join(format!("{}.json", table.name()));
            if !path.exists() {
                tracing::debug!("No {} table at {:?}", table.name(), path);
                continue;
            }
            let content = std::fs::read_to_string(&path)?;
            let records = match serde_json::from_str::<Value>(&content)? {
                Value::Array(items) => items,
                Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
                _ => Vec::new(),
            };
            tracing::info!("Loaded {} {} records", records.len(), table.name());
            for record in records {
                store.insert(table, record);
            }
        }
        Ok(store)
    }

    /// Add a record; a record with an existing `_Id` replaces the old one
    pub fn insert(&mut self, table: Table, record: Value) {
        let rows = self.tables.entry(table).or_default();
        match record.record_id() {
            Some(id) => match self.index.get(&(table, id)) {
                Some(&pos) => rows[pos] = record,
                None => {
                    self.index.insert((table, id), rows.len());
                    rows.push(record);
                }
            },
            None => rows.push(record),
        }
    }

    /// Builder form of [`RecordStore::insert`]
    pub fn with(mut self, table: Table, record: Value) -> Self {
        self.insert(table, record);
        self
    }

    pub fn len(&self, table: Table) -> usize {
        self.tables.get(&table).map_or(0, Vec::len)
    }
}

impl RecordSource for RecordStore {
    fn get_record(&self, table: Table, id: u64) -> Result<Option<Value>> {
        Ok(self
            .index
            .get(&(table, id))
            .and_then(|&pos| self.tables.get(&table)?.get(pos))
            .cloned())
    }

    fn get_all(&self, table: Table, filter: &dyn Fn(&Value) -> bool) -> Result<Vec<Value>> {
        Ok(self
            .tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| filter(r)).cloned().collect())
            .unwrap_or_default())
    }
}
