//! In-memory relational fixture store.
//!
//! Rows are plain JSON objects so one store implementation serves every
//! entity; the typed structs in `crate::entity` are the wire-facing view.
//! Referential integrity is not enforced here: delete-time cascades live in
//! the request handlers, and the resolver simply drops dangling references.

pub mod reorder;
pub mod resolver;
pub mod seed;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{BackofficeError, Result};
use crate::schema::{EntityKind, LOAD_ORDER};

pub type Row = serde_json::Map<String, Value>;

/// Primary key of a row, if it carries one.
pub fn row_id(row: &Row) -> Option<u64> {
    row.get("id").and_then(Value::as_u64)
}

/// Manual ordering position of a row; rows without one sort first.
pub fn row_order(row: &Row) -> u64 {
    row.get("order").and_then(Value::as_u64).unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct Database {
    tables: BTreeMap<EntityKind, Vec<Row>>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    pub fn new() -> Self {
        let mut tables = BTreeMap::new();
        for kind in LOAD_ORDER {
            tables.insert(kind, Vec::new());
        }
        Self { tables }
    }

    fn table(&self, kind: EntityKind) -> &Vec<Row> {
        // Every kind is inserted in new(), so the lookup cannot miss.
        &self.tables[&kind]
    }

    fn table_mut(&mut self, kind: EntityKind) -> &mut Vec<Row> {
        self.tables.entry(kind).or_default()
    }

    /// All rows of an entity, in insertion order.
    pub fn all(&self, kind: EntityKind) -> &[Row] {
        self.table(kind)
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.table(kind).len()
    }

    pub fn is_empty(&self, kind: EntityKind) -> bool {
        self.table(kind).is_empty()
    }

    /// Insert a row as-is. The caller has already assigned a unique id;
    /// no uniqueness validation beyond that is performed.
    pub fn create(&mut self, kind: EntityKind, row: Row) {
        self.table_mut(kind).push(row);
    }

    pub fn find_by_id(&self, kind: EntityKind, id: u64) -> Option<&Row> {
        self.table(kind).iter().find(|r| row_id(r) == Some(id))
    }

    pub fn find_first<P>(&self, kind: EntityKind, pred: P) -> Option<&Row>
    where
        P: Fn(&Row) -> bool,
    {
        self.table(kind).iter().find(|r| pred(r))
    }

    /// Merge fields into the row with the given id. Unknown ids fail with
    /// `RowNotFound`; silent no-ops would hide bugs.
    pub fn update_by_id(&mut self, kind: EntityKind, id: u64, fields: Row) -> Result<&Row> {
        let table = self.table_mut(kind);
        let pos = table
            .iter()
            .position(|r| row_id(r) == Some(id))
            .ok_or(BackofficeError::RowNotFound(kind, id))?;

        for (key, value) in fields {
            table[pos].insert(key, value);
        }
        Ok(&table[pos])
    }

    /// Remove the row with the given id, returning it so cascade logic can
    /// inspect what was deleted.
    pub fn delete_by_id(&mut self, kind: EntityKind, id: u64) -> Option<Row> {
        let table = self.table_mut(kind);
        let pos = table.iter().position(|r| row_id(r) == Some(id))?;
        Some(table.remove(pos))
    }

    /// Remove every matching row, returning how many were deleted.
    pub fn delete_many<P>(&mut self, kind: EntityKind, pred: P) -> usize
    where
        P: Fn(&Row) -> bool,
    {
        let table = self.table_mut(kind);
        let before = table.len();
        table.retain(|r| !pred(r));
        before - table.len()
    }

    /// Next primary key: max existing id + 1, or 1 for an empty table.
    pub fn next_id(&self, kind: EntityKind) -> u64 {
        self.table(kind)
            .iter()
            .filter_map(row_id)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Re-assign the `order` field so values are exactly 1..=N in the
    /// current order-ascending sequence. Run after deletes and cascades to
    /// keep the ordering dense.
    pub fn renumber(&mut self, kind: EntityKind) {
        let table = self.table_mut(kind);
        table.sort_by_key(|r| row_order(r));
        for (index, row) in table.iter_mut().enumerate() {
            row.insert("order".to_string(), Value::from(index as u64 + 1));
        }
    }

    pub fn clear(&mut self) {
        for table in self.tables.values_mut() {
            table.clear();
        }
    }
}
