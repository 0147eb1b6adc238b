//! Client-visible state for one entity.
//!
//! The page layer only ever reads `list`, `record` and the loading flags;
//! all writes go through the registry's actions. The list is kept sorted by
//! the `order` field, matching how the tables render.

use std::collections::HashMap;

use crate::db::reorder::OrderPatch;
use crate::db::{row_id, row_order, Row};

/// Per-action in-flight flags, exposed so the UI can render spinners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadingFlags {
    pub get_list: bool,
    pub create: bool,
    pub update: bool,
    pub moving: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CrudStore {
    pub list: Vec<Row>,
    pub record: HashMap<u64, Row>,
    pub is_loading: LoadingFlags,
    /// The specific row a delete is in flight for, so the UI can show a
    /// per-row pending indicator.
    pub delete_id: Option<u64>,
}

impl CrudStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u64) -> Option<&Row> {
        self.record.get(&id)
    }

    /// Replace the whole cache with a fresh list response.
    pub(super) fn replace_list(&mut self, rows: Vec<Row>) {
        self.record = rows
            .iter()
            .filter_map(|row| row_id(row).map(|id| (id, row.clone())))
            .collect();
        self.list = rows;
        self.sort();
    }

    /// Insert or replace a single row after a create/update response.
    pub(super) fn upsert(&mut self, row: Row) {
        let Some(id) = row_id(&row) else {
            return;
        };
        match self.list.iter_mut().find(|r| row_id(r) == Some(id)) {
            Some(existing) => *existing = row.clone(),
            None => self.list.push(row.clone()),
        }
        self.record.insert(id, row);
        self.sort();
    }

    pub(super) fn remove(&mut self, id: u64) {
        self.list.retain(|r| row_id(r) != Some(id));
        self.record.remove(&id);
    }

    /// Apply `{id, order}` pairs without re-fetching full records.
    pub(super) fn patch_orders(&mut self, patches: &[OrderPatch]) {
        for patch in patches {
            if let Some(row) = self.list.iter_mut().find(|r| row_id(r) == Some(patch.id)) {
                row.insert("order".to_string(), serde_json::Value::from(patch.order));
            }
            if let Some(row) = self.record.get_mut(&patch.id) {
                row.insert("order".to_string(), serde_json::Value::from(patch.order));
            }
        }
        self.sort();
    }

    fn sort(&mut self) {
        self.list.sort_by_key(row_order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn row(id: u64, order: u64) -> Row {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::from(id));
        row.insert("order".to_string(), Value::from(order));
        row
    }

    #[test]
    fn test_replace_list_builds_record_index() {
        let mut store = CrudStore::new();
        store.replace_list(vec![row(2, 2), row(1, 1)]);

        assert_eq!(store.list.len(), 2);
        assert_eq!(row_id(&store.list[0]), Some(1));
        assert!(store.get(2).is_some());
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut store = CrudStore::new();
        store.replace_list(vec![row(1, 1)]);

        let mut updated = row(1, 1);
        updated.insert("name".to_string(), Value::from("Engineer"));
        store.upsert(updated);

        assert_eq!(store.list.len(), 1);
        assert_eq!(store.get(1).unwrap().get("name").unwrap(), "Engineer");
    }

    #[test]
    fn test_patch_orders_resorts_list() {
        let mut store = CrudStore::new();
        store.replace_list(vec![row(1, 1), row(2, 2), row(3, 3)]);

        store.patch_orders(&[
            OrderPatch { id: 3, order: 1 },
            OrderPatch { id: 1, order: 2 },
            OrderPatch { id: 2, order: 3 },
        ]);

        let ids: Vec<u64> = store.list.iter().filter_map(row_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(row_order(store.get(3).unwrap()), 1);
    }
}
