//! Schema-driven relation resolution.
//!
//! The wire ("flat") representation carries foreign keys as `<field>_id`
//! numbers; the in-memory ("resolved") representation attaches the related
//! row under the relation field name. Both directions consult the static
//! relation registry in `crate::schema`, never the record itself.

use serde_json::Value;

use crate::db::{Database, Row};
use crate::schema::EntityKind;

/// Accept numbers or numeric strings for foreign keys; the mock API does
/// type coercion and nothing more.
fn coerce_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Translate a flat record into its resolved form.
///
/// For each relation field whose `<field>_id` is present, the target row is
/// looked up and attached (flattened) under the relation field name. A
/// dangling id is dropped silently rather than rejected. A `null` for a
/// relation field, under either spelling, is skipped so the existing
/// relation survives a partial update (wire-compatible quirk of the demo
/// API, pinned by the handler tests).
pub fn to_resolved(db: &Database, kind: EntityKind, flat: &Row) -> Row {
    let mut resolved = Row::new();

    for (key, value) in flat {
        if let Some(field) = key.strip_suffix("_id") {
            if let Some(relation) = kind.relation(field) {
                if value.is_null() {
                    continue;
                }
                if let Some(target) = coerce_id(value)
                    .and_then(|id| db.find_by_id(relation.target, id))
                {
                    resolved.insert(
                        field.to_string(),
                        Value::Object(to_flat(relation.target, target)),
                    );
                }
                continue;
            }
        }

        if let Some(relation) = kind.relation(key) {
            if value.is_null() {
                continue;
            }
            // An attached object is re-resolved against the live table so a
            // stale copy never survives a round-trip.
            if let Some(target) = value
                .get("id")
                .and_then(coerce_id)
                .and_then(|id| db.find_by_id(relation.target, id))
            {
                resolved.insert(
                    key.clone(),
                    Value::Object(to_flat(relation.target, target)),
                );
            }
            continue;
        }

        resolved.insert(key.clone(), value.clone());
    }

    resolved
}

/// Inverse transform: every relation field holding an object with an id is
/// replaced by `<field>_id`.
pub fn to_flat(kind: EntityKind, row: &Row) -> Row {
    let mut flat = Row::new();

    for (key, value) in row {
        match kind.relation(key) {
            Some(_) => {
                if let Some(id) = value.get("id").and_then(coerce_id) {
                    flat.insert(format!("{}_id", key), Value::from(id));
                }
                // A relation field without an id has nothing to serialize.
            }
            None => {
                flat.insert(key.clone(), value.clone());
            }
        }
    }

    flat
}

/// Resolve a flat row against the store and insert it. Bulk load and
/// seeding call this in schema load order so every relation target already
/// exists by the time a referencing row arrives.
pub fn insert_flat(db: &mut Database, kind: EntityKind, flat: &Row) {
    let resolved = to_resolved(db, kind, flat);
    db.create(kind, resolved);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_role() -> Database {
        let mut db = Database::new();
        let mut role = Row::new();
        role.insert("id".to_string(), Value::from(1u64));
        role.insert("name".to_string(), Value::from("Engineer"));
        role.insert("order".to_string(), Value::from(1u64));
        db.create(EntityKind::Role, role);
        db
    }

    fn flat_employee(role_id: Value) -> Row {
        let mut flat = Row::new();
        flat.insert("id".to_string(), Value::from(1u64));
        flat.insert("name".to_string(), Value::from("Anna"));
        flat.insert("role_id".to_string(), role_id);
        flat
    }

    #[test]
    fn test_resolve_attaches_target_row() {
        let db = db_with_role();
        let resolved = to_resolved(&db, EntityKind::Employee, &flat_employee(Value::from(1u64)));

        let role = resolved.get("role").unwrap();
        assert_eq!(role.get("id").unwrap(), 1);
        assert_eq!(role.get("name").unwrap(), "Engineer");
        assert!(resolved.get("role_id").is_none());
    }

    #[test]
    fn test_resolve_coerces_string_ids() {
        let db = db_with_role();
        let resolved = to_resolved(&db, EntityKind::Employee, &flat_employee(Value::from("1")));
        assert!(resolved.get("role").is_some());
    }

    #[test]
    fn test_dangling_reference_is_dropped() {
        let db = db_with_role();
        let resolved = to_resolved(&db, EntityKind::Employee, &flat_employee(Value::from(99u64)));

        assert!(resolved.get("role").is_none());
        assert!(resolved.get("role_id").is_none());
        assert_eq!(resolved.get("name").unwrap(), "Anna");
    }

    #[test]
    fn test_null_relation_is_skipped() {
        let db = db_with_role();
        let resolved = to_resolved(&db, EntityKind::Employee, &flat_employee(Value::Null));
        assert!(resolved.get("role").is_none());
        assert!(resolved.get("role_id").is_none());
    }

    #[test]
    fn test_non_relation_id_suffix_is_kept() {
        let db = Database::new();
        let mut flat = Row::new();
        flat.insert("external_id".to_string(), Value::from(5u64));
        let resolved = to_resolved(&db, EntityKind::Customer, &flat);
        assert_eq!(resolved.get("external_id").unwrap(), 5);
    }

    #[test]
    fn test_flat_round_trip_preserves_relation_ids() {
        let db = db_with_role();
        let flat = flat_employee(Value::from(1u64));

        let resolved = to_resolved(&db, EntityKind::Employee, &flat);
        let back = to_flat(EntityKind::Employee, &resolved);

        assert_eq!(back.get("role_id").unwrap(), 1);
        assert_eq!(back.get("name").unwrap(), "Anna");
        assert!(back.get("role").is_none());
    }
}
