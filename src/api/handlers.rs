//! Per-entity request handlers and delete cascades.

use serde_json::Value;

use crate::db::reorder::{self, OrderPatch, Position};
use crate::db::{resolver, Database, Row};
use crate::error::{BackofficeError, Result};
use crate::schema::EntityKind;

/// Does this row's relation field point at the given id?
fn relation_matches(row: &Row, field: &str, id: u64) -> bool {
    row.get(field)
        .and_then(|v| v.get("id"))
        .and_then(Value::as_u64)
        == Some(id)
}

/// Delete-time referential integrity. The store itself does not enforce
/// relations; these rules remove the dependents before the row goes away.
/// Returns the entities whose tables were touched so the caller can
/// renumber them.
fn cascade_delete(db: &mut Database, kind: EntityKind, id: u64) -> Vec<EntityKind> {
    match kind {
        EntityKind::Employee => {
            db.delete_many(EntityKind::Note, |r| relation_matches(r, "employee", id));
            db.delete_many(EntityKind::Task, |r| relation_matches(r, "employee", id));
            vec![EntityKind::Note, EntityKind::Task]
        }
        EntityKind::Customer => {
            db.delete_many(EntityKind::Note, |r| relation_matches(r, "customer", id));
            vec![EntityKind::Note]
        }
        _ => Vec::new(),
    }
}

/// Full flattened table.
pub(super) fn list(db: &Database, kind: EntityKind) -> Value {
    let rows: Vec<Value> = db
        .all(kind)
        .iter()
        .map(|row| Value::Object(resolver::to_flat(kind, row)))
        .collect();
    Value::Array(rows)
}

/// Insert a new row: server-assigned id and append-at-end order, relations
/// resolved from the flat input.
pub(super) fn create(db: &mut Database, kind: EntityKind, input: &Row) -> Row {
    let mut fields = input.clone();
    // id and order are server-assigned, whatever the client sent.
    fields.remove("id");
    fields.remove("order");

    let mut row = resolver::to_resolved(db, kind, &fields);
    row.insert("id".to_string(), Value::from(db.next_id(kind)));
    row.insert("order".to_string(), Value::from(db.len(kind) as u64 + 1));

    db.create(kind, row.clone());
    resolver::to_flat(kind, &row)
}

/// Merge a partial flat record into an existing row. Relation fields are
/// re-resolved; a null relation field is left unchanged (see
/// `resolver::to_resolved`). An unknown id fails with `RowNotFound`.
pub(super) fn update(db: &mut Database, kind: EntityKind, id: u64, input: &Row) -> Result<Row> {
    let mut fields = input.clone();
    // The path id is authoritative, and order only changes through moves.
    fields.remove("id");
    fields.remove("order");

    let patch = resolver::to_resolved(db, kind, &fields);
    let updated = db.update_by_id(kind, id, patch)?;
    Ok(resolver::to_flat(kind, updated))
}

/// Remove a row, cascading first, then close the order gaps in every table
/// the delete touched.
pub(super) fn delete(db: &mut Database, kind: EntityKind, id: u64) -> Result<()> {
    if db.find_by_id(kind, id).is_none() {
        return Err(BackofficeError::RowNotFound(kind, id));
    }

    let cascaded = cascade_delete(db, kind, id);
    db.delete_by_id(kind, id);

    db.renumber(kind);
    for touched in cascaded {
        db.renumber(touched);
    }
    Ok(())
}

/// Relocate one row relative to another and persist the full renumbering.
pub(super) fn move_row(
    db: &mut Database,
    kind: EntityKind,
    item_id: u64,
    target_id: u64,
    position: Position,
) -> Result<Vec<OrderPatch>> {
    let patches = reorder::reorder(kind, db.all(kind), item_id, target_id, position)?;

    for patch in &patches {
        let mut fields = Row::new();
        fields.insert("order".to_string(), Value::from(patch.order));
        db.update_by_id(kind, patch.id, fields)?;
    }

    Ok(patches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{row_order, seed};
    use serde_json::json;

    fn obj(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_create_first_role_gets_id_and_order_one() {
        let mut db = Database::new();
        let created = create(&mut db, EntityKind::Role, &obj(json!({"name": "Engineer"})));

        assert_eq!(created.get("id").unwrap(), 1);
        assert_eq!(created.get("name").unwrap(), "Engineer");
        assert_eq!(created.get("order").unwrap(), 1);
    }

    #[test]
    fn test_create_resolves_relations_and_flattens_response() {
        let mut db = seed::demo_database().unwrap();
        let created = create(
            &mut db,
            EntityKind::Note,
            &obj(json!({
                "content": "terugbellen",
                "employee_id": 1,
                "customer_id": 2,
                "created_at": "2025-03-01",
            })),
        );

        assert_eq!(created.get("employee_id").unwrap(), 1);
        assert!(created.get("employee").is_none());

        let stored = db.find_by_id(EntityKind::Note, 4).unwrap();
        assert_eq!(stored.get("employee").unwrap().get("id").unwrap(), 1);
    }

    #[test]
    fn test_create_appends_at_end_of_order() {
        let mut db = seed::demo_database().unwrap();
        let count = db.len(EntityKind::Role) as u64;
        let created = create(&mut db, EntityKind::Role, &obj(json!({"name": "Stagiair"})));
        assert_eq!(created.get("order").unwrap().as_u64().unwrap(), count + 1);
    }

    #[test]
    fn test_update_merges_and_reresolves_relation() {
        let mut db = seed::demo_database().unwrap();
        let updated = update(
            &mut db,
            EntityKind::Employee,
            1,
            &obj(json!({"department": "Platform", "role_id": 1})),
        )
        .unwrap();

        assert_eq!(updated.get("department").unwrap(), "Platform");
        assert_eq!(updated.get("role_id").unwrap(), 1);
        assert_eq!(updated.get("name").unwrap(), "Anna Bakker");
    }

    #[test]
    fn test_update_null_relation_keeps_existing_relation() {
        let mut db = seed::demo_database().unwrap();
        let updated = update(
            &mut db,
            EntityKind::Employee,
            1,
            &obj(json!({"role_id": null})),
        )
        .unwrap();

        // The pre-existing role survives a null relation patch.
        assert_eq!(updated.get("role_id").unwrap(), 2);
    }

    #[test]
    fn test_update_ignores_client_sent_order() {
        let mut db = seed::demo_database().unwrap();
        let updated = update(
            &mut db,
            EntityKind::Role,
            1,
            &obj(json!({"name": "Oprichter", "order": 99})),
        )
        .unwrap();

        assert_eq!(updated.get("name").unwrap(), "Oprichter");
        assert_eq!(updated.get("order").unwrap(), 1);

        let mut orders: Vec<u64> = db.all(EntityKind::Role).iter().map(row_order).collect();
        orders.sort_unstable();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let mut db = seed::demo_database().unwrap();
        let err = update(&mut db, EntityKind::Employee, 99, &Row::new()).unwrap_err();
        assert!(matches!(
            err,
            BackofficeError::RowNotFound(EntityKind::Employee, 99)
        ));
    }

    #[test]
    fn test_delete_customer_cascades_to_its_notes() {
        let mut db = seed::demo_database().unwrap();
        // Customer 1 is referenced by notes 1 and 2; note 3 belongs elsewhere.
        delete(&mut db, EntityKind::Customer, 1).unwrap();

        assert!(db.find_by_id(EntityKind::Customer, 1).is_none());
        assert!(db.find_by_id(EntityKind::Note, 1).is_none());
        assert!(db.find_by_id(EntityKind::Note, 2).is_none());

        let survivor = db.find_by_id(EntityKind::Note, 3).unwrap();
        assert_eq!(row_order(survivor), 1);
    }

    #[test]
    fn test_delete_employee_cascades_to_tasks_and_notes() {
        let mut db = seed::demo_database().unwrap();
        // Employee 1 owns tasks 1 and 3 and note 1.
        delete(&mut db, EntityKind::Employee, 1).unwrap();

        assert!(db.find_by_id(EntityKind::Task, 1).is_none());
        assert!(db.find_by_id(EntityKind::Task, 3).is_none());
        assert!(db.find_by_id(EntityKind::Note, 1).is_none());
        assert!(db.find_by_id(EntityKind::Task, 2).is_some());
        assert!(db.find_by_id(EntityKind::Note, 2).is_some());
    }

    #[test]
    fn test_delete_keeps_orders_dense_everywhere() {
        let mut db = seed::demo_database().unwrap();
        delete(&mut db, EntityKind::Employee, 1).unwrap();

        for kind in [EntityKind::Employee, EntityKind::Task, EntityKind::Note] {
            let mut orders: Vec<u64> = db.all(kind).iter().map(row_order).collect();
            orders.sort_unstable();
            let expected: Vec<u64> = (1..=orders.len() as u64).collect();
            assert_eq!(orders, expected, "gap in {} orders", kind);
        }
    }

    #[test]
    fn test_delete_unknown_id_is_not_found() {
        let mut db = seed::demo_database().unwrap();
        let err = delete(&mut db, EntityKind::Customer, 99).unwrap_err();
        assert!(matches!(
            err,
            BackofficeError::RowNotFound(EntityKind::Customer, 99)
        ));
    }

    #[test]
    fn test_move_persists_new_orders() {
        let mut db = seed::demo_database().unwrap();
        let patches =
            move_row(&mut db, EntityKind::Employee, 4, 1, Position::Above).unwrap();

        assert_eq!(patches.len(), db.len(EntityKind::Employee));
        let moved = db.find_by_id(EntityKind::Employee, 4).unwrap();
        assert_eq!(row_order(moved), 1);
        let displaced = db.find_by_id(EntityKind::Employee, 1).unwrap();
        assert_eq!(row_order(displaced), 2);
    }
}
