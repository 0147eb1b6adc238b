//! Ordered-list move semantics.
//!
//! One row is relocated above or below a target row and the whole
//! collection is renumbered to a dense 1..=N sequence. The request handlers
//! run this against the fixture store; the client store runs the same
//! function against its local cache for the optimistic preview, so both
//! sides always agree on the outcome.

use serde::{Deserialize, Serialize};

use crate::db::{row_id, row_order, Row};
use crate::error::{BackofficeError, Result};
use crate::schema::EntityKind;

/// Placement relative to the target row, django-ordered-model style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Above,
    Below,
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "above" => Ok(Position::Above),
            "below" => Ok(Position::Below),
            _ => Err(format!("Invalid position: {}", s)),
        }
    }
}

/// Minimal reorder result: one entry per row in the collection, because a
/// move can shift every order value. The client patches these into its
/// cache without re-fetching full records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPatch {
    pub id: u64,
    pub order: u64,
}

/// Compute the new dense ordering after moving `item_id` above or below
/// `target_id`.
///
/// The moving row is removed from the order-ascending sequence first, so a
/// move relative to itself (which includes moving the only row) fails with
/// `RowNotFound` for the target, as does any id that is not in `rows`.
pub fn reorder(
    kind: EntityKind,
    rows: &[Row],
    item_id: u64,
    target_id: u64,
    position: Position,
) -> Result<Vec<OrderPatch>> {
    let mut sequence: Vec<u64> = {
        let mut sorted: Vec<&Row> = rows.iter().collect();
        sorted.sort_by_key(|r| row_order(r));
        sorted.iter().filter_map(|r| row_id(r)).collect()
    };

    let item_index = sequence
        .iter()
        .position(|id| *id == item_id)
        .ok_or(BackofficeError::RowNotFound(kind, item_id))?;
    sequence.remove(item_index);

    let target_index = sequence
        .iter()
        .position(|id| *id == target_id)
        .ok_or(BackofficeError::RowNotFound(kind, target_id))?;

    let insert_index = match position {
        Position::Above => target_index,
        Position::Below => target_index + 1,
    };
    sequence.insert(insert_index, item_id);

    Ok(sequence
        .iter()
        .enumerate()
        .map(|(index, id)| OrderPatch {
            id: *id,
            order: index as u64 + 1,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn rows(pairs: &[(u64, u64)]) -> Vec<Row> {
        pairs
            .iter()
            .map(|(id, order)| {
                let mut row = Row::new();
                row.insert("id".to_string(), Value::from(*id));
                row.insert("order".to_string(), Value::from(*order));
                row
            })
            .collect()
    }

    fn patches(pairs: &[(u64, u64)]) -> Vec<OrderPatch> {
        pairs
            .iter()
            .map(|(id, order)| OrderPatch {
                id: *id,
                order: *order,
            })
            .collect()
    }

    #[test]
    fn test_move_last_above_first() {
        let rows = rows(&[(1, 1), (2, 2), (3, 3)]);
        let result =
            reorder(EntityKind::Employee, &rows, 3, 1, Position::Above).unwrap();
        assert_eq!(result, patches(&[(3, 1), (1, 2), (2, 3)]));
    }

    #[test]
    fn test_move_first_below_last() {
        let rows = rows(&[(1, 1), (2, 2), (3, 3)]);
        let result =
            reorder(EntityKind::Employee, &rows, 1, 3, Position::Below).unwrap();
        assert_eq!(result, patches(&[(2, 1), (3, 2), (1, 3)]));
    }

    #[test]
    fn test_move_to_current_position_is_idempotent() {
        let rows = rows(&[(1, 1), (2, 2), (3, 3)]);
        let result =
            reorder(EntityKind::Employee, &rows, 2, 1, Position::Below).unwrap();
        assert_eq!(result, patches(&[(1, 1), (2, 2), (3, 3)]));
    }

    #[test]
    fn test_renumbering_is_dense_from_sparse_orders() {
        let rows = rows(&[(1, 10), (2, 20), (3, 30)]);
        let result =
            reorder(EntityKind::Employee, &rows, 2, 3, Position::Below).unwrap();
        assert_eq!(result, patches(&[(1, 1), (3, 2), (2, 3)]));
    }

    #[test]
    fn test_unknown_item_fails() {
        let rows = rows(&[(1, 1), (2, 2)]);
        let err = reorder(EntityKind::Employee, &rows, 9, 1, Position::Above).unwrap_err();
        assert!(matches!(
            err,
            BackofficeError::RowNotFound(EntityKind::Employee, 9)
        ));
    }

    #[test]
    fn test_move_relative_to_itself_fails() {
        let rows = rows(&[(1, 1), (2, 2)]);
        let err = reorder(EntityKind::Employee, &rows, 1, 1, Position::Above).unwrap_err();
        assert!(matches!(
            err,
            BackofficeError::RowNotFound(EntityKind::Employee, 1)
        ));
    }

    #[test]
    fn test_move_only_row_fails() {
        let rows = rows(&[(1, 1)]);
        assert!(reorder(EntityKind::Employee, &rows, 1, 1, Position::Below).is_err());
    }
}
