mod customer;
mod employee;
mod invoice;
mod note;
mod project;
mod role;
mod task;

pub use customer::Customer;
pub use employee::Employee;
pub use invoice::{Invoice, InvoiceStatus};
pub use note::Note;
pub use project::{Project, ProjectStatus};
pub use role::Role;
pub use task::{Task, TaskPriority, TaskStatus};

use crate::db::Row;
use crate::error::Result;

/// Convert a typed wire record into a dynamic row.
///
/// Serialization of the flat structs always produces a JSON object, so the
/// unwrap-free conversion goes through `serde_json::to_value`.
pub fn to_row<T: serde::Serialize>(record: &T) -> Result<Row> {
    match serde_json::to_value(record)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(crate::error::BackofficeError::InvalidPayload(format!(
            "expected an object, got {}",
            other
        ))),
    }
}
