// src/entity/note.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<u64>,
    pub created_at: NaiveDate,
    pub order: u64,
}
