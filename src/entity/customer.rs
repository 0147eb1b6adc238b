// src/entity/customer.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: u64,
    pub name: String,
    pub contact_person: String,
    pub email: String,
    pub order: u64,
}
