use thiserror::Error;

use crate::schema::EntityKind;

#[derive(Error, Debug)]
pub enum BackofficeError {
    #[error("Not in a backoffice project. Run 'backoffice init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .backoffice/ to reinitialize.")]
    AlreadyInitialized,

    #[error("{0} not found: {1}")]
    RowNotFound(EntityKind, u64),

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("No route matches: {0}")]
    RouteNotFound(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BackofficeError>;
