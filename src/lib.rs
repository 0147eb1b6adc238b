pub mod api;
pub mod cli;
pub mod client;
pub mod db;
pub mod entity;
pub mod error;
pub mod schema;
pub mod storage;

pub use api::ApiServer;
pub use client::StoreRegistry;
pub use error::{BackofficeError, Result};
