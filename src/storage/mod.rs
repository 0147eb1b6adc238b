mod json_store;

pub use json_store::{restore, JsonStore, StateDump};
