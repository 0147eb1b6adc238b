mod registry;
mod store;
mod toast;

pub use registry::{Mutation, StoreRegistry};
pub use store::{CrudStore, LoadingFlags};
pub use toast::{Language, Notifier, ToastChannel, ToastKey};
