pub mod durable;
pub mod memstore;

pub use durable::{DurableStore, DB_FILE_NAME};
pub use memstore::MemStore;
