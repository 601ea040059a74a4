use std::sync::Arc;
use log::info;
use crate::config::{Backend, Config};
use crate::engine::{DurableStore, MemStore};
use crate::{Result, Store};

/// Opens the [`Store`] selected by `config`.
///
/// 1. [`Backend::Durable`] opens (or creates) the database file in
///    `config.data_dir`. Failures here are fatal for the caller's startup.
/// 2. [`Backend::Memory`] creates an empty [`MemStore`]; it never fails.
///
/// # Examples
///
/// ```no_run
/// use bucket_store::{config::Config, sdk};
///
/// fn main() -> anyhow::Result<()> {
///     let store = sdk::new(&Config::from_env()?)?;
///     store.put("nodes", "n1", b"ready")?;
///     store.close()?;
///     Ok(())
/// }
/// ```
pub fn new(config: &Config) -> Result<Arc<dyn Store>> {
    config.validate()?;
    match config.backend {
        Backend::Durable => {
            let store = DurableStore::open(&config.data_dir)?;
            Ok(Arc::new(store))
        }
        Backend::Memory => {
            info!("Using in-memory store; data is discarded on exit");
            Ok(Arc::new(MemStore::new()))
        }
    }
}
