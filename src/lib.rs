//! Bucket Store is a small, embedded key-value store organised in buckets.
//!
//! Every backend implements the same [`Store`] contract: values are opaque
//! bytes addressed by `bucket -> key`, each call is atomic on its own, and
//! no returned buffer shares memory with the store.
//!
//! ## Core Components
//! - [`engine`]: The storage backends (durable `redb` file and in-memory map).
//! - [`config`]: Environment-driven configuration.
//! - [`sdk`]: Backend discovery for embedding processes.

pub mod config;
pub mod engine;
pub mod sdk;

use serde::Serialize;
use thiserror::Error;

/// Errors returned by the Bucket Store.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested key does not exist within the bucket.
    #[error("key not found")]
    NotFound,
    /// The requested bucket has never been written to.
    #[error("bucket not found")]
    BucketNotFound,
    /// Buckets must have a non-empty name.
    #[error("bucket name must not be empty")]
    EmptyBucketName,
    /// The store was closed and can no longer serve requests.
    #[error("store is closed")]
    Closed,
    /// `close` gave up because operations still held the store open.
    #[error("store is busy: {0}")]
    Busy(String),
    /// A configuration value was missing or invalid.
    #[error("invalid config: {0}")]
    Config(String),
    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
    /// An I/O error occurred while preparing the data directory or file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The embedded storage engine reported a failure.
    #[error("storage engine error: {0}")]
    Engine(#[from] redb::Error),
}

impl Error {
    /// Returns `true` for the two expected not-found outcomes.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound | Error::BucketNotFound)
    }
}

macro_rules! engine_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Error {
                fn from(err: $ty) -> Self {
                    Error::Engine(err.into())
                }
            }
        )*
    };
}

engine_error!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// A specialized Result type for Bucket Store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A key-value pair returned by [`Store::list`].
///
/// Entries are owned copies; holding one never pins store state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub key: String,
    pub value: Vec<u8>,
}

/// The contract every storage backend satisfies.
///
/// All values are raw bytes; callers own their encoding.
pub trait Store: Send + Sync {
    /// Retrieves a copy of the value stored under `key` in `bucket`.
    ///
    /// Returns [`Error::BucketNotFound`] if the bucket does not exist and
    /// [`Error::NotFound`] if the key does not exist within it.
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Stores a copy of `value` under `key`, creating the bucket if needed.
    fn put(&self, bucket: &str, key: &str, value: &[u8]) -> Result<()>;

    /// Removes a key from a bucket.
    ///
    /// Fails with the same not-found errors as [`Store::get`].
    fn delete(&self, bucket: &str, key: &str) -> Result<()>;

    /// Returns every entry in `bucket` whose key starts with `prefix`.
    ///
    /// An empty prefix returns the whole bucket. Ordering is backend-defined.
    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<Entry>>;

    /// Lists the names of all existing buckets in ascending order.
    fn buckets(&self) -> Result<Vec<String>>;

    /// Releases any resources held by the store. Calling it twice is harmless.
    fn close(&self) -> Result<()>;

    /// Returns a [`BucketScope`] that pins every operation to one bucket.
    fn bucket(&self, name: &str) -> BucketScope<'_>;
}

/// A simplified, scoped handle for a single bucket.
pub struct BucketScope<'a> {
    store: &'a dyn Store,
    name: String,
}

impl<'a> BucketScope<'a> {
    pub fn new(store: &'a dyn Store, name: &str) -> Self {
        Self {
            store,
            name: name.to_string(),
        }
    }

    /// The bucket this scope is pinned to.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.store.get(&self.name, key)
    }

    pub fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.store.put(&self.name, key, value)
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        self.store.delete(&self.name, key)
    }

    pub fn list(&self, prefix: &str) -> Result<Vec<Entry>> {
        self.store.list(&self.name, prefix)
    }
}

/// Rejects bucket names no backend can create.
pub(crate) fn check_bucket_name(bucket: &str) -> Result<()> {
    if bucket.is_empty() {
        return Err(Error::EmptyBucketName);
    }
    Ok(())
}
