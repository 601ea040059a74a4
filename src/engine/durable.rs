use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use arc_swap::ArcSwapOption;
use log::{debug, info, warn};
use redb::{
    Database, Durability, ReadOnlyTable, ReadTransaction, TableDefinition, TableError,
    TableHandle, WriteTransaction,
};
use crate::{check_bucket_name, BucketScope, Entry, Error, Result, Store};

/// Name of the single database file kept inside the data directory.
pub const DB_FILE_NAME: &str = "store.redb";

/// How long [`Store::close`] waits for in-flight operations to drop the handle.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(30);

const CLOSE_POLL_INTERVAL: Duration = Duration::from_millis(10);

type Bucket<'a> = TableDefinition<'a, &'static str, &'static [u8]>;

fn bucket_table(name: &str) -> Bucket<'_> {
    TableDefinition::new(name)
}

/// A [`Store`] backed by a single `redb` database file.
///
/// Every bucket is a redb table. Reads run in a read transaction, writes in
/// a write transaction that is fsynced before the call returns, so a crash
/// never exposes a partial write.
pub struct DurableStore {
    db: ArcSwapOption<Database>,
    path: PathBuf,
}

impl DurableStore {
    /// Opens the store in `data_dir`, creating the directory and file if needed.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let dir = data_dir.as_ref();
        create_data_dir(dir)?;

        let path = dir.join(DB_FILE_NAME);
        let file = open_db_file(&path)?;
        let db = Database::builder().create_file(file)?;
        info!("Opened durable store at {}", path.display());

        Ok(Self {
            db: ArcSwapOption::from_pointee(db),
            path,
        })
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn db(&self) -> Result<Arc<Database>> {
        self.db.load_full().ok_or(Error::Closed)
    }

    /// Detaches the database and waits until every in-flight operation has
    /// dropped its handle, so the file lock is released on `Ok`.
    ///
    /// If the handle is still shared after `timeout`, it is put back and
    /// [`Error::Busy`] is returned; the store stays usable and `close` can be
    /// retried.
    fn close_within(&self, timeout: Duration) -> Result<()> {
        let Some(mut db) = self.db.swap(None) else {
            return Ok(());
        };
        let deadline = Instant::now() + timeout;
        loop {
            match Arc::try_unwrap(db) {
                Ok(db) => {
                    drop(db);
                    debug!("Closed durable store at {}", self.path.display());
                    return Ok(());
                }
                Err(shared) if Instant::now() >= deadline => {
                    warn!(
                        "Durable store at {} still has operations in flight; close aborted",
                        self.path.display()
                    );
                    self.db.store(Some(shared));
                    return Err(Error::Busy(format!(
                        "operations still in flight after {:?}",
                        timeout
                    )));
                }
                Err(shared) => {
                    db = shared;
                    thread::sleep(CLOSE_POLL_INTERVAL);
                }
            }
        }
    }
}

#[cfg(unix)]
fn create_data_dir(dir: &Path) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    if !dir.exists() {
        fs::DirBuilder::new().recursive(true).mode(0o750).create(dir)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn create_data_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn open_db_file(path: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(false);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    Ok(options.open(path)?)
}

fn open_bucket(txn: &ReadTransaction, bucket: &str) -> Result<ReadOnlyTable<&'static str, &'static [u8]>> {
    if bucket.is_empty() {
        return Err(Error::BucketNotFound);
    }
    match txn.open_table(bucket_table(bucket)) {
        Ok(table) => Ok(table),
        Err(TableError::TableDoesNotExist(_)) => Err(Error::BucketNotFound),
        Err(e) => Err(e.into()),
    }
}

fn bucket_exists(txn: &WriteTransaction, bucket: &str) -> Result<bool> {
    Ok(!bucket.is_empty() && txn.list_tables()?.any(|t| t.name() == bucket))
}

impl Store for DurableStore {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let db = self.db()?;
        let txn = db.begin_read()?;
        let table = open_bucket(&txn, bucket)?;
        let value = table.get(key)?.ok_or(Error::NotFound)?;
        Ok(value.value().to_vec())
    }

    fn put(&self, bucket: &str, key: &str, value: &[u8]) -> Result<()> {
        check_bucket_name(bucket)?;
        let db = self.db()?;
        let mut txn = db.begin_write()?;
        txn.set_durability(Durability::Immediate);
        {
            let mut table = txn.open_table(bucket_table(bucket))?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        let db = self.db()?;
        let mut txn = db.begin_write()?;
        txn.set_durability(Durability::Immediate);

        if !bucket_exists(&txn, bucket)? {
            txn.abort()?;
            return Err(Error::BucketNotFound);
        }

        let removed = {
            let mut table = txn.open_table(bucket_table(bucket))?;
            let previous = table.remove(key)?;
            previous.is_some()
        };
        if !removed {
            txn.abort()?;
            return Err(Error::NotFound);
        }

        txn.commit()?;
        Ok(())
    }

    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<Entry>> {
        let db = self.db()?;
        let txn = db.begin_read()?;
        let table = open_bucket(&txn, bucket)?;

        let mut entries = Vec::new();
        for item in table.range(prefix..)? {
            let (key, value) = item?;
            let key = key.value();
            if !key.starts_with(prefix) {
                break;
            }
            entries.push(Entry {
                key: key.to_string(),
                value: value.value().to_vec(),
            });
        }
        Ok(entries)
    }

    fn buckets(&self) -> Result<Vec<String>> {
        let db = self.db()?;
        let txn = db.begin_read()?;
        let mut names: Vec<String> = txn.list_tables()?.map(|t| t.name().to_string()).collect();
        names.sort();
        Ok(names)
    }

    fn close(&self) -> Result<()> {
        self.close_within(CLOSE_TIMEOUT)
    }

    fn bucket(&self, name: &str) -> BucketScope<'_> {
        BucketScope::new(self, name)
    }
}
