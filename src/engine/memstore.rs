use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use log::debug;
use crate::{check_bucket_name, BucketScope, Entry, Error, Result, Store};

type StoreData = HashMap<String, HashMap<String, Vec<u8>>>;

/// An in-memory [`Store`] guarded by a single reader/writer lock.
///
/// Intended for tests and ephemeral processes: nothing survives a drop.
/// [`Store::list`] returns entries in hash order, not sorted.
#[derive(Default)]
pub struct MemStore {
    data: RwLock<StoreData>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreData>> {
        self.data
            .read()
            .map_err(|_| Error::Internal("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreData>> {
        self.data
            .write()
            .map_err(|_| Error::Internal("memory store lock poisoned".to_string()))
    }
}

impl Store for MemStore {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let data = self.read()?;
        data.get(bucket)
            .ok_or(Error::BucketNotFound)?
            .get(key)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn put(&self, bucket: &str, key: &str, value: &[u8]) -> Result<()> {
        check_bucket_name(bucket)?;
        let mut data = self.write()?;
        let entries = data.entry(bucket.to_string()).or_insert_with(|| {
            debug!("Creating bucket {}", bucket);
            HashMap::new()
        });
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        let mut data = self.write()?;
        data.get_mut(bucket)
            .ok_or(Error::BucketNotFound)?
            .remove(key)
            .map(|_| ())
            .ok_or(Error::NotFound)
    }

    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<Entry>> {
        let data = self.read()?;
        let entries = data.get(bucket).ok_or(Error::BucketNotFound)?;
        Ok(entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| Entry {
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }

    fn buckets(&self) -> Result<Vec<String>> {
        let data = self.read()?;
        let mut names: Vec<String> = data.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }

    fn bucket(&self, name: &str) -> BucketScope<'_> {
        BucketScope::new(self, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memstore_get_put() {
        let store = MemStore::new();
        store.put("b1", "k1", b"v1").unwrap();

        let val = store.get("b1", "k1").unwrap();
        assert_eq!(val, b"v1");
    }

    #[test]
    fn test_memstore_delete() {
        let store = MemStore::new();
        store.put("b1", "k1", b"v1").unwrap();
        store.delete("b1", "k1").unwrap();

        let res = store.get("b1", "k1");
        assert!(matches!(res, Err(Error::NotFound)));
    }

    #[test]
    fn test_bucket_survives_last_delete() {
        let store = MemStore::new();
        store.put("b1", "k1", b"v1").unwrap();
        store.delete("b1", "k1").unwrap();

        assert!(store.list("b1", "").unwrap().is_empty());
        assert_eq!(store.buckets().unwrap(), vec!["b1".to_string()]);
    }

    #[test]
    fn test_empty_bucket_name_is_rejected() {
        let store = MemStore::new();
        assert!(matches!(store.put("", "k1", b"v1"), Err(Error::EmptyBucketName)));
        assert!(matches!(store.get("", "k1"), Err(Error::BucketNotFound)));
        assert!(store.buckets().unwrap().is_empty());
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let store = std::sync::Arc::new(MemStore::new());
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.data.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(store.get("b1", "k1"), Err(Error::Internal(_))));
    }

    #[test]
    fn test_bucket_scope() {
        let store = MemStore::new();

        let scope = store.bucket("nodes");
        assert_eq!(scope.name(), "nodes");
        scope.put("n1", b"node1").unwrap();

        assert_eq!(scope.get("n1").unwrap(), b"node1");
        assert_eq!(store.get("nodes", "n1").unwrap(), b"node1");
        assert_eq!(scope.list("n").unwrap().len(), 1);

        scope.delete("n1").unwrap();
        assert!(matches!(scope.get("n1"), Err(Error::NotFound)));
    }
}
