use bucket_store::config::{Backend, Config};
use bucket_store::engine::DB_FILE_NAME;
use bucket_store::{sdk, Error};
use std::path::PathBuf;

fn config(backend: Backend, data_dir: PathBuf) -> Config {
    Config {
        data_dir,
        backend,
        ..Config::default()
    }
}

#[test]
fn test_memory_backend_via_sdk() {
    let store = sdk::new(&config(Backend::Memory, PathBuf::new())).unwrap();

    store.put("containers", "c1", b"running").unwrap();
    assert_eq!(store.get("containers", "c1").unwrap(), b"running");
    store.close().unwrap();
}

#[test]
fn test_durable_backend_persists_via_sdk() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");

    let store = sdk::new(&config(Backend::Durable, data_dir.clone())).unwrap();
    let nodes = store.bucket("nodes");
    nodes.put("n1", b"ready").unwrap();
    nodes.put("n2", b"draining").unwrap();
    store.close().unwrap();

    assert!(data_dir.join(DB_FILE_NAME).exists());

    let store = sdk::new(&config(Backend::Durable, data_dir)).unwrap();
    let entries = store.list("nodes", "n").unwrap();
    let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["n1", "n2"]);
    assert_eq!(entries[1].value, b"draining");
    assert!(matches!(store.get("containers", "c1"), Err(Error::BucketNotFound)));
    store.close().unwrap();
}

#[test]
fn test_memory_backend_starts_empty() {
    let first = sdk::new(&config(Backend::Memory, PathBuf::new())).unwrap();
    first.put("nodes", "n1", b"ready").unwrap();

    let second = sdk::new(&config(Backend::Memory, PathBuf::new())).unwrap();
    assert!(second.buckets().unwrap().is_empty());
}

#[test]
fn test_invalid_config_is_rejected() {
    let result = sdk::new(&config(Backend::Durable, PathBuf::new()));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_unusable_data_dir_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let result = sdk::new(&config(Backend::Durable, blocker.join("data")));
    assert!(matches!(result, Err(Error::Io(_))));
}
