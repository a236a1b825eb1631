// SPDX-License-Identifier: PMPL-1.0-or-later
//! Runs the conformance battery against every backend shipped in the workspace

use std::sync::Arc;

use async_trait::async_trait;
use pathstore_conformance::{memory_storage, run};
use pathstore_storage::key::ROOT;
use pathstore_storage::{Kv, MemoryStorage, MetricsStorage, Storage, StorageResult};

/// Lists only direct children of a non-root parent, dropping deeper entries.
#[derive(Default)]
struct ChildrenOnlyStorage(MemoryStorage);

#[async_trait]
impl Storage for ChildrenOnlyStorage {
    async fn put(&self, kvs: &[Kv]) -> StorageResult<()> {
        self.0.put(kvs).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.0.delete(key).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.0.exists(key).await
    }

    async fn list(&self, key: &str) -> StorageResult<Vec<Kv>> {
        let listed = self.0.list(key).await?;
        if key == ROOT {
            return Ok(listed);
        }
        Ok(listed.into_iter().filter(|kv| !kv.key().contains('/')).collect())
    }

    async fn search(&self, key: &str) -> StorageResult<Kv> {
        self.0.search(key).await
    }

    fn name(&self) -> &str {
        "children-only"
    }
}

/// Reports any path with entries below it as existing, like a directory.
#[derive(Default)]
struct DirectoriesExistStorage(MemoryStorage);

#[async_trait]
impl Storage for DirectoriesExistStorage {
    async fn put(&self, kvs: &[Kv]) -> StorageResult<()> {
        self.0.put(kvs).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.0.delete(key).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        if self.0.exists(key).await? {
            return Ok(true);
        }
        Ok(!self.0.list(key).await?.is_empty())
    }

    async fn list(&self, key: &str) -> StorageResult<Vec<Kv>> {
        self.0.list(key).await
    }

    async fn search(&self, key: &str) -> StorageResult<Kv> {
        self.0.search(key).await
    }

    fn name(&self) -> &str {
        "directories-exist"
    }
}

#[tokio::test]
async fn test_memory_storage_conforms() {
    run(&memory_storage()).await;
}

#[tokio::test]
async fn test_memory_storage_conforms_when_prepopulated() {
    let storage = memory_storage();
    storage
        .put(&[
            Kv::new("/check_list-key", "parent-of-nothing"),
            Kv::new("/unrelated/deep/key", "x"),
        ])
        .await
        .unwrap();

    run(&storage).await;
}

#[tokio::test]
async fn test_metrics_wrapper_conforms() {
    let storage = MetricsStorage::new(memory_storage());
    run(&storage).await;

    let stats = storage.stats().await;
    assert!(stats.put_count > 0);
    assert!(stats.list_count > 0);
    assert!(stats.error_count > 0, "invalid keys are counted as errors");
}

#[tokio::test]
async fn test_trait_object_conforms() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::default());
    run(&storage).await;

    let boxed: Box<dyn Storage> = Box::new(MemoryStorage::default());
    run(boxed.as_ref()).await;
}

#[tokio::test]
async fn test_suite_runs_twice_on_one_backend() {
    let storage = memory_storage();
    run(&storage).await;
    run(&storage).await;
}

#[tokio::test]
#[should_panic(expected = "check_list_nested")]
async fn test_backend_dropping_deep_descendants_fails() {
    run(&ChildrenOnlyStorage::default()).await;
}

#[tokio::test]
#[should_panic(expected = "check_parent_is_not_an_entry")]
async fn test_backend_reporting_parents_as_entries_fails() {
    run(&DirectoriesExistStorage::default()).await;
}

#[cfg(feature = "redb-backend")]
#[tokio::test]
async fn test_redb_storage_conforms() {
    use pathstore_storage::RedbStorage;

    let dir = tempfile::tempdir().unwrap();
    let storage = RedbStorage::open(dir.path().join("conformance.redb")).unwrap();
    run(&storage).await;
}
