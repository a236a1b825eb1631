// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory storage backend for PathStore.
//
// Uses a `BTreeMap` from canonical key to value behind a single tokio
// `Mutex`. Every operation sanitizes its keys first and only then takes the
// lock, holding it for that one operation. The map ordering lets `list` scan
// just the `parent/` range instead of the whole key set.
// Intended for testing, development, and small ephemeral datasets.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::backend::Storage;
use crate::error::{StorageError, StorageResult};
use crate::key::{child_of, sanitize_key, sanitize_list_key, ROOT, SEPARATOR};
use crate::kv::Kv;

/// Configuration for [`MemoryStorage`]. The memory backend has no settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {}

/// An in-memory storage backend backed by a sorted `BTreeMap`.
///
/// All data lives in process memory and is lost on drop. Clones share the
/// same map, making it suitable for concurrent tokio tasks.
///
/// # Example
///
/// ```rust
/// use pathstore_storage::{Kv, MemoryStorage, Storage};
///
/// # tokio_test::block_on(async {
/// let store = MemoryStorage::default();
/// store.put(&[Kv::new("ns/one", "x")]).await.unwrap();
/// let kv = store.search("/ns/one/").await.unwrap();
/// assert_eq!(kv, Kv::new("/ns/one", "x"));
/// assert_eq!(store.list("ns").await.unwrap(), vec![Kv::new("one", "x")]);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    /// Canonical key to value, protected by one exclusive lock.
    data: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    /// Create a new, empty in-memory backend.
    pub fn new(_config: MemoryConfig) -> Self {
        Self {
            data: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Return the number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.data.lock().await.len()
    }

    /// Return true if the store contains no keys.
    pub async fn is_empty(&self) -> bool {
        self.data.lock().await.is_empty()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(&self, kvs: &[Kv]) -> StorageResult<()> {
        let entries = kvs
            .iter()
            .map(|kv| Ok((sanitize_key(kv.key())?, kv.val().to_string())))
            .collect::<StorageResult<Vec<_>>>()?;

        let mut map = self.data.lock().await;
        for (key, val) in entries {
            map.insert(key, val);
        }
        debug!(count = kvs.len(), "stored entries");
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let key = sanitize_key(key)?;

        let mut map = self.data.lock().await;
        if map.remove(&key).is_some() {
            debug!(key = %key, "deleted entry");
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let key = sanitize_key(key)?;

        let map = self.data.lock().await;
        Ok(map.contains_key(&key))
    }

    async fn list(&self, key: &str) -> StorageResult<Vec<Kv>> {
        let parent = sanitize_list_key(key)?;

        let map = self.data.lock().await;
        if parent == ROOT {
            let all = map
                .iter()
                .filter_map(|(k, v)| child_of(ROOT, k).map(|rel| Kv::new(rel, v.as_str())))
                .collect();
            return Ok(all);
        }

        // Every child of `/a` sorts at or after `/a/` and shares that prefix.
        let start = format!("{parent}{SEPARATOR}");
        let children = map
            .range(start.clone()..)
            .take_while(|(k, _)| k.starts_with(&start))
            .filter_map(|(k, v)| child_of(&parent, k).map(|rel| Kv::new(rel, v.as_str())))
            .collect();
        Ok(children)
    }

    async fn search(&self, key: &str) -> StorageResult<Kv> {
        let key = sanitize_key(key)?;

        let map = self.data.lock().await;
        match map.get(&key) {
            Some(val) => Ok(Kv::new(key, val.as_str())),
            None => Err(StorageError::NotFound(key)),
        }
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
