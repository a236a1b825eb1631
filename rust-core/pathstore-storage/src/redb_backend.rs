// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>
//
// redb-backed persistent storage backend for PathStore.
//
// Uses redb (pure Rust, B-tree, ACID, single-file database) to provide
// durable path-keyed storage. No C/C++ dependencies.
//
// # Design
//
// - Single redb `Database` file containing one `&str -> &str` table.
// - Keys are sanitized on the async side, before any transaction starts.
// - Read transactions for exists/search/list, write transactions for
//   put/delete. A whole `put` batch is one write transaction.
// - `list` uses redb's ordered `range()` from `parent/` and stops at the
//   first key outside that prefix.
// - All redb calls run on the blocking pool; a worker cancelled by runtime
//   shutdown surfaces as `StorageError::Cancelled`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, TableDefinition, TableError};
use tokio::task::JoinError;
use tracing::debug;

use crate::backend::Storage;
use crate::error::{StorageError, StorageResult};
use crate::key::{child_of, sanitize_key, sanitize_list_key, ROOT, SEPARATOR};
use crate::kv::Kv;

/// Table holding canonical key to value.
const MAIN_TABLE: TableDefinition<&str, &str> = TableDefinition::new("kv");

/// A persistent storage backend powered by redb.
///
/// Thread-safe: `Database` is `Send + Sync` and handles internal locking.
///
/// # Example
///
/// ```rust,no_run
/// use pathstore_storage::redb_backend::RedbStorage;
/// use pathstore_storage::{Kv, Storage};
///
/// # tokio_test::block_on(async {
/// let store = RedbStorage::open("/tmp/pathstore-test.redb").unwrap();
/// store.put(&[Kv::new("hello", "world")]).await.unwrap();
/// let kv = store.search("hello").await.unwrap();
/// assert_eq!(kv, Kv::new("/hello", "world"));
/// # });
/// ```
pub struct RedbStorage {
    /// The redb database handle.
    db: Arc<Database>,
    /// Path to the database file, for diagnostics.
    path: PathBuf,
}

impl RedbStorage {
    /// Open or create a redb database at the given path.
    ///
    /// Creates the file and parent directories if they don't exist. The table
    /// is created on first write.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(&path).map_err(|e| {
            StorageError::BackendUnavailable(format!(
                "failed to open redb at {}: {}",
                path.display(),
                e
            ))
        })?;

        debug!(path = %path.display(), "opened redb backend");

        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    /// Return the filesystem path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the database on the blocking pool.
    async fn blocking<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> StorageResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(join_error)?
    }
}

fn join_error(err: JoinError) -> StorageError {
    if err.is_cancelled() {
        StorageError::Cancelled
    } else {
        StorageError::BackendUnavailable(format!("task join: {err}"))
    }
}

/// Look up one canonical key in a read transaction.
fn get_value(db: &Database, key: &str) -> StorageResult<Option<String>> {
    let txn = db
        .begin_read()
        .map_err(|e| StorageError::BackendUnavailable(format!("read txn: {e}")))?;

    let table = match txn.open_table(MAIN_TABLE) {
        Ok(t) => t,
        // Table doesn't exist yet: nothing has been written.
        Err(TableError::TableDoesNotExist(_)) => return Ok(None),
        Err(e) => return Err(StorageError::BackendUnavailable(format!("open table: {e}"))),
    };

    match table.get(key) {
        Ok(Some(value)) => Ok(Some(value.value().to_string())),
        Ok(None) => Ok(None),
        Err(e) => Err(StorageError::CorruptedData(format!("get: {e}"))),
    }
}

impl std::fmt::Debug for RedbStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStorage")
            .field("path", &self.path)
            .finish()
    }
}

#[async_trait]
impl Storage for RedbStorage {
    async fn put(&self, kvs: &[Kv]) -> StorageResult<()> {
        let entries = kvs
            .iter()
            .map(|kv| Ok((sanitize_key(kv.key())?, kv.val().to_string())))
            .collect::<StorageResult<Vec<_>>>()?;
        let count = entries.len();

        self.blocking(move |db| {
            let txn = db
                .begin_write()
                .map_err(|e| StorageError::BackendUnavailable(format!("write txn: {e}")))?;
            {
                let mut table = txn
                    .open_table(MAIN_TABLE)
                    .map_err(|e| StorageError::BackendUnavailable(format!("open table: {e}")))?;
                for (k, v) in &entries {
                    table
                        .insert(k.as_str(), v.as_str())
                        .map_err(|e| StorageError::CorruptedData(format!("insert: {e}")))?;
                }
            }
            txn.commit()
                .map_err(|e| StorageError::CorruptedData(format!("commit: {e}")))?;
            Ok(())
        })
        .await?;

        debug!(count, "stored entries");
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let key = sanitize_key(key)?;

        self.blocking(move |db| {
            let txn = db
                .begin_write()
                .map_err(|e| StorageError::BackendUnavailable(format!("write txn: {e}")))?;
            {
                let mut table = txn
                    .open_table(MAIN_TABLE)
                    .map_err(|e| StorageError::BackendUnavailable(format!("open table: {e}")))?;
                table
                    .remove(key.as_str())
                    .map_err(|e| StorageError::CorruptedData(format!("remove: {e}")))?;
            }
            txn.commit()
                .map_err(|e| StorageError::CorruptedData(format!("commit: {e}")))?;
            Ok(())
        })
        .await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let key = sanitize_key(key)?;
        let value = self.blocking(move |db| get_value(db, &key)).await?;
        Ok(value.is_some())
    }

    async fn list(&self, key: &str) -> StorageResult<Vec<Kv>> {
        let parent = sanitize_list_key(key)?;

        self.blocking(move |db| {
            let txn = db
                .begin_read()
                .map_err(|e| StorageError::BackendUnavailable(format!("read txn: {e}")))?;
            let table = match txn.open_table(MAIN_TABLE) {
                Ok(t) => t,
                Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
                Err(e) => {
                    return Err(StorageError::BackendUnavailable(format!("open table: {e}")))
                }
            };

            // Root lists everything; otherwise start at the first possible child.
            let start = if parent == ROOT {
                ROOT.to_string()
            } else {
                format!("{parent}{SEPARATOR}")
            };
            let iter = table
                .range(start.as_str()..)
                .map_err(|e| StorageError::CorruptedData(format!("range scan: {e}")))?;

            let mut results = Vec::new();
            for entry in iter {
                let entry =
                    entry.map_err(|e| StorageError::CorruptedData(format!("scan entry: {e}")))?;
                let k = entry.0.value();
                if !k.starts_with(&start) {
                    break;
                }
                if let Some(rel) = child_of(&parent, k) {
                    results.push(Kv::new(rel, entry.1.value()));
                }
            }

            Ok(results)
        })
        .await
    }

    async fn search(&self, key: &str) -> StorageResult<Kv> {
        let key = sanitize_key(key)?;

        let lookup = key.clone();
        match self.blocking(move |db| get_value(db, &lookup)).await? {
            Some(val) => Ok(Kv::new(key, val)),
            None => Err(StorageError::NotFound(key)),
        }
    }

    fn name(&self) -> &str {
        "redb"
    }
}
