// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core storage trait for PathStore.
//
// Defines the `Storage` trait that all storage implementations must satisfy:
// five operations over a flat key space that behaves like a path hierarchy.
// Backends are expected to be thread-safe (`Send + Sync`) and fully
// asynchronous. Cancellation is cooperative: dropping an operation's future
// abandons it at the next await point, and backends that hand work to
// blocking threads report a cancelled worker as `StorageError::Cancelled`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::kv::Kv;

/// A pluggable key-value storage backend with path-shaped keys.
///
/// Every operation that takes a key sanitizes it with
/// [`crate::key::sanitize_key`] first and fails with
/// [`crate::StorageError::InvalidKey`] before touching any data. `list` is
/// the one exception: it also accepts the root key `/`.
///
/// New implementations should pass the `pathstore-conformance` suite.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store every pair in `kvs`, overwriting existing values.
    ///
    /// All keys are validated before anything is written; one invalid key
    /// fails the whole batch and nothing is stored. Whether the writes of a
    /// valid batch become visible atomically is backend-specific.
    async fn put(&self, kvs: &[Kv]) -> StorageResult<()>;

    /// Remove the value stored under `key`.
    ///
    /// Deleting a key that does not exist succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check whether a value is stored under `key`.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// List the entries stored below `key`, with keys relative to it.
    ///
    /// Listing `/` returns every entry with its leading slash stripped, the
    /// way `ls /` prints `file` for `/file`. Listing `/foo` with `/foo/bar`
    /// stored returns `bar`; it does not return `/foobar`. A key without
    /// children yields an empty list. Order is unspecified.
    async fn list(&self, key: &str) -> StorageResult<Vec<Kv>>;

    /// Return the pair stored under `key`, with the key in canonical form.
    ///
    /// Fails with [`crate::StorageError::NotFound`] if there is none.
    async fn search(&self, key: &str) -> StorageResult<Kv>;

    /// A human-readable name for this backend, used in logging and metrics.
    fn name(&self) -> &str;
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for Arc<S> {
    async fn put(&self, kvs: &[Kv]) -> StorageResult<()> {
        (**self).put(kvs).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        (**self).delete(key).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        (**self).exists(key).await
    }

    async fn list(&self, key: &str) -> StorageResult<Vec<Kv>> {
        (**self).list(key).await
    }

    async fn search(&self, key: &str) -> StorageResult<Kv> {
        (**self).search(key).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for Box<S> {
    async fn put(&self, kvs: &[Kv]) -> StorageResult<()> {
        (**self).put(kvs).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        (**self).delete(key).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        (**self).exists(key).await
    }

    async fn list(&self, key: &str) -> StorageResult<Vec<Kv>> {
        (**self).list(key).await
    }

    async fn search(&self, key: &str) -> StorageResult<Kv> {
        (**self).search(key).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
