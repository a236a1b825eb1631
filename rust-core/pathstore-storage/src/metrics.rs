// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Metrics-collecting wrapper for PathStore storage backends.
//
// Wraps any `Storage` and transparently collects operation counts, latency
// sums, error counts, and byte transfer totals. Useful for profiling and for
// checking how much work a migration really did.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::Storage;
use crate::error::StorageResult;
use crate::kv::Kv;

/// Accumulated statistics for a storage backend.
///
/// All counters are monotonically increasing for the lifetime of the
/// [`MetricsStorage`] that owns them, until [`MetricsStorage::reset_stats`].
#[derive(Debug, Clone, Default)]
pub struct StorageStats {
    /// Number of `put` calls performed.
    pub put_count: u64,
    /// Number of pairs written across all `put` calls.
    pub put_entries: u64,
    /// Number of `delete` calls performed.
    pub delete_count: u64,
    /// Number of `exists` calls performed.
    pub exists_count: u64,
    /// Number of `list` calls performed.
    pub list_count: u64,
    /// Number of `search` calls performed.
    pub search_count: u64,
    /// Number of calls, of any kind, that returned an error.
    pub error_count: u64,
    /// Cumulative wall-clock latency of all `put` calls, in milliseconds.
    pub put_latency_sum_ms: f64,
    /// Cumulative wall-clock latency of all `list` calls, in milliseconds.
    pub list_latency_sum_ms: f64,
    /// Cumulative wall-clock latency of all `search` calls, in milliseconds.
    pub search_latency_sum_ms: f64,
    /// Total value bytes returned by `search` and `list`.
    pub total_bytes_read: u64,
    /// Total value bytes accepted by successful `put` calls.
    pub total_bytes_written: u64,
}

/// A storage wrapper that collects operation metrics.
///
/// Delegates every operation to an inner backend while measuring wall-clock
/// latency and counting invocations. Statistics are available via
/// [`MetricsStorage::stats`].
///
/// # Example
///
/// ```rust
/// use pathstore_storage::{Kv, MemoryStorage, MetricsStorage, Storage};
///
/// # tokio_test::block_on(async {
/// let metered = MetricsStorage::new(MemoryStorage::default());
///
/// metered.put(&[Kv::new("key", "value")]).await.unwrap();
/// metered.search("key").await.unwrap();
///
/// let stats = metered.stats().await;
/// assert_eq!(stats.put_count, 1);
/// assert_eq!(stats.search_count, 1);
/// # });
/// ```
#[derive(Debug)]
pub struct MetricsStorage<S: Storage> {
    /// The wrapped backend that performs the actual storage operations.
    inner: S,
    /// Shared, mutable statistics accumulator.
    stats: Arc<RwLock<StorageStats>>,
}

impl<S: Storage> MetricsStorage<S> {
    /// Wrap `inner` with metrics collection.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            stats: Arc::new(RwLock::new(StorageStats::default())),
        }
    }

    /// Return a snapshot of the current statistics.
    pub async fn stats(&self) -> StorageStats {
        self.stats.read().await.clone()
    }

    /// Reset all statistics to zero.
    pub async fn reset_stats(&self) {
        let mut s = self.stats.write().await;
        *s = StorageStats::default();
    }

    /// Return a reference to the inner backend.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[async_trait]
impl<S: Storage> Storage for MetricsStorage<S> {
    async fn put(&self, kvs: &[Kv]) -> StorageResult<()> {
        let start = Instant::now();
        let result = self.inner.put(kvs).await;
        let elapsed = elapsed_ms(start);

        let mut s = self.stats.write().await;
        s.put_count += 1;
        s.put_latency_sum_ms += elapsed;
        match result {
            Ok(()) => {
                s.put_entries += kvs.len() as u64;
                s.total_bytes_written += kvs.iter().map(|kv| kv.val().len() as u64).sum::<u64>();
            }
            Err(_) => s.error_count += 1,
        }

        result
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let result = self.inner.delete(key).await;

        let mut s = self.stats.write().await;
        s.delete_count += 1;
        if result.is_err() {
            s.error_count += 1;
        }

        result
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let result = self.inner.exists(key).await;

        let mut s = self.stats.write().await;
        s.exists_count += 1;
        if result.is_err() {
            s.error_count += 1;
        }

        result
    }

    async fn list(&self, key: &str) -> StorageResult<Vec<Kv>> {
        let start = Instant::now();
        let result = self.inner.list(key).await;
        let elapsed = elapsed_ms(start);

        let mut s = self.stats.write().await;
        s.list_count += 1;
        s.list_latency_sum_ms += elapsed;
        match result {
            Ok(ref kvs) => {
                s.total_bytes_read += kvs.iter().map(|kv| kv.val().len() as u64).sum::<u64>();
            }
            Err(_) => s.error_count += 1,
        }

        result
    }

    async fn search(&self, key: &str) -> StorageResult<Kv> {
        let start = Instant::now();
        let result = self.inner.search(key).await;
        let elapsed = elapsed_ms(start);

        let mut s = self.stats.write().await;
        s.search_count += 1;
        s.search_latency_sum_ms += elapsed;
        match result {
            Ok(ref kv) => s.total_bytes_read += kv.val().len() as u64,
            // A miss is an answer, not a failure.
            Err(ref err) if err.is_not_found() => {}
            Err(_) => s.error_count += 1,
        }

        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
