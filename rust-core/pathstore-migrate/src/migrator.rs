// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Idempotent migration between two storage backends.
//
// The migrator treats source and destination as opaque `Storage` endpoints
// and converges the destination towards the source:
//
// - Diff: list both roots, put the source entries whose keys the
//   destination lacks in one batch. Re-running finds an empty delta and
//   writes nothing.
// - Marker: unless the destination already holds the marker, copy every
//   source entry one by one and then write the marker. Re-running stops at
//   the marker check.
//
// A failing step aborts the run with context naming the side and key. Entries
// copied before the failure stay in the destination. The copy loop is
// sequential and takes no locks; concurrent writers to either side during a
// migration may leave the destination inconsistent.

use std::collections::HashSet;

use pathstore_storage::key::ROOT;
use pathstore_storage::{Kv, Storage, StorageResult};
use tracing::{debug, info, instrument};

use crate::config::{MigrationStrategy, MigratorConfig};

const KEY_SUMMARY_LIMIT: usize = 5;

/// What a migration run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// The strategy that ran.
    pub strategy: MigrationStrategy,
    /// Entries written to the destination, excluding the marker.
    pub copied: usize,
    /// True when the marker showed the migration had already completed.
    pub already_migrated: bool,
}

/// Copies entries from a source backend to a destination backend.
///
/// # Example
///
/// ```rust
/// use pathstore_migrate::{Migrator, MigratorConfig};
/// use pathstore_storage::{Kv, MemoryStorage, Storage};
///
/// # tokio_test::block_on(async {
/// let src = MemoryStorage::default();
/// let dst = MemoryStorage::default();
/// src.put(&[Kv::new("/a", "1"), Kv::new("/b/c", "2")]).await.unwrap();
///
/// let migrator = Migrator::new(MigratorConfig::default()).unwrap();
/// assert_eq!(migrator.migrate(&dst, &src).await.unwrap().copied, 2);
/// assert_eq!(migrator.migrate(&dst, &src).await.unwrap().copied, 0);
/// assert_eq!(dst.search("b/c").await.unwrap().val(), "2");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Migrator {
    config: MigratorConfig,
    /// Canonical form of `config.marker_key`.
    marker_key: String,
}

impl Migrator {
    /// Create a migrator, failing with `InvalidConfig` on bad marker settings.
    pub fn new(config: MigratorConfig) -> StorageResult<Self> {
        let marker_key = config.validate()?;
        Ok(Self { config, marker_key })
    }

    /// The configuration this migrator was built with.
    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    /// Migrate every entry of `src` into `dst`.
    #[instrument(skip_all, fields(dst = dst.name(), src = src.name(), strategy = ?self.config.strategy))]
    pub async fn migrate<D, S>(&self, dst: &D, src: &S) -> StorageResult<MigrationReport>
    where
        D: Storage + ?Sized,
        S: Storage + ?Sized,
    {
        match self.config.strategy {
            MigrationStrategy::Diff => self.migrate_diff(dst, src).await,
            MigrationStrategy::Marker => self.migrate_marker(dst, src).await,
        }
    }

    async fn migrate_diff<D, S>(&self, dst: &D, src: &S) -> StorageResult<MigrationReport>
    where
        D: Storage + ?Sized,
        S: Storage + ?Sized,
    {
        debug!("listing source and destination");
        let src_entries = list_root_or_empty(src, "src").await?;
        let dst_entries = list_root_or_empty(dst, "dst").await?;

        let present: HashSet<&str> = dst_entries.iter().map(Kv::key).collect();
        let delta: Vec<Kv> = src_entries
            .into_iter()
            .filter(|kv| !present.contains(kv.key()))
            .collect();

        if delta.is_empty() {
            info!("destination already has every source key");
            return Ok(self.report(0, false));
        }

        debug!(count = delta.len(), "putting missing entries");
        dst.put(&delta)
            .await
            .map_err(|e| e.context(format!("dst storage: putting keys={}", key_summary(&delta))))?;

        info!(copied = delta.len(), "migration finished");
        Ok(self.report(delta.len(), false))
    }

    async fn migrate_marker<D, S>(&self, dst: &D, src: &S) -> StorageResult<MigrationReport>
    where
        D: Storage + ?Sized,
        S: Storage + ?Sized,
    {
        let marker_key = self.marker_key.as_str();

        debug!(key = marker_key, "checking if migration is already done");
        match dst.search(marker_key).await {
            Ok(kv) if kv.val() == self.config.marker_value => {
                info!("migration already done");
                return Ok(self.report(0, true));
            }
            // Unknown marker value: migrate again and overwrite it.
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.context(format!("dst storage: searching key={marker_key}"))),
        }

        let copied = copy_all(dst, src).await?;

        debug!(key = marker_key, "setting migration mark");
        dst.put(&[Kv::new(marker_key, self.config.marker_value.as_str())])
            .await
            .map_err(|e| e.context(format!("dst storage: putting key={marker_key}")))?;

        info!(copied, "migration finished");
        Ok(self.report(copied, false))
    }

    fn report(&self, copied: usize, already_migrated: bool) -> MigrationReport {
        MigrationReport {
            strategy: self.config.strategy,
            copied,
            already_migrated,
        }
    }
}

/// Copy every entry of `src` into `dst`, one key at a time.
///
/// Each key is read back from `src` with `search` and written with its own
/// `put`, so a failure names the exact key and side. Keys already present in
/// `dst` are overwritten. Returns the number of entries copied.
pub async fn copy_all<D, S>(dst: &D, src: &S) -> StorageResult<usize>
where
    D: Storage + ?Sized,
    S: Storage + ?Sized,
{
    let entries = list_root_or_empty(src, "src").await?;

    debug!(count = entries.len(), "transferring entries");
    for entry in &entries {
        let key = entry.key();
        let kv = src
            .search(key)
            .await
            .map_err(|e| e.context(format!("src storage: getting key={key}")))?;

        dst.put(&[kv])
            .await
            .map_err(|e| e.context(format!("dst storage: putting key={key}")))?;
    }

    Ok(entries.len())
}

/// Up to `KEY_SUMMARY_LIMIT` keys of a batch, for error context.
fn key_summary(kvs: &[Kv]) -> String {
    let shown: Vec<&str> = kvs.iter().take(KEY_SUMMARY_LIMIT).map(Kv::key).collect();
    match kvs.len().saturating_sub(KEY_SUMMARY_LIMIT) {
        0 => format!("[{}]", shown.join(", ")),
        rest => format!("[{}, ... {rest} more]", shown.join(", ")),
    }
}

/// List everything under the root, treating `NotFound` as an empty backend.
async fn list_root_or_empty<T: Storage + ?Sized>(storage: &T, side: &str) -> StorageResult<Vec<Kv>> {
    match storage.list(ROOT).await {
        Ok(entries) => Ok(entries),
        Err(e) if e.is_not_found() => {
            debug!(side, "storage is empty");
            Ok(Vec::new())
        }
        Err(e) => Err(e.context(format!("{side} storage: listing key={ROOT}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_summary_lists_small_batches_whole() {
        let kvs = [Kv::new("a", "1"), Kv::new("b/c", "2")];
        assert_eq!(key_summary(&kvs), "[a, b/c]");
    }

    #[test]
    fn test_key_summary_truncates_large_batches() {
        let kvs: Vec<Kv> = (0..8).map(|i| Kv::new(format!("k{i}"), "v")).collect();
        assert_eq!(key_summary(&kvs), "[k0, k1, k2, k3, k4, ... 3 more]");
    }
}
