// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PathStore Storage Abstraction
//
// This crate provides a backend-agnostic key-value storage interface whose
// flat key space behaves like a filesystem hierarchy. Keys are slash-separated
// paths; `list` returns the entries below a path. The core `Storage` trait
// defines the contract that all backends must implement, so callers and the
// migrator can swap backends without changing application logic.
//
// # Modules
//
// - [`key`] -- Key sanitization and the parent/child matching rule.
// - [`kv`] -- The `Kv` key-value pair.
// - [`backend`] -- The `Storage` trait.
// - [`error`] -- The `StorageError` enum and its classification predicates.
// - [`memory`] -- An in-memory `BTreeMap`-based reference backend.
// - [`metrics`] -- A transparent wrapper that collects operation statistics.
//
// # Example
//
// ```rust
// use pathstore_storage::{Kv, MemoryStorage, MetricsStorage, Storage};
//
// # tokio_test::block_on(async {
// let store = MetricsStorage::new(MemoryStorage::default());
//
// store.put(&[Kv::new("/a", "1"), Kv::new("b/c", "2")]).await.unwrap();
//
// let mut all = store.list("/").await.unwrap();
// all.sort();
// assert_eq!(all, vec![Kv::new("a", "1"), Kv::new("b/c", "2")]);
// # });
// ```

pub mod backend;
pub mod error;
pub mod key;
pub mod kv;
pub mod memory;
pub mod metrics;

// Optional persistent backends, feature-gated to keep the default build lean.
#[cfg(feature = "redb-backend")]
pub mod redb_backend;

// Re-export the most commonly used types at the crate root for convenience.
pub use backend::Storage;
pub use error::{StorageError, StorageResult};
pub use key::{sanitize_key, sanitize_list_key};
pub use kv::Kv;
pub use memory::{MemoryConfig, MemoryStorage};
pub use metrics::{MetricsStorage, StorageStats};

#[cfg(feature = "redb-backend")]
pub use redb_backend::RedbStorage;
