// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PathStore migration crate.
//
// Moves entries between any two `Storage` backends so that repeated runs are
// cheap and never duplicate work. Two strategies are offered:
//
// - `MigrationStrategy::Diff` (default) copies only the keys missing from the
//   destination, computed from full listings of both sides. It needs no
//   reserved key.
// - `MigrationStrategy::Marker` copies everything once and records completion
//   under a reserved marker key in the destination. The marker shares the
//   destination's key space, so it must not collide with real data.
//
// Logging goes through `tracing`; callers install whatever subscriber they
// use.

pub mod config;
pub mod migrator;

pub use config::{MigrationStrategy, MigratorConfig, DEFAULT_MARKER_KEY, DEFAULT_MARKER_VALUE};
pub use migrator::{copy_all, MigrationReport, Migrator};
