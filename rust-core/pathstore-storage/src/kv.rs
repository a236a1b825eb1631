// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::fmt;

use serde::{Deserialize, Serialize};

/// A key-value pair, the unit of storage.
///
/// The key is a slash-separated path such as `/a/b/c`. Backends sanitize it
/// on the way in, so `a/b/c`, `/a/b/c`, `a/b/c/` and `/a/b/c/` name the same
/// entry. The value is an opaque string.
///
/// Ordering is by key, then value, which is what callers want when they sort
/// a listing (the storage contract does not order listings).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Kv {
    key: String,
    val: String,
}

impl Kv {
    /// Create a pair. The key is taken as-is; backends sanitize it.
    pub fn new(key: impl Into<String>, val: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            val: val.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn val(&self) -> &str {
        &self.val
    }

    /// Split into `(key, val)`.
    pub fn into_parts(self) -> (String, String) {
        (self.key, self.val)
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for Kv {
    fn from((key, val): (K, V)) -> Self {
        Kv::new(key, val)
    }
}

impl fmt::Display for Kv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.val)
    }
}
