// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Key sanitization and hierarchy rules.
//
// Keys are slash-separated paths stored in a flat key space. Every backend
// runs caller keys through `sanitize_key` before touching its data, so the
// stored form always has exactly one leading slash, no trailing slash, and no
// empty segments. `child_of` recovers the hierarchy at list time.

use crate::error::{StorageError, StorageResult};

/// Path separator.
pub const SEPARATOR: char = '/';

/// The key accepted by `list` to mean "everything".
pub const ROOT: &str = "/";

/// Check whether `key` can be sanitized.
///
/// A valid key is non-empty, is not `/` alone, and contains no `//`.
/// A valid key is not necessarily a sanitized key.
pub fn is_valid_key(key: &str) -> bool {
    !(key.is_empty() || key == ROOT || key.contains("//"))
}

/// Normalize `key` to its canonical form.
///
/// Adds a missing leading slash and removes one trailing slash, so `"a/b"`,
/// `"/a/b"`, `"a/b/"` and `"/a/b/"` all become `"/a/b"`. Fails with
/// [`StorageError::InvalidKey`] if the key is not [valid](is_valid_key);
/// doubled slashes are rejected, never repaired.
///
/// ```rust
/// use pathstore_storage::key::sanitize_key;
///
/// assert_eq!(sanitize_key("a/b/").unwrap(), "/a/b");
/// assert!(sanitize_key("a//b").unwrap_err().is_invalid_key());
/// ```
pub fn sanitize_key(key: &str) -> StorageResult<String> {
    if !is_valid_key(key) {
        return Err(StorageError::invalid_key(key));
    }

    let key = key.strip_suffix(SEPARATOR).unwrap_or(key);
    if key.starts_with(SEPARATOR) {
        Ok(key.to_string())
    } else {
        Ok(format!("{SEPARATOR}{key}"))
    }
}

/// Like [`sanitize_key`], but also accepts the root key `/`.
///
/// Used by `list`, which is the only operation that may address the root.
pub fn sanitize_list_key(key: &str) -> StorageResult<String> {
    if key == ROOT {
        return Ok(ROOT.to_string());
    }
    sanitize_key(key)
}

/// Return `key` relative to `parent` if `key` lives under `parent`.
///
/// Both arguments must be canonical (`parent` may also be [`ROOT`]). For the
/// root every key matches and comes back without its leading slash. For any
/// other parent the key must be longer than `parent + "/"`, start with
/// `parent`, and have a separator right after that prefix; otherwise a key
/// such as `/foo/bar/baz` would match a listing of `/foo/ba`.
///
/// ```rust
/// use pathstore_storage::key::child_of;
///
/// assert_eq!(child_of("/", "/a/b"), Some("a/b"));
/// assert_eq!(child_of("/foo", "/foo/bar/baz"), Some("bar/baz"));
/// assert_eq!(child_of("/foo/ba", "/foo/bar/baz"), None);
/// ```
pub fn child_of<'a>(parent: &str, key: &'a str) -> Option<&'a str> {
    if parent == ROOT {
        return key.strip_prefix(SEPARATOR);
    }
    key.strip_prefix(parent)?
        .strip_prefix(SEPARATOR)
        .filter(|rest| !rest.is_empty())
}

/// Join `child` onto `parent` with a single separator.
///
/// Trailing slashes on `parent` and leading slashes on `child` are collapsed,
/// so `join_key("a/", "/b")` is `"a/b"`. The result is not sanitized.
pub fn join_key(parent: &str, child: &str) -> String {
    let parent = parent.trim_end_matches(SEPARATOR);
    let child = child.trim_start_matches(SEPARATOR);
    if parent.is_empty() {
        return format!("{SEPARATOR}{child}");
    }
    format!("{parent}{SEPARATOR}{child}")
}
