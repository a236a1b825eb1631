// SPDX-License-Identifier: PMPL-1.0-or-later
//! Property-based tests for key sanitization and listing

use pathstore_storage::key::{child_of, is_valid_key, sanitize_key, ROOT};
use pathstore_storage::{Kv, MemoryStorage, Storage};
use proptest::prelude::*;

/// A single path segment without separators
fn arb_segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9._-]{1,8}"
}

/// A valid key: segments joined by single slashes, optionally with a leading
/// and/or trailing slash
fn arb_valid_key() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(arb_segment(), 1..5),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(segments, leading, trailing)| {
            let mut key = segments.join("/");
            if leading {
                key.insert(0, '/');
            }
            if trailing {
                key.push('/');
            }
            key
        })
}

proptest! {
    #[test]
    fn test_sanitize_is_idempotent(key in arb_valid_key()) {
        let once = sanitize_key(&key).unwrap();
        let twice = sanitize_key(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_sanitized_key_invariants(key in arb_valid_key()) {
        let canonical = sanitize_key(&key).unwrap();
        prop_assert!(canonical.starts_with('/'));
        prop_assert!(!canonical.starts_with("//"));
        prop_assert!(!canonical.ends_with('/'));
        prop_assert!(!canonical.contains("//"));
        prop_assert!(canonical != ROOT);
    }

    #[test]
    fn test_slash_variants_share_canonical_form(key in arb_valid_key()) {
        let bare = key.trim_matches('/').to_string();
        let canonical = sanitize_key(&bare).unwrap();
        for variant in [format!("/{bare}"), format!("{bare}/"), format!("/{bare}/")] {
            prop_assert_eq!(sanitize_key(&variant).unwrap(), canonical.clone());
        }
    }

    #[test]
    fn test_doubled_slash_is_never_repaired(
        left in "[a-z/]{0,6}",
        right in "[a-z/]{0,6}",
    ) {
        let key = format!("{left}//{right}");
        prop_assert!(!is_valid_key(&key));
        prop_assert!(sanitize_key(&key).unwrap_err().is_invalid_key());
    }

    #[test]
    fn test_child_of_never_matches_false_prefix(
        parent in arb_valid_key(),
        suffix in "[a-z]{1,4}",
        child in arb_segment(),
    ) {
        let parent = sanitize_key(&parent).unwrap();
        // `/p` + `x/child` shares the prefix but is not below `/p`.
        let sibling = format!("{parent}{suffix}/{child}");
        prop_assert_eq!(child_of(&parent, &sibling), None);

        let below = format!("{parent}/{child}");
        prop_assert_eq!(child_of(&parent, &below), Some(child.as_str()));
    }

    #[test]
    fn test_listing_returns_exactly_the_children(
        parent in arb_valid_key(),
        children in prop::collection::btree_set(arb_segment(), 1..6),
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let store = MemoryStorage::default();
            let parent = sanitize_key(&parent).unwrap();

            let kvs: Vec<Kv> = children
                .iter()
                .map(|c| Kv::new(format!("{parent}/{c}"), c.as_str()))
                .collect();
            store.put(&kvs).await.unwrap();
            // A sibling sharing the parent as a plain string prefix.
            store.put(&[Kv::new(format!("{parent}_/decoy"), "decoy")]).await.unwrap();

            let mut listed = store.list(&parent).await.unwrap();
            listed.sort();
            let expected: Vec<Kv> = children.iter().map(|c| Kv::new(c.as_str(), c.as_str())).collect();
            prop_assert_eq!(listed, expected);

            Ok(())
        })?;
    }
}
