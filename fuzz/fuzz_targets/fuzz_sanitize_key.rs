// SPDX-License-Identifier: PMPL-1.0-or-later
// Fuzz target for key sanitization and the list matching rule

#![no_main]

use libfuzzer_sys::fuzz_target;
use pathstore_storage::key::{child_of, is_valid_key, sanitize_key, sanitize_list_key, ROOT};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    match sanitize_key(s) {
        Ok(canonical) => {
            assert!(is_valid_key(s));
            assert!(canonical.starts_with('/'));
            assert!(!canonical.ends_with('/'));
            assert!(!canonical.contains("//"));
            assert_eq!(sanitize_key(&canonical).ok().as_deref(), Some(canonical.as_str()));

            // Every canonical key is listed under the root, minus its slash.
            assert_eq!(child_of(ROOT, &canonical), Some(&canonical[1..]));
            // A key is never its own child.
            assert_eq!(child_of(&canonical, &canonical), None);
        }
        Err(err) => {
            assert!(!is_valid_key(s));
            assert!(err.is_invalid_key());
            assert_eq!(sanitize_list_key(s).is_ok(), s == ROOT);
        }
    }
});
