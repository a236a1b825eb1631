// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PathStore conformance suite.
//
// A backend-agnostic battery of checks that any `Storage` implementation must
// pass unmodified. Backend authors call `run` from their own tests:
//
// ```rust
// use pathstore_storage::MemoryStorage;
//
// # tokio_test::block_on(async {
// pathstore_conformance::run(&MemoryStorage::default()).await;
// # });
// ```
//
// Checks panic with a descriptive message on the first violation. Every check
// generates fresh keys from a process-wide counter, so the battery can run
// against a shared backend that already holds data, and checks may run in
// any order.

use std::sync::atomic::{AtomicU64, Ordering};

use pathstore_storage::key::{join_key, sanitize_key, ROOT};
use pathstore_storage::{Kv, MemoryStorage, Storage};
use tracing::debug;

/// Keys that every operation must reject. `list` accepts `/` only.
pub const INVALID_KEYS: &[&str] = &[
    "",
    "/",
    "//",
    "///",
    "////",
    "key//",
    "//key",
    "//key/",
    "/key//",
    "in//between",
    "in///////between",
];

/// Run the full battery against `storage`.
pub async fn run<S: Storage + ?Sized>(storage: &S) {
    debug!(backend = storage.name(), "running storage conformance suite");

    check_basic_crud(storage).await;
    check_put_idempotent(storage).await;
    check_put_multiple(storage).await;
    check_invalid_batch_is_rejected_whole(storage).await;
    check_delete_not_existing(storage).await;
    check_invalid_key(storage).await;
    check_list(storage).await;
    check_list_nested(storage).await;
    check_parent_is_not_an_entry(storage).await;
    check_list_invalid(storage).await;
    check_list_empty_parent(storage).await;
}

/// A fresh memory backend, ready to be used in tests.
pub fn memory_storage() -> MemoryStorage {
    MemoryStorage::default()
}

static KEY_ID: AtomicU64 = AtomicU64::new(0);

/// Four spellings of four distinct fresh keys built from `base`: bare,
/// leading slash, trailing slash, and both.
pub fn valid_key_variations(base: &str) -> [String; 4] {
    let base = base.trim_matches('/');
    let next = || format!("{}-{:04}", base, KEY_ID.fetch_add(1, Ordering::Relaxed) + 1);

    [
        next(),
        format!("/{}", next()),
        format!("{}/", next()),
        format!("/{}/", next()),
    ]
}

fn canonical(kv: &Kv) -> Kv {
    let key = sanitize_key(kv.key())
        .unwrap_or_else(|err| panic!("test key {:?} must be valid: {err}", kv.key()));
    Kv::new(key, kv.val())
}

fn sorted(mut kvs: Vec<Kv>) -> Vec<Kv> {
    kvs.sort();
    kvs
}

/// Create, read, delete, and read again through every key spelling.
pub async fn check_basic_crud<S: Storage + ?Sized>(storage: &S) {
    let name = "check_basic_crud";
    let value = format!("{name}-value");

    for key in valid_key_variations(&format!("{name}-key")) {
        let kv = Kv::new(key.as_str(), value.as_str());

        let exists = storage.exists(&key).await.expect("exists before put");
        assert!(!exists, "{name}: key={key:?} must not exist yet");

        let err = storage.search(&key).await.expect_err("search before put");
        assert!(err.is_not_found(), "{name}: key={key:?} expected NotFound, got {err}");

        storage.put(&[kv.clone()]).await.expect("put");

        let exists = storage.exists(&key).await.expect("exists after put");
        assert!(exists, "{name}: key={key:?} must exist after put");

        let got = storage.search(&key).await.expect("search after put");
        assert_eq!(got, canonical(&kv), "{name}: key={key:?}");

        storage.delete(&key).await.expect("delete");

        let exists = storage.exists(&key).await.expect("exists after delete");
        assert!(!exists, "{name}: key={key:?} must not exist after delete");

        let err = storage.search(&key).await.expect_err("search after delete");
        assert!(err.is_not_found(), "{name}: key={key:?} expected NotFound, got {err}");
    }
}

/// Repeating a put changes nothing; a put with a new value overwrites.
pub async fn check_put_idempotent<S: Storage + ?Sized>(storage: &S) {
    let name = "check_put_idempotent";
    let value = format!("{name}-value");
    let overridden = format!("{name}-overridden-value");

    for key in valid_key_variations(&format!("{name}-key")) {
        let kv = Kv::new(key.as_str(), value.as_str());

        let exists = storage.exists(&key).await.expect("exists before put");
        assert!(!exists, "{name}: key={key:?} must not exist yet");

        for attempt in 1..=2 {
            storage.put(&[kv.clone()]).await.expect("put");
            let got = storage.search(&key).await.expect("search");
            assert_eq!(got, canonical(&kv), "{name}: key={key:?} put #{attempt}");
        }

        let overridden_kv = Kv::new(key.as_str(), overridden.as_str());
        storage.put(&[overridden_kv.clone()]).await.expect("overwrite");
        let got = storage.search(&key).await.expect("search after overwrite");
        assert_eq!(got, canonical(&overridden_kv), "{name}: key={key:?} overwrite");
    }
}

/// One put call stores a batch of independent keys, nested ones included.
pub async fn check_put_multiple<S: Storage + ?Sized>(storage: &S) {
    let name = "check_put_multiple";
    let [base, ..] = valid_key_variations(&format!("{name}-key"));

    let kvs = vec![
        Kv::new(format!("/{base}-1"), format!("{name}-value-1")),
        Kv::new(format!("/{base}-1/nested/key"), format!("{name}-value-1")),
        Kv::new(format!("/{base}-2"), format!("{name}-value-2")),
        Kv::new(format!("/{base}-3"), format!("{name}-value-3")),
    ];

    for kv in &kvs {
        let exists = storage.exists(kv.key()).await.expect("exists before put");
        assert!(!exists, "{name}: key={:?} must not exist yet", kv.key());
    }

    storage.put(&kvs).await.expect("batch put");

    for kv in &kvs {
        let got = storage.search(kv.key()).await.expect("search after batch put");
        assert_eq!(&got, kv, "{name}: key={:?}", kv.key());
    }
}

/// A batch holding one invalid key is rejected and writes nothing.
pub async fn check_invalid_batch_is_rejected_whole<S: Storage + ?Sized>(storage: &S) {
    let name = "check_invalid_batch_is_rejected_whole";
    let [good, ..] = valid_key_variations(&format!("{name}-key"));

    let kvs = vec![
        Kv::new(good.as_str(), "value"),
        Kv::new(format!("{good}//bad"), "value"),
    ];

    let err = storage.put(&kvs).await.expect_err("batch with invalid key");
    assert!(err.is_invalid_key(), "{name}: expected InvalidKey, got {err}");

    let exists = storage.exists(&good).await.expect("exists after rejected batch");
    assert!(!exists, "{name}: key={good:?} must not be written by a rejected batch");
}

/// Deleting a key that was never stored succeeds.
pub async fn check_delete_not_existing<S: Storage + ?Sized>(storage: &S) {
    let name = "check_delete_not_existing";

    for key in valid_key_variations(&format!("{name}-key")) {
        if let Err(err) = storage.delete(&key).await {
            panic!("{name}: key={key:?} delete of missing key failed: {err}");
        }
    }
}

/// Every operation rejects malformed keys with `InvalidKey`.
pub async fn check_invalid_key<S: Storage + ?Sized>(storage: &S) {
    let name = "check_invalid_key";
    let value = format!("{name}-value");

    for &key in INVALID_KEYS {
        let err = storage
            .put(&[Kv::new(key, value.as_str())])
            .await
            .expect_err("put with invalid key");
        assert!(err.is_invalid_key(), "{name}: put key={key:?} got {err}");

        let err = storage.delete(key).await.expect_err("delete with invalid key");
        assert!(err.is_invalid_key(), "{name}: delete key={key:?} got {err}");

        let err = storage.exists(key).await.expect_err("exists with invalid key");
        assert!(err.is_invalid_key(), "{name}: exists key={key:?} got {err}");

        // List is special and can take "/" as a key.
        if key == ROOT {
            if let Err(err) = storage.list(key).await {
                panic!("{name}: list of root failed: {err}");
            }
        } else {
            let err = storage.list(key).await.expect_err("list with invalid key");
            assert!(err.is_invalid_key(), "{name}: list key={key:?} got {err}");
        }

        let err = storage.search(key).await.expect_err("search with invalid key");
        assert!(err.is_invalid_key(), "{name}: search key={key:?} got {err}");
    }
}

/// Listing a parent returns its children with parent-relative keys.
pub async fn check_list<S: Storage + ?Sized>(storage: &S) {
    let name = "check_list";
    let value = format!("{name}-value");

    for parent in valid_key_variations(&format!("{name}-key")) {
        let one = join_key(&parent, "one");
        let two = join_key(&parent, "two");

        storage.put(&[Kv::new(one.as_str(), value.as_str())]).await.expect("put one");
        storage.put(&[Kv::new(two.as_str(), value.as_str())]).await.expect("put two");

        let expected = vec![Kv::new("one", value.as_str()), Kv::new("two", value.as_str())];

        let got = storage.list(&parent).await.expect("list parent");
        assert_eq!(sorted(got), expected, "{name}: key={parent:?}");
    }
}

/// Listing `/` returns every entry relative to the root, and listing a
/// parent returns all of its descendants, not just direct children.
pub async fn check_list_nested<S: Storage + ?Sized>(storage: &S) {
    let name = "check_list_nested";
    let value = format!("{name}-value");

    for parent in valid_key_variations(&format!("{name}-key")) {
        let kvs = [
            Kv::new(join_key(&parent, "nested/one"), value.as_str()),
            Kv::new(join_key(&parent, "nested/two"), value.as_str()),
            Kv::new(join_key(&parent, "extremely/nested/three"), value.as_str()),
        ];

        for kv in &kvs {
            storage.put(&[kv.clone()]).await.expect("put nested");
        }

        let all = storage.list(ROOT).await.expect("list root");

        for kv in &kvs {
            // Like `ls /` printing `file` for `/file`.
            let (key, val) = canonical(kv).into_parts();
            let relative = Kv::new(&key[1..], val);
            assert!(
                all.contains(&relative),
                "{name}: root listing is missing {relative}"
            );
        }

        let nested = storage.list(&join_key(&parent, "nested")).await.expect("list nested");
        assert_eq!(
            sorted(nested),
            vec![Kv::new("one", value.as_str()), Kv::new("two", value.as_str())],
            "{name}: key={parent:?}/nested"
        );

        let descendants = storage.list(&parent).await.expect("list parent");
        assert_eq!(
            sorted(descendants),
            vec![
                Kv::new("extremely/nested/three", value.as_str()),
                Kv::new("nested/one", value.as_str()),
                Kv::new("nested/two", value.as_str()),
            ],
            "{name}: key={parent:?}"
        );
    }
}

/// A path that only has entries below it is not an entry itself.
pub async fn check_parent_is_not_an_entry<S: Storage + ?Sized>(storage: &S) {
    let name = "check_parent_is_not_an_entry";
    let value = format!("{name}-value");

    for parent in valid_key_variations(&format!("{name}-key")) {
        storage
            .put(&[Kv::new(join_key(&parent, "dir/leaf"), value.as_str())])
            .await
            .expect("put leaf");

        for path in [parent.clone(), join_key(&parent, "dir")] {
            let exists = storage.exists(&path).await.expect("exists parent");
            assert!(!exists, "{name}: key={path:?} reported as existing");

            match storage.search(&path).await {
                Err(err) if err.is_not_found() => {}
                Err(err) => panic!("{name}: search key={path:?} got {err}"),
                Ok(kv) => panic!("{name}: search key={path:?} found {kv}"),
            }
        }
    }
}

/// Listing a string prefix that is not a path parent returns nothing.
pub async fn check_list_invalid<S: Storage + ?Sized>(storage: &S) {
    let name = "check_list_invalid";
    let value = format!("{name}-value");
    let base = format!("{name}-key");

    for parent in valid_key_variations(&base) {
        storage
            .put(&[
                Kv::new(join_key(&parent, "one"), value.as_str()),
                Kv::new(join_key(&parent, "two"), value.as_str()),
            ])
            .await
            .expect("put children");

        // Stored keys look like /check_list_invalid-key-0042/one, so the
        // base is a string prefix of them but not their parent.
        let listed = storage.list(&base).await.expect("list false prefix");
        assert!(listed.is_empty(), "{name}: key={base:?} listed {listed:?}");
    }
}

/// Listing a path with nothing below it is empty, not an error.
pub async fn check_list_empty_parent<S: Storage + ?Sized>(storage: &S) {
    let name = "check_list_empty_parent";
    let value = format!("{name}-value");

    for key in valid_key_variations(&format!("{name}-key")) {
        let listed = storage.list(&key).await.expect("list missing parent");
        assert!(listed.is_empty(), "{name}: key={key:?} listed {listed:?}");

        // A leaf has no children either.
        storage.put(&[Kv::new(key.as_str(), value.as_str())]).await.expect("put leaf");
        let listed = storage.list(&key).await.expect("list leaf");
        assert!(listed.is_empty(), "{name}: leaf key={key:?} listed {listed:?}");
    }
}
