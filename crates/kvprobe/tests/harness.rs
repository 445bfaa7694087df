// Integration tests for provisioning, assertions and the concurrency helper

mod common;

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use common::{Call, FailingCloseOpener, FailingOpener, ProbeFixture, RecordingOpener};
use kvprobe::assertions::{
    assert_key_exists, assert_key_not_exists, assert_key_value, assert_not_found, require_ok,
};
use kvprobe::{
    concurrently, init_test_logging, run_concurrent, Engine, Error, Generator, Reporter, Task,
    TestContext, UnavailableEntropy,
};

#[test]
fn test_end_to_end_put_get_delete() {
    init_test_logging();
    let fixture = ProbeFixture::new();
    let t = TestContext::new("end_to_end");
    let db = fixture.memory_provisioner().provision_for_test(&t);

    require_ok(&t, db.put(b"k1", b"v1"), "put k1");
    assert_key_exists(&t, db.engine(), b"k1");
    assert_key_value(&t, db.engine(), b"k1", b"v1");

    require_ok(&t, db.delete(b"k1"), "delete k1");
    assert_key_not_exists(&t, db.engine(), b"k1");
    assert_not_found(&t, &db.get(b"k1"), "get after delete");

    assert_eq!(t.failure_count(), 0);
}

#[test]
fn test_wrong_value_is_recorded_not_fatal() {
    let fixture = ProbeFixture::new();
    let t = TestContext::new("mismatch");
    let db = fixture.memory_provisioner().provision_for_test(&t);

    db.put(b"k1", b"v1").unwrap();
    assert_key_value(&t, db.engine(), b"k1", b"v2");
    assert_key_not_exists(&t, db.engine(), b"k1");

    // Both checks ran and recorded
    let failures = t.take_failures();
    assert_eq!(failures.len(), 2);
    assert!(failures[0].contains("v2"));
}

#[test]
fn test_concurrent_provisions_are_distinct() {
    let fixture = ProbeFixture::new();
    let provisioner = fixture.memory_provisioner();
    let t = TestContext::new("distinct");
    let seen = Mutex::new(HashSet::new());

    let tasks: Vec<Task<'_>> = (0..100)
        .map(|_| {
            let (provisioner, t, seen) = (&provisioner, &t, &seen);
            Box::new(move || {
                let db = provisioner.provision_for_test(t);
                assert!(db.location().is_dir());
                seen.lock().unwrap().insert(db.location().to_path_buf());
            }) as Task<'_>
        })
        .collect();
    run_concurrent(tasks);

    assert_eq!(seen.lock().unwrap().len(), 100);
    assert!(fixture.list_locations().is_empty());
    assert_eq!(t.failure_count(), 0);
}

#[test]
fn test_teardown_closes_handle_and_removes_location() {
    let fixture = ProbeFixture::new();
    let t = TestContext::new("teardown");
    let db = fixture.memory_provisioner().provision_for_test(&t);

    db.put(b"k", b"v").unwrap();
    let handle = db.handle();
    let location = db.location().to_path_buf();
    assert!(location.is_dir());

    db.teardown();

    assert!(!location.exists());
    assert!(matches!(handle.get(b"k"), Err(Error::Closed)));
    assert!(handle.close().unwrap_err().is_closed());
    assert_eq!(t.failure_count(), 0);
}

#[test]
fn test_already_closed_handle_is_not_a_failure() {
    let fixture = ProbeFixture::new();
    let opener = RecordingOpener::new();
    let t = TestContext::new("double_close");
    let db = fixture.provisioner(opener.clone()).provision_for_test(&t);

    db.close().unwrap();
    db.teardown();

    let closes = opener.calls().iter().filter(|c| **c == Call::Close).count();
    assert_eq!(closes, 2);
    assert_eq!(t.failure_count(), 0);
    assert!(fixture.list_locations().is_empty());
}

#[test]
fn test_close_failure_mentioning_closed_is_reported() {
    let fixture = ProbeFixture::new();
    let t = TestContext::new("close_failure");
    let db = fixture.provisioner(FailingCloseOpener).provision_for_test(&t);
    let location = db.location().to_path_buf();

    db.teardown();

    let failures = t.take_failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("disk full"));
    assert!(!location.exists());
}

#[test]
fn test_removal_failure_is_ignored() {
    let fixture = ProbeFixture::new();
    let t = TestContext::new("already_removed");
    let db = fixture.memory_provisioner().provision_for_test(&t);

    db.close().unwrap();
    std::fs::remove_dir_all(db.location()).unwrap();
    drop(db);

    assert_eq!(t.failure_count(), 0);
}

#[test]
fn test_instance_removed_when_test_aborts() {
    let fixture = ProbeFixture::new();
    let provisioner = fixture.memory_provisioner();
    let t = TestContext::new("aborts");

    let result = catch_unwind(AssertUnwindSafe(|| {
        let db = provisioner.provision_for_test(&t);
        db.put(b"k", b"v").unwrap();
        t.fatal("precondition failed");
    }));

    assert!(result.is_err());
    assert!(fixture.list_locations().is_empty());
    assert_eq!(t.take_failures(), vec!["precondition failed"]);
}

#[test]
#[should_panic(expected = "failed to provision")]
fn test_provision_fails_when_engine_cannot_open() {
    let fixture = ProbeFixture::new();
    let t = TestContext::new("cannot_open");
    let _db = fixture.provisioner(FailingOpener).provision_for_test(&t);
}

#[test]
#[should_panic(expected = "entropy")]
fn test_provision_fails_without_entropy() {
    let fixture = ProbeFixture::new();
    let t = TestContext::new("no_entropy");
    let provisioner = fixture
        .memory_provisioner()
        .with_entropy(Arc::new(UnavailableEntropy));
    let _db = provisioner.provision_for_test(&t);
}

#[test]
fn test_concurrently_runs_each_closure_once() {
    let (a, b, c) = (AtomicUsize::new(0), AtomicUsize::new(0), AtomicUsize::new(0));

    concurrently!(
        || {
            a.fetch_add(1, Ordering::SeqCst);
        },
        || {
            b.fetch_add(1, Ordering::SeqCst);
        },
        || {
            c.fetch_add(1, Ordering::SeqCst);
        },
    );

    assert_eq!(a.load(Ordering::SeqCst), 1);
    assert_eq!(b.load(Ordering::SeqCst), 1);
    assert_eq!(c.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concurrent_writers_share_one_instance() {
    let fixture = ProbeFixture::new();
    let t = TestContext::new("shared");
    let db = fixture.memory_provisioner().provision_for_test(&t);

    let tasks: Vec<Task<'_>> = (0..8)
        .map(|w| {
            let (db, t) = (&db, &t);
            Box::new(move || {
                for i in 0..50 {
                    let key = format!("w{}-{}", w, i);
                    require_ok(t, db.put(key.as_bytes(), b"v"), "concurrent put");
                }
            }) as Task<'_>
        })
        .collect();
    run_concurrent(tasks);

    for w in 0..8 {
        assert_key_exists(&t, db.engine(), format!("w{}-49", w).as_bytes());
    }
    assert_eq!(db.len().unwrap(), 400);
}

#[test]
fn test_generated_pairs() {
    let pairs = Generator::secure().generate_key_value_pairs(5);

    assert_eq!(pairs.len(), 5);
    for (key, value) in &pairs {
        assert_eq!(key.len(), 16);
        assert_eq!(value.len(), 64);
    }
}
