//! Atomic rule locks and run leases.

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{Duration, Utc};

use brm_core::models::{AcquireOutcome, RuleId};
use brm_core::traits::{ILockStorage, ReleaseOutcome};
use brm_storage::StorageEngine;

fn ttl() -> Duration {
    Duration::minutes(30)
}

#[test]
fn acquire_then_conflict() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let now = Utc::now();

    let first = engine
        .try_acquire_lock(RuleId(1), "alice", now, ttl(), false)
        .unwrap();
    assert_eq!(first, AcquireOutcome::Acquired);

    let second = engine
        .try_acquire_lock(RuleId(1), "bob", now, ttl(), false)
        .unwrap();
    assert_eq!(second, AcquireOutcome::Held("alice".to_string()));

    let lock = engine.current_lock(RuleId(1)).unwrap().unwrap();
    assert_eq!(lock.locked_by, "alice");
}

#[test]
fn same_holder_reacquires_and_refreshes() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let earlier = Utc::now() - Duration::minutes(10);
    let now = Utc::now();

    engine
        .try_acquire_lock(RuleId(1), "alice", earlier, ttl(), false)
        .unwrap();
    let again = engine
        .try_acquire_lock(RuleId(1), "alice", now, ttl(), false)
        .unwrap();
    assert_eq!(again, AcquireOutcome::Acquired);

    let lock = engine.current_lock(RuleId(1)).unwrap().unwrap();
    assert_eq!(lock.locked_at.timestamp_millis(), now.timestamp_millis());
}

#[test]
fn expired_lock_is_purged() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let stale = Utc::now() - Duration::minutes(31);
    engine
        .try_acquire_lock(RuleId(1), "alice", stale, ttl(), false)
        .unwrap();

    let outcome = engine
        .try_acquire_lock(RuleId(1), "bob", Utc::now(), ttl(), false)
        .unwrap();
    assert_eq!(outcome, AcquireOutcome::Acquired);
    assert_eq!(engine.current_lock(RuleId(1)).unwrap().unwrap().locked_by, "bob");
}

#[test]
fn force_overrides_live_lock() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let now = Utc::now();
    engine
        .try_acquire_lock(RuleId(1), "alice", now, ttl(), false)
        .unwrap();
    let outcome = engine
        .try_acquire_lock(RuleId(1), "admin", now, ttl(), true)
        .unwrap();
    assert_eq!(outcome, AcquireOutcome::Acquired);
    assert_eq!(engine.current_lock(RuleId(1)).unwrap().unwrap().locked_by, "admin");
}

#[test]
fn release_outcomes() {
    let engine = StorageEngine::open_in_memory().unwrap();
    assert_eq!(
        engine.release_lock(RuleId(1), "alice", false).unwrap(),
        ReleaseOutcome::NotLocked
    );

    engine
        .try_acquire_lock(RuleId(1), "alice", Utc::now(), ttl(), false)
        .unwrap();
    assert_eq!(
        engine.release_lock(RuleId(1), "bob", false).unwrap(),
        ReleaseOutcome::HeldBy("alice".to_string())
    );
    assert_eq!(
        engine.release_lock(RuleId(1), "bob", true).unwrap(),
        ReleaseOutcome::Released
    );
    assert!(engine.current_lock(RuleId(1)).unwrap().is_none());
}

#[test]
fn locks_are_per_rule() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let now = Utc::now();
    engine
        .try_acquire_lock(RuleId(1), "alice", now, ttl(), false)
        .unwrap();
    let other = engine
        .try_acquire_lock(RuleId(2), "bob", now, ttl(), false)
        .unwrap();
    assert_eq!(other, AcquireOutcome::Acquired);
}

#[test]
fn concurrent_acquire_has_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(StorageEngine::open(&dir.path().join("locks.db")).unwrap());
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                engine
                    .try_acquire_lock(RuleId(1), &format!("user-{i}"), Utc::now(), ttl(), false)
                    .unwrap()
            })
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|o| *o == AcquireOutcome::Acquired)
        .count();
    assert_eq!(winners, 1);
}

#[test]
fn lease_blocks_second_holder_until_released() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let now = Utc::now();
    let lease_ttl = Duration::hours(1);

    assert_eq!(
        engine.try_acquire_lease("bfs-run", "run-a", now, lease_ttl).unwrap(),
        AcquireOutcome::Acquired
    );
    assert_eq!(
        engine.try_acquire_lease("bfs-run", "run-b", now, lease_ttl).unwrap(),
        AcquireOutcome::Held("run-a".to_string())
    );

    assert!(!engine.release_lease("bfs-run", "run-b").unwrap());
    assert!(engine.release_lease("bfs-run", "run-a").unwrap());
    assert!(engine.current_lease("bfs-run").unwrap().is_none());
    assert_eq!(
        engine.try_acquire_lease("bfs-run", "run-b", now, lease_ttl).unwrap(),
        AcquireOutcome::Acquired
    );
}

#[test]
fn expired_lease_is_reclaimed() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let lease_ttl = Duration::hours(1);
    engine
        .try_acquire_lease("bfs-run", "crashed", Utc::now() - Duration::hours(2), lease_ttl)
        .unwrap();
    assert_eq!(
        engine
            .try_acquire_lease("bfs-run", "fresh", Utc::now(), lease_ttl)
            .unwrap(),
        AcquireOutcome::Acquired
    );
    assert_eq!(engine.current_lease("bfs-run").unwrap().unwrap().holder, "fresh");
}
