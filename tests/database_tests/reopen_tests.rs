//! Tests for cursor recovery across reopen
//!
//! These tests verify:
//! - A reopened database reads exactly what the running one did
//! - Recovered cursors equal the cursors kept while appending
//! - Appends continue where they left off after a reopen
//! - An interrupted erase-ahead loses nothing that was readable

use flashts::{BlockDevice, Database, MemBlockDevice};
use std::sync::Arc;

use crate::{reopen, setup_shared_db, ITEMS_PER_BLOCK};

/// a: 2 blocks, b: 4 blocks, c: 2 blocks left empty
fn three_series() -> (Arc<MemBlockDevice>, Database<Arc<MemBlockDevice>>) {
    let (device, mut db) = setup_shared_db();
    db.create_record("a", 1).unwrap();
    db.create_record("b", 40).unwrap();
    db.create_record("c", 1).unwrap();
    (device, db)
}

#[test]
fn test_reopen_matches_running_state() {
    let counts = [0u32, 1, 15, 16, 17, 31, 32, 33, 47, 48, 63, 64, 65, 100];

    for n in counts {
        let (device, mut db) = three_series();
        for t in 0..n {
            db.append("a", t, t as f32).unwrap();
            db.append("b", t, -(t as f32)).unwrap();
        }

        let reopened = reopen(&device);

        for key in ["a", "b", "c"] {
            assert_eq!(
                reopened.values(key, false).unwrap(),
                db.values(key, false).unwrap(),
                "values of '{}' after {} appends",
                key,
                n
            );
        }
        assert_eq!(
            reopened.directory().entries(),
            db.directory().entries(),
            "cursors after {} appends",
            n
        );
    }
}

#[test]
fn test_appends_continue_after_reopen() {
    let (device, mut db) = three_series();
    for t in 0..40u32 {
        db.append("a", t, 0.0).unwrap();
    }
    drop(db);

    let mut db = reopen(&device);
    for t in 40..60u32 {
        db.append("a", t, 0.0).unwrap();
    }

    let ts = db.values("a", false).unwrap().timestamps;
    assert_eq!(ts, (60 - ITEMS_PER_BLOCK as u32..60).collect::<Vec<u32>>());
}

#[test]
fn test_repeated_power_cycles() {
    let (device, db) = three_series();
    drop(db);

    for t in 0..200u32 {
        let mut db = reopen(&device);
        db.append("b", t, t as f32).unwrap();
    }

    let db = reopen(&device);
    let ts = db.values("b", false).unwrap().timestamps;
    assert_eq!(*ts.last().unwrap(), 199);
    assert!(ts.len() >= db.record_capacity("b").unwrap());
    for pair in ts.windows(2) {
        assert_eq!(pair[0] + 1, pair[1]);
    }
}

#[test]
fn test_interrupted_erase_ahead() {
    let (device, mut db) = three_series();
    for t in 0..31u32 {
        db.append("a", t, t as f32).unwrap();
    }
    assert_eq!(
        db.values("a", false).unwrap().timestamps,
        (15..=30).collect::<Vec<u32>>()
    );
    let addr = db.directory().find_live("a").unwrap().series.block_addr;
    drop(db);

    // Power lost between erasing the oldest block and programming item 31
    device.erase_block(addr).unwrap();

    let mut db = reopen(&device);
    assert_eq!(
        db.values("a", false).unwrap().timestamps,
        (16..=30).collect::<Vec<u32>>()
    );

    db.append("a", 31, 31.0).unwrap();
    assert_eq!(
        db.values("a", false).unwrap().timestamps,
        (16..=31).collect::<Vec<u32>>()
    );

    let reopened = reopen(&device);
    assert_eq!(reopened.directory().entries(), db.directory().entries());
}

#[test]
fn test_deleted_series_recovered() {
    let (device, mut db) = three_series();
    for t in 0..20u32 {
        db.append("a", t, 0.0).unwrap();
    }
    let before = db.values("a", false).unwrap();
    db.delete_record("a").unwrap();
    drop(db);

    let db = reopen(&device);

    assert_eq!(db.values("a", true).unwrap(), before);
}
