//! Tests for open / open_or_make
//!
//! These tests verify:
//! - Devices without a valid header are rejected
//! - Header fields are checked against the device
//! - Damaged directories are reported, not guessed around
//! - open_or_make formats only when there is nothing to keep

use std::sync::Arc;

use flashts::layout::{DirRecord, SeriesRecord};
use flashts::{BlockDevice, Config, Database, MemBlockDevice, TsdbError};

use crate::{config, setup_shared_db, BLOCK_SIZE, NUM_BLOCKS};

fn open_err(device: MemBlockDevice) -> TsdbError {
    match Database::open(device) {
        Ok(_) => panic!("open should fail"),
        Err(e) => e,
    }
}

// =============================================================================
// Header Tests
// =============================================================================

#[test]
fn test_open_blank_device() {
    let device = MemBlockDevice::new(BLOCK_SIZE, NUM_BLOCKS);

    assert!(matches!(
        open_err(device),
        TsdbError::CorruptDatabase(reason) if reason.contains("no valid database")
    ));
}

#[test]
fn test_open_device_without_blocks() {
    let device = MemBlockDevice::new(BLOCK_SIZE, 0);

    assert!(matches!(open_err(device), TsdbError::InvalidGeometry(_)));
}

#[test]
fn test_open_with_wrong_block_size() {
    let device = MemBlockDevice::new(BLOCK_SIZE, NUM_BLOCKS);
    Database::make(&device, &config()).unwrap();

    let image = device.snapshot();
    let device = MemBlockDevice::from_image(image, BLOCK_SIZE * 2);

    assert!(matches!(open_err(device), TsdbError::CorruptDatabase(_)));
}

#[test]
fn test_open_with_wrong_magic() {
    let device = MemBlockDevice::new(BLOCK_SIZE, NUM_BLOCKS);
    device
        .write_block(
            0,
            br#"{"version":"1.0","magic":1,"block_size":128,"num_dir_blocks":4}"#,
            0,
        )
        .unwrap();

    assert!(matches!(
        open_err(device),
        TsdbError::CorruptDatabase(reason) if reason.contains("magic")
    ));
}

#[test]
fn test_open_with_unsupported_version() {
    let device = MemBlockDevice::new(BLOCK_SIZE, NUM_BLOCKS);
    device
        .write_block(
            0,
            br#"{"version":"2.0","magic":134065084,"block_size":128,"num_dir_blocks":4}"#,
            0,
        )
        .unwrap();

    assert!(matches!(
        open_err(device),
        TsdbError::CorruptDatabase(reason) if reason.contains("version")
    ));
}

#[test]
fn test_open_with_garbage_header() {
    let device = MemBlockDevice::new(BLOCK_SIZE, NUM_BLOCKS);
    device.write_block(0, b"not a header", 0).unwrap();

    assert!(matches!(open_err(device), TsdbError::CorruptDatabase(_)));
}

#[test]
fn test_open_header_written_by_hand() {
    // Minimal header as another implementation would write it
    let device = MemBlockDevice::new(BLOCK_SIZE, NUM_BLOCKS);
    device
        .write_block(
            0,
            br#"{"version":"1.0","magic":134065084,"block_size":128,"num_dir_blocks":4,"board":"leaf01"}"#,
            0,
        )
        .unwrap();

    let db = Database::open(device).unwrap();

    assert_eq!(db.header().description, "Time Series DataBase");
    assert_eq!(db.capacity(), 8);
    assert_eq!(db.free_blocks(), NUM_BLOCKS - 5);
    assert_eq!(
        db.metadata().get("board"),
        Some(&serde_json::Value::from("leaf01"))
    );
}

// =============================================================================
// Directory Tests
// =============================================================================

#[test]
fn test_open_with_unknown_record_type() {
    let device = MemBlockDevice::new(BLOCK_SIZE, NUM_BLOCKS);
    Database::make(&device, &config()).unwrap();

    let mut record = [0u8; 64];
    record[..4].copy_from_slice(&0x1234_5678u32.to_le_bytes());
    device.write_block(1, &record, 0).unwrap();

    assert!(matches!(open_err(device), TsdbError::CorruptDatabase(_)));
}

#[test]
fn test_open_with_overlapping_extent() {
    let device = MemBlockDevice::new(BLOCK_SIZE, NUM_BLOCKS);
    Database::make(&device, &config()).unwrap();

    let record = DirRecord::CircularBuffer(SeriesRecord {
        key: "bad".to_string(),
        block_addr: 1,
        nblocks: 2,
    });
    device.write_block(1, &record.encode(), 0).unwrap();

    assert!(matches!(
        open_err(device),
        TsdbError::CorruptDatabase(reason) if reason.contains("bad")
    ));
}

#[test]
fn test_open_with_extent_past_device_end() {
    let device = MemBlockDevice::new(BLOCK_SIZE, NUM_BLOCKS);
    Database::make(&device, &config()).unwrap();

    let record = DirRecord::CircularBuffer(SeriesRecord {
        key: "huge".to_string(),
        block_addr: 5,
        nblocks: NUM_BLOCKS,
    });
    device.write_block(1, &record.encode(), 0).unwrap();

    assert!(matches!(open_err(device), TsdbError::CorruptDatabase(_)));
}

// =============================================================================
// open_or_make Tests
// =============================================================================

#[test]
fn test_open_or_make_formats_blank_device() {
    let device = MemBlockDevice::new(BLOCK_SIZE, NUM_BLOCKS);
    let config = Config::builder()
        .directory_capacity(8)
        .metadata("site", "north")
        .build();

    let db = Database::open_or_make(device, &config).unwrap();

    assert!(db.is_empty());
    assert_eq!(db.capacity(), 8);
    assert_eq!(
        db.metadata().get("site"),
        Some(&serde_json::Value::from("north"))
    );
}

#[test]
fn test_open_or_make_keeps_existing_database() {
    let (device, mut db) = setup_shared_db();
    db.create_record("a", 1).unwrap();
    db.append("a", 10, 1.0).unwrap();
    drop(db);

    let other = Config::builder().directory_capacity(2).build();
    let db = Database::open_or_make(Arc::clone(&device), &other).unwrap();

    assert_eq!(db.keys(), vec!["a"]);
    assert_eq!(db.capacity(), 8);
    assert_eq!(db.values("a", false).unwrap().timestamps, vec![10]);
}

#[test]
fn test_open_or_make_propagates_geometry_errors() {
    let device = MemBlockDevice::new(BLOCK_SIZE, 0);

    assert!(matches!(
        Database::open_or_make(device, &config()),
        Err(TsdbError::InvalidGeometry(_))
    ));
}
