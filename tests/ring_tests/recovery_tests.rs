//! Tests for cursor recovery
//!
//! These tests verify:
//! - Block classification from head/tail slots
//! - Phase 1 (write block) on synthetic rings
//! - Phase 2 (start block) on synthetic rings
//! - Inconsistent rings are reported

use flashts::layout::{Item, ITEM_SIZE};
use flashts::ring::recovery::{find_start_block, find_write_block, BlockFill, WriteBlock};

const E: BlockFill = BlockFill::EMPTY;
const F: BlockFill = BlockFill::FULL;
const P: BlockFill = BlockFill::PARTIAL;

// =============================================================================
// Classification Tests
// =============================================================================

#[test]
fn test_classify_blocks() {
    let mut block = vec![0xFFu8; 64];
    assert_eq!(BlockFill::of(&block), E);

    block[..ITEM_SIZE].copy_from_slice(&Item::new(1, 1.0).encode());
    assert_eq!(BlockFill::of(&block), P);

    block[64 - ITEM_SIZE..].copy_from_slice(&Item::new(8, 8.0).encode());
    assert_eq!(BlockFill::of(&block), F);
}

#[test]
fn test_classify_tail_only() {
    let mut block = vec![0xFFu8; 64];
    block[56..].copy_from_slice(&Item::new(1, 1.0).encode());

    let fill = BlockFill::of(&block);

    assert!(fill.head_blank);
    assert!(!fill.tail_blank);
    assert!(!fill.is_empty() && !fill.is_full() && !fill.is_partial());
}

// =============================================================================
// Phase 1: Write Block
// =============================================================================

#[test]
fn test_empty_ring_has_no_write_block() {
    assert_eq!(find_write_block(&[E, E, E]), None);
}

#[test]
fn test_first_block_partial() {
    assert_eq!(find_write_block(&[P, E, E]), Some(WriteBlock::Partial(0)));
}

#[test]
fn test_boundary_after_full_block() {
    assert_eq!(find_write_block(&[F, E, E]), Some(WriteBlock::Boundary(1)));
}

#[test]
fn test_boundary_wraps_to_first_block() {
    assert_eq!(find_write_block(&[E, F, F, F]), Some(WriteBlock::Boundary(0)));
}

#[test]
fn test_boundary_in_the_middle() {
    assert_eq!(find_write_block(&[F, F, E, F]), Some(WriteBlock::Boundary(2)));
}

#[test]
fn test_partial_between_full_blocks() {
    assert_eq!(find_write_block(&[F, P, F]), Some(WriteBlock::Partial(1)));
}

#[test]
fn test_all_full_ring_has_no_boundary() {
    assert_eq!(find_write_block(&[F, F]), None);
}

// =============================================================================
// Phase 2: Start Block
// =============================================================================

#[test]
fn test_start_before_wrap() {
    // Data only in block 0..=1, cursor in block 1
    assert_eq!(find_start_block(&[F, P, E, E], 1), Some(0));
}

#[test]
fn test_start_after_wrap() {
    assert_eq!(find_start_block(&[F, P, F], 1), Some(2));
    assert_eq!(find_start_block(&[E, F, F, F], 0), Some(1));
    assert_eq!(find_start_block(&[F, F, E, F], 2), Some(3));
}

#[test]
fn test_start_is_write_block_when_alone() {
    assert_eq!(find_start_block(&[P, E, E], 0), Some(0));
}

#[test]
fn test_start_on_empty_ring() {
    assert_eq!(find_start_block(&[E, E], 0), None);
}

#[test]
fn test_write_block_accessor() {
    assert_eq!(WriteBlock::Boundary(3).block(), 3);
    assert_eq!(WriteBlock::Partial(1).block(), 1);
}
