//! Block allocator
//!
//! Series extents are laid out back to back after the directory, in creation
//! order. The free region is everything after the last extent; nothing is
//! ever handed out twice, tombstoned extents included.

use crate::error::{Result, TsdbError};
use crate::ring::items_per_block;

/// A freshly claimed block extent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub block_addr: usize,
    pub nblocks: usize,
}

/// Smallest block count (at least 2) whose guaranteed capacity covers `capacity` items
///
/// One block is always kept erased ahead of the write cursor, and one slot
/// separates full from empty, hence `(nblocks - 1) * per_block - 1 >= capacity`.
pub fn blocks_for_capacity(capacity: usize, block_size: usize) -> usize {
    let per_block = items_per_block(block_size);
    let data_blocks = capacity.saturating_add(1).div_ceil(per_block);
    data_blocks.saturating_add(1).max(2)
}

/// Guaranteed item capacity of a ring of `nblocks`
pub fn guaranteed_capacity(nblocks: usize, block_size: usize) -> usize {
    (nblocks.saturating_sub(1) * items_per_block(block_size)).saturating_sub(1)
}

/// Tracks the end of the allocated region
#[derive(Debug, Clone, Copy)]
pub struct Allocator {
    /// One past the last allocated block (first free block)
    next_free: usize,
    /// Total blocks on the device
    num_blocks: usize,
}

impl Allocator {
    /// `next_free` is the end of the last extent, or the first block after the directory
    pub fn new(next_free: usize, num_blocks: usize) -> Self {
        Self {
            next_free,
            num_blocks,
        }
    }

    /// Number of unallocated blocks
    pub fn free_blocks(&self) -> usize {
        self.num_blocks.saturating_sub(self.next_free)
    }

    /// Plan an extent for `capacity` items without claiming it
    pub fn plan(&self, capacity: usize, block_size: usize) -> Result<Allocation> {
        let nblocks = blocks_for_capacity(capacity, block_size);
        let free = self.free_blocks();

        if free < nblocks {
            return Err(TsdbError::InsufficientSpace {
                needed: nblocks,
                free,
            });
        }

        Ok(Allocation {
            block_addr: self.next_free,
            nblocks,
        })
    }

    /// Mark a planned extent as taken
    pub fn claim(&mut self, allocation: Allocation) {
        self.next_free = allocation.block_addr + allocation.nblocks;
    }
}
