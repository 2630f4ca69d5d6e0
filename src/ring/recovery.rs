//! Cursor recovery
//!
//! Rebuilds a ring's `start`/`next` from flash contents alone. Each block is
//! classified by its first and last item slot, then two scans run over the
//! classifications:
//!
//! 1. [`find_write_block`]: where does the write cursor sit? Either right
//!    after a full block that is followed by an empty one, or inside a
//!    partially written block.
//! 2. [`find_start_block`]: walking forward from the write block, the first
//!    block with a written head holds the oldest data.
//!
//! Both scans are pure functions over `&[BlockFill]` so they can be exercised
//! with synthetic rings.

use crate::device::BlockDevice;
use crate::error::{Result, TsdbError};
use crate::layout::{is_blank, ITEM_SIZE};

use super::{Cursor, Ring};

/// Fill state of one block, judged by its first and last item slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockFill {
    pub head_blank: bool,
    pub tail_blank: bool,
}

impl BlockFill {
    pub const EMPTY: BlockFill = BlockFill {
        head_blank: true,
        tail_blank: true,
    };
    pub const FULL: BlockFill = BlockFill {
        head_blank: false,
        tail_blank: false,
    };
    pub const PARTIAL: BlockFill = BlockFill {
        head_blank: false,
        tail_blank: true,
    };

    /// Classify a whole block
    pub fn of(block: &[u8]) -> Self {
        Self {
            head_blank: is_blank(block),
            tail_blank: is_blank(&block[block.len().saturating_sub(ITEM_SIZE)..]),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }

    pub fn is_partial(&self) -> bool {
        *self == Self::PARTIAL
    }
}

/// Where the write cursor was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteBlock {
    /// `next` is the first slot of this (empty) block
    Boundary(usize),
    /// `next` is the first blank slot inside this partially written block
    Partial(usize),
}

impl WriteBlock {
    pub fn block(&self) -> usize {
        match *self {
            WriteBlock::Boundary(b) | WriteBlock::Partial(b) => b,
        }
    }
}

/// Phase 1: locate the block holding the write cursor
///
/// Blocks are visited in physical order; the first match wins. `None` means no
/// boundary exists, which for a consistent ring means it is empty.
pub fn find_write_block(fills: &[BlockFill]) -> Option<WriteBlock> {
    let n = fills.len();

    for (block, fill) in fills.iter().enumerate() {
        if fill.is_full() {
            let following = (block + 1) % n;
            if fills[following].is_empty() {
                return Some(WriteBlock::Boundary(following));
            }
        }
        if fill.is_partial() {
            return Some(WriteBlock::Partial(block));
        }
    }
    None
}

/// Phase 2: first block after `write_block` (cyclically) with a written head
///
/// The write block itself is checked last.
pub fn find_start_block(fills: &[BlockFill], write_block: usize) -> Option<usize> {
    let n = fills.len();
    (1..=n)
        .map(|step| (write_block + step) % n)
        .find(|&block| !fills[block].head_blank)
}

impl<'a, D: BlockDevice + ?Sized> Ring<'a, D> {
    /// Classify every block of the ring
    pub fn block_fills(&self) -> Result<Vec<BlockFill>> {
        let mut buf = vec![0u8; self.block_size];
        (0..self.nblocks)
            .map(|block| {
                self.read_block(block, &mut buf)?;
                Ok(BlockFill::of(&buf))
            })
            .collect()
    }

    /// Rebuild the cursor of this ring from flash contents
    pub fn recover(&self) -> Result<Cursor> {
        let fills = self.block_fills()?;

        let write_block = match find_write_block(&fills) {
            Some(wb) => wb,
            None if fills.iter().all(BlockFill::is_empty) => return Ok(Cursor::default()),
            None => {
                return Err(TsdbError::CorruptDatabase(format!(
                    "ring at block {} has data but no write boundary",
                    self.block_addr
                )))
            }
        };

        let next = match write_block {
            WriteBlock::Boundary(block) => block * self.block_size,
            WriteBlock::Partial(block) => {
                block * self.block_size + self.first_blank_slot(block)?
            }
        };

        let start_block = find_start_block(&fills, write_block.block()).ok_or_else(|| {
            TsdbError::CorruptDatabase(format!(
                "ring at block {} has no written block",
                self.block_addr
            ))
        })?;

        Ok(Cursor::new(start_block * self.block_size, next))
    }

    /// Byte offset of the first blank item slot in ring block `block`
    fn first_blank_slot(&self, block: usize) -> Result<usize> {
        let mut buf = vec![0u8; self.block_size];
        self.read_block(block, &mut buf)?;

        buf.chunks_exact(ITEM_SIZE)
            .position(is_blank)
            .map(|slot| slot * ITEM_SIZE)
            .ok_or_else(|| {
                TsdbError::CorruptDatabase(format!(
                    "partially written block {} has no blank slot",
                    self.block_addr + block
                ))
            })
    }
}
