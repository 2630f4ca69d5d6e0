//! Ring read-back

use crate::device::BlockDevice;
use crate::error::{Result, TsdbError};
use crate::layout::{Item, ITEM_SIZE};

use super::{retained_items, Cursor, Ring};

/// History of one series as parallel columns, oldest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values {
    pub timestamps: Vec<u32>,
    pub values: Vec<f32>,
}

impl Values {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Iterate (timestamp, value) pairs, oldest first
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }

    fn push(&mut self, item: Item) {
        self.timestamps.push(item.timestamp);
        self.values.push(item.value);
    }
}

impl<'a, D: BlockDevice + ?Sized> Ring<'a, D> {
    /// Read every retained item from `cursor.start` up to the first blank slot
    ///
    /// Returns at most `retained_items` items: the block about to be erased
    /// may still hold older items, those are skipped.
    pub fn read(&self, cursor: &Cursor) -> Result<Values> {
        let mut items = Vec::new();
        let mut buf = vec![0u8; self.block_size];
        let mut block = cursor.start_block(self.block_size);
        let mut offset = cursor.start % self.block_size;

        for _ in 0..self.nblocks {
            self.read_block(block, &mut buf)?;

            for slot in buf[offset..].chunks_exact(ITEM_SIZE) {
                match Item::decode(slot) {
                    Some(item) => items.push(item),
                    None => return Ok(self.window(items)),
                }
            }

            offset = 0;
            block = (block + 1) % self.nblocks;
        }

        Err(TsdbError::CorruptDatabase(format!(
            "no blank slot in ring at block {}",
            self.block_addr
        )))
    }

    fn window(&self, items: Vec<Item>) -> Values {
        let keep = retained_items(self.nblocks, self.block_size);
        let skip = items.len().saturating_sub(keep);

        let mut values = Values {
            timestamps: Vec::with_capacity(items.len() - skip),
            values: Vec::with_capacity(items.len() - skip),
        };
        for item in items.into_iter().skip(skip) {
            values.push(item);
        }
        values
    }
}
