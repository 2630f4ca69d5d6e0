//! Data items
//!
//! Every item is `timestamp:u32 | value:f32`, little-endian. An all-ones slot
//! has never been written since the last erase.

/// Size of one item in bytes
pub const ITEM_SIZE: usize = 8;

/// Contents of an erased item slot
pub const BLANK_ITEM: [u8; ITEM_SIZE] = [0xFF; ITEM_SIZE];

/// One (timestamp, value) sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item {
    pub timestamp: u32,
    pub value: f32,
}

impl Item {
    pub fn new(timestamp: u32, value: f32) -> Self {
        Self { timestamp, value }
    }

    pub fn encode(&self) -> [u8; ITEM_SIZE] {
        let mut buf = [0u8; ITEM_SIZE];
        buf[0..4].copy_from_slice(&self.timestamp.to_le_bytes());
        buf[4..8].copy_from_slice(&self.value.to_le_bytes());
        buf
    }

    /// Decode one slot; `None` for a blank slot
    pub fn decode(slot: &[u8]) -> Option<Self> {
        if is_blank(slot) {
            return None;
        }
        Some(Self {
            timestamp: u32::from_le_bytes([slot[0], slot[1], slot[2], slot[3]]),
            value: f32::from_le_bytes([slot[4], slot[5], slot[6], slot[7]]),
        })
    }

    /// True if this item would be indistinguishable from an erased slot
    pub fn is_reserved(&self) -> bool {
        self.encode() == BLANK_ITEM
    }
}

/// True if the first item-sized slot of `slot` is erased
pub fn is_blank(slot: &[u8]) -> bool {
    slot.len() >= ITEM_SIZE && slot[..ITEM_SIZE] == BLANK_ITEM
}
