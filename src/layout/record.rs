//! Directory records
//!
//! Fixed 64-byte entries: `type:u32 | block_addr:u32 | nblocks:u32 | key:[u8; 52]`,
//! all little-endian, key NUL-padded.

use crate::error::{Result, TsdbError};

/// Size of one directory record in bytes
pub const DIR_RECORD_SIZE: usize = 64;

/// Width of the key field (record size minus the three u32 fields)
pub const KEY_SIZE: usize = DIR_RECORD_SIZE - 12;

/// Slot never written (erased flash)
pub const DIR_TYPE_BLANK: u32 = 0xFFFF_FFFF;

/// Slot describes a live circular buffer
pub const DIR_TYPE_CBUF: u32 = 0x01A2_B3C4;

/// Slot describes a tombstoned circular buffer
pub const DIR_TYPE_DELETED: u32 = 0x0000_0000;

/// Location and name of one series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRecord {
    pub key: String,
    /// Absolute index of the first data block
    pub block_addr: usize,
    /// Number of data blocks
    pub nblocks: usize,
}

/// A decoded directory slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirRecord {
    Blank,
    CircularBuffer(SeriesRecord),
    Deleted(SeriesRecord),
}

impl DirRecord {
    /// Type tag as stored on flash
    pub fn tag(&self) -> u32 {
        match self {
            DirRecord::Blank => DIR_TYPE_BLANK,
            DirRecord::CircularBuffer(_) => DIR_TYPE_CBUF,
            DirRecord::Deleted(_) => DIR_TYPE_DELETED,
        }
    }

    /// The series described by this slot, if any
    pub fn series(&self) -> Option<&SeriesRecord> {
        match self {
            DirRecord::Blank => None,
            DirRecord::CircularBuffer(rec) | DirRecord::Deleted(rec) => Some(rec),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, DirRecord::CircularBuffer(_))
    }

    /// Encode into a full 64-byte record
    pub fn encode(&self) -> [u8; DIR_RECORD_SIZE] {
        let mut buf = [0xFFu8; DIR_RECORD_SIZE];
        buf[0..4].copy_from_slice(&self.tag().to_le_bytes());

        if let Some(rec) = self.series() {
            buf[4..8].copy_from_slice(&(rec.block_addr as u32).to_le_bytes());
            buf[8..12].copy_from_slice(&(rec.nblocks as u32).to_le_bytes());

            let key = rec.key.as_bytes();
            let field = &mut buf[12..];
            field.fill(0);
            field[..key.len()].copy_from_slice(key);
        }
        buf
    }

    /// Decode a 64-byte record
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < DIR_RECORD_SIZE {
            return Err(TsdbError::CorruptDatabase(format!(
                "directory record truncated to {} bytes",
                bytes.len()
            )));
        }

        let tag = read_u32(bytes, 0);
        if tag == DIR_TYPE_BLANK {
            return Ok(DirRecord::Blank);
        }

        let key_field = &bytes[12..DIR_RECORD_SIZE];
        let key_len = key_field.iter().position(|&b| b == 0).unwrap_or(KEY_SIZE);
        let key = std::str::from_utf8(&key_field[..key_len])
            .map_err(|_| TsdbError::CorruptDatabase("directory key is not UTF-8".to_string()))?
            .to_string();

        let rec = SeriesRecord {
            key,
            block_addr: read_u32(bytes, 4) as usize,
            nblocks: read_u32(bytes, 8) as usize,
        };

        match tag {
            DIR_TYPE_CBUF => Ok(DirRecord::CircularBuffer(rec)),
            DIR_TYPE_DELETED => Ok(DirRecord::Deleted(rec)),
            other => Err(TsdbError::CorruptDatabase(format!(
                "unknown directory record type {:08x}",
                other
            ))),
        }
    }
}

/// Reject keys that cannot round-trip through the fixed-width key field
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(TsdbError::InvalidKey("key must not be empty".to_string()));
    }
    if key.as_bytes().contains(&0) {
        return Err(TsdbError::InvalidKey("key must not contain NUL".to_string()));
    }
    if key.len() > KEY_SIZE {
        return Err(TsdbError::KeyTooLong {
            len: key.len(),
            max: KEY_SIZE,
        });
    }
    Ok(())
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
