//! File-backed flash image
//!
//! Stores a raw flash image in a regular file, one block after another.
//! Useful for host-side tooling and for inspecting images pulled off a device.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{Result, TsdbError};

use super::{check_index, check_write, BlockDevice, ERASED_BYTE};

/// Flash image stored in a file
pub struct FileBlockDevice {
    path: PathBuf,
    block_size: usize,
    num_blocks: usize,
    /// File handle; seek + read/write must happen atomically
    file: Mutex<File>,
}

impl FileBlockDevice {
    /// Create (or truncate) an image file of `num_blocks` erased blocks
    pub fn create(path: &Path, block_size: usize, num_blocks: usize) -> Result<Self> {
        if block_size == 0 || num_blocks == 0 {
            return Err(TsdbError::InvalidGeometry(format!(
                "image needs a non-zero geometry, got {} blocks of {} bytes",
                num_blocks, block_size
            )));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let erased = vec![ERASED_BYTE; block_size];
        for _ in 0..num_blocks {
            file.write_all(&erased)?;
        }
        file.sync_all()?;

        Ok(Self {
            path: path.to_path_buf(),
            block_size,
            num_blocks,
            file: Mutex::new(file),
        })
    }

    /// Open an existing image; the block count is derived from the file length
    pub fn open(path: &Path, block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(TsdbError::InvalidGeometry(
                "block size must be non-zero".to_string(),
            ));
        }

        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let len = file.metadata()?.len() as usize;
        if len % block_size != 0 {
            return Err(TsdbError::InvalidGeometry(format!(
                "image size ({}) is not a multiple of block size ({})",
                len, block_size
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            block_size,
            num_blocks: len / block_size,
            file: Mutex::new(file),
        })
    }

    /// Path of the image file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn byte_offset(&self, index: usize, offset: usize) -> u64 {
        (index * self.block_size + offset) as u64
    }
}

impl BlockDevice for FileBlockDevice {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn block_count(&self) -> usize {
        self.num_blocks
    }

    fn read_block(&self, index: usize, buf: &mut [u8]) -> Result<()> {
        check_index(index, self.num_blocks)?;
        check_write(0, buf.len(), self.block_size)?;

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(self.byte_offset(index, 0)))?;
        file.read_exact(buf)?;
        Ok(())
    }

    fn write_block(&self, index: usize, data: &[u8], offset: usize) -> Result<()> {
        check_index(index, self.num_blocks)?;
        check_write(offset, data.len(), self.block_size)?;

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(self.byte_offset(index, offset)))?;
        file.write_all(data)?;
        Ok(())
    }

    fn erase_block(&self, index: usize) -> Result<()> {
        check_index(index, self.num_blocks)?;

        let erased = vec![ERASED_BYTE; self.block_size];
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(self.byte_offset(index, 0)))?;
        file.write_all(&erased)?;
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        self.file.lock().sync_all()?;
        Ok(())
    }
}
