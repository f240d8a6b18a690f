//! In-memory block device implementation

use crate::filesys::{BlockDevice, FsError};
use alloc::vec;
use alloc::vec::Vec;
use core::result::Result;

/// Block device that stores data in memory
pub struct MemoryBlockDevice {
    /// Sectors of data, each block_size bytes
    blocks: Vec<Vec<u8>>,

    /// Size of each sector in bytes
    block_size: usize,

    /// Transfer counters, used by tests to observe I/O patterns
    reads: u64,
    writes: u64,
}

impl MemoryBlockDevice {
    /// Creates a new zero-filled memory block device with given size
    pub fn new(total_blocks: u64, block_size: usize) -> Self {
        let blocks = (0..total_blocks).map(|_| vec![0; block_size]).collect();
        Self {
            blocks,
            block_size,
            reads: 0,
            writes: 0,
        }
    }

    /// Number of sector reads served so far
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Number of sector writes accepted so far
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Validates block number is within bounds
    fn validate_block(&self, block_num: u64) -> Result<(), FsError> {
        if block_num >= self.blocks.len() as u64 {
            return Err(FsError::IOError);
        }
        Ok(())
    }

    /// Validates buffer is correct block size
    fn validate_buffer(&self, buf: &[u8]) -> Result<(), FsError> {
        if buf.len() != self.block_size {
            return Err(FsError::IOError);
        }
        Ok(())
    }
}

impl BlockDevice for MemoryBlockDevice {
    /// Reads block into buffer
    fn read_block(&mut self, block_num: u64, buf: &mut [u8]) -> Result<(), FsError> {
        self.validate_block(block_num)?;
        self.validate_buffer(buf)?;
        buf.copy_from_slice(&self.blocks[block_num as usize]);
        self.reads += 1;
        Ok(())
    }

    /// Writes buffer to block
    fn write_block(&mut self, block_num: u64, buf: &[u8]) -> Result<(), FsError> {
        self.validate_block(block_num)?;
        self.validate_buffer(buf)?;
        self.blocks[block_num as usize].copy_from_slice(buf);
        self.writes += 1;
        Ok(())
    }

    /// Returns size of each block
    fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns total number of blocks
    fn total_blocks(&self) -> u64 {
        self.blocks.len() as u64
    }
}
