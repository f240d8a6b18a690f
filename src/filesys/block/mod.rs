//! Sector devices: raw in-memory storage, an optional sector cache, and a
//! shared handle so the data path and the FAT can sit on one disk.

mod cache;
mod memory;

pub use cache::{CacheConfig, CacheStats, SectorCache, WritePolicy};
pub use memory::MemoryBlockDevice;

use super::{BlockDevice, FsError};
use alloc::sync::Arc;
use spin::Mutex;

impl<T: BlockDevice + ?Sized> BlockDevice for Arc<Mutex<T>> {
    fn read_block(&mut self, block_num: u64, buf: &mut [u8]) -> Result<(), FsError> {
        self.lock().read_block(block_num, buf)
    }

    fn write_block(&mut self, block_num: u64, buf: &[u8]) -> Result<(), FsError> {
        self.lock().write_block(block_num, buf)
    }

    fn block_size(&self) -> usize {
        self.lock().block_size()
    }

    fn total_blocks(&self) -> u64 {
        self.lock().total_blocks()
    }

    fn flush(&mut self) -> Result<(), FsError> {
        self.lock().flush()
    }
}
