//! Sector cache sitting in front of a block device
//!
//! Keeps up to `N` sectors resident and evicts the least recently used one.
//! The chain logic is indifferent to whether it talks to a cache or to the
//! raw device; both implement [`BlockDevice`].

use crate::constants::fat::DEFAULT_CACHE_LINES;
use crate::filesys::{BlockDevice, FsError};
use alloc::vec;
use alloc::vec::Vec;
use arrayvec::ArrayVec;
use log::trace;

/// When sector writes reach the backing device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Every write goes to the device immediately
    #[default]
    WriteThrough,
    /// Writes stay in the cache until eviction or [`BlockDevice::flush`]
    WriteBack,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheConfig {
    pub policy: WritePolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub write_backs: u64,
}

struct CacheLine {
    sector: u64,
    data: Vec<u8>,
    dirty: bool,
    last_used: u64,
}

pub struct SectorCache<D: BlockDevice, const N: usize = DEFAULT_CACHE_LINES> {
    device: D,
    config: CacheConfig,
    lines: ArrayVec<CacheLine, N>,
    /// Monotonic use counter for LRU ordering
    clock: u64,
    stats: CacheStats,
}

impl<D: BlockDevice, const N: usize> SectorCache<D, N> {
    pub fn new(device: D, config: CacheConfig) -> Self {
        Self {
            device,
            config,
            lines: ArrayVec::new(),
            clock: 0,
            stats: CacheStats::default(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn get_ref(&self) -> &D {
        &self.device
    }

    /// Number of resident sectors holding writes the device has not seen
    pub fn dirty_lines(&self) -> usize {
        self.lines.iter().filter(|l| l.dirty).count()
    }

    /// Flushes dirty sectors and hands back the device
    pub fn into_inner(mut self) -> Result<D, FsError> {
        self.flush()?;
        Ok(self.device)
    }

    /// Rejects requests the device would refuse, before a line is claimed
    fn validate(&self, block_num: u64, buf: &[u8]) -> Result<(), FsError> {
        if block_num >= self.device.total_blocks() || buf.len() != self.device.block_size() {
            return Err(FsError::IOError);
        }
        Ok(())
    }

    fn lookup(&self, sector: u64) -> Option<usize> {
        self.lines.iter().position(|l| l.sector == sector)
    }

    fn touch(&mut self, idx: usize) {
        self.clock += 1;
        self.lines[idx].last_used = self.clock;
    }

    fn write_back(&mut self, idx: usize) -> Result<(), FsError> {
        let line = &mut self.lines[idx];
        if line.dirty {
            self.device.write_block(line.sector, &line.data)?;
            line.dirty = false;
            self.stats.write_backs += 1;
        }
        Ok(())
    }

    /// Returns a line tagged with `sector` whose contents the caller must fill
    fn claim_line(&mut self, sector: u64) -> Result<usize, FsError> {
        if !self.lines.is_full() {
            let block_size = self.device.block_size();
            self.lines.push(CacheLine {
                sector,
                data: vec![0; block_size],
                dirty: false,
                last_used: 0,
            });
            return Ok(self.lines.len() - 1);
        }

        let victim = self
            .lines
            .iter()
            .enumerate()
            .min_by_key(|(_, l)| l.last_used)
            .map(|(i, _)| i)
            .ok_or(FsError::IOError)?;
        self.write_back(victim)?;
        trace!(
            "sector cache: evicting sector {} for {}",
            self.lines[victim].sector,
            sector
        );
        self.lines[victim].sector = sector;
        self.stats.evictions += 1;
        Ok(victim)
    }
}

impl<D: BlockDevice, const N: usize> BlockDevice for SectorCache<D, N> {
    fn read_block(&mut self, block_num: u64, buf: &mut [u8]) -> Result<(), FsError> {
        if N == 0 {
            return self.device.read_block(block_num, buf);
        }
        self.validate(block_num, buf)?;

        let idx = match self.lookup(block_num) {
            Some(idx) => {
                self.stats.hits += 1;
                idx
            }
            None => {
                self.stats.misses += 1;
                let idx = self.claim_line(block_num)?;
                if let Err(e) = self.device.read_block(block_num, &mut self.lines[idx].data) {
                    self.lines.remove(idx);
                    return Err(e);
                }
                idx
            }
        };

        buf.copy_from_slice(&self.lines[idx].data);
        self.touch(idx);
        Ok(())
    }

    fn write_block(&mut self, block_num: u64, buf: &[u8]) -> Result<(), FsError> {
        if N == 0 {
            return self.device.write_block(block_num, buf);
        }
        self.validate(block_num, buf)?;

        match self.config.policy {
            WritePolicy::WriteThrough => {
                self.device.write_block(block_num, buf)?;
                if let Some(idx) = self.lookup(block_num) {
                    self.lines[idx].data.copy_from_slice(buf);
                    self.touch(idx);
                }
            }
            WritePolicy::WriteBack => {
                let idx = match self.lookup(block_num) {
                    Some(idx) => idx,
                    None => self.claim_line(block_num)?,
                };
                self.lines[idx].data.copy_from_slice(buf);
                self.lines[idx].dirty = true;
                self.touch(idx);
            }
        }
        Ok(())
    }

    fn block_size(&self) -> usize {
        self.device.block_size()
    }

    fn total_blocks(&self) -> u64 {
        self.device.total_blocks()
    }

    fn flush(&mut self) -> Result<(), FsError> {
        for idx in 0..self.lines.len() {
            self.write_back(idx)?;
        }
        self.device.flush()
    }
}
