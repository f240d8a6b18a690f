//! FAT accessors: an in-memory arena and the on-disk table.

use super::{ClusterIndex, FatEntry, FatType};
use crate::constants::fat::{FIRST_DATA_CLUSTER, MEDIA_FIXED_DISK};
use crate::filesys::{BlockDevice, FatAccess, FsError};
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::min;

/// Table held entirely in memory, one raw slot per cluster index
pub struct MemoryFat {
    fat_type: FatType,
    slots: Vec<u32>,
}

impl MemoryFat {
    /// Creates a table with every data cluster free
    pub fn new(fat_type: FatType, num_data_clusters: u32) -> Self {
        let mut slots = vec![0; num_data_clusters as usize + FIRST_DATA_CLUSTER as usize];
        slots[0] = (fat_type.mask() & !0xFF) | MEDIA_FIXED_DISK as u32;
        slots[1] = fat_type.eoc_mark();
        Self { fat_type, slots }
    }

    pub fn fat_type(&self) -> FatType {
        self.fat_type
    }

    /// Raw value stored for `cluster`, as it would appear on disk
    pub fn raw(&self, cluster: ClusterIndex) -> Option<u32> {
        self.slots.get(cluster as usize).copied()
    }

    /// Links `clusters` in order and terminates the last one
    pub fn link_chain(&mut self, clusters: &[ClusterIndex]) -> Result<(), FsError> {
        for pair in clusters.windows(2) {
            self.set_next(pair[0], FatEntry::Linked(pair[1]))?;
        }
        if let Some(&tail) = clusters.last() {
            self.set_next(tail, FatEntry::EndOfChain)?;
        }
        Ok(())
    }

    fn slot(&self, cluster: ClusterIndex) -> Result<usize, FsError> {
        let idx = cluster as usize;
        if cluster < FIRST_DATA_CLUSTER || idx >= self.slots.len() {
            return Err(FsError::InvalidCluster(cluster));
        }
        Ok(idx)
    }
}

impl FatAccess for MemoryFat {
    fn next(&mut self, cluster: ClusterIndex) -> Result<FatEntry, FsError> {
        let idx = self.slot(cluster)?;
        Ok(FatEntry::from_raw(self.slots[idx], self.fat_type))
    }

    fn set_next(&mut self, cluster: ClusterIndex, entry: FatEntry) -> Result<(), FsError> {
        let idx = self.slot(cluster)?;
        self.slots[idx] = entry.to_raw(self.fat_type);
        Ok(())
    }

    fn capacity(&self) -> u32 {
        min(self.slots.len(), u32::MAX as usize) as u32
    }
}

/// Where an on-disk table lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatLayout {
    pub fat_type: FatType,
    /// Starting sector of first FAT
    pub fat_start: u64,
    pub sectors_per_fat: u64,
    /// Number of mirrored copies, usually 2
    pub fat_count: u8,
    pub bytes_per_sector: usize,
}

impl FatLayout {
    /// Byte offset of the entry for `cluster` within one table copy
    fn entry_offset(&self, cluster: ClusterIndex) -> usize {
        let cluster = cluster as usize;
        match self.fat_type {
            FatType::Fat12 => cluster + cluster / 2,
            FatType::Fat16 => cluster * 2,
            FatType::Fat32 => cluster * 4,
        }
    }

    fn entry_width(&self) -> usize {
        match self.fat_type {
            FatType::Fat12 | FatType::Fat16 => 2,
            FatType::Fat32 => 4,
        }
    }

    fn table_bytes(&self) -> usize {
        self.sectors_per_fat as usize * self.bytes_per_sector
    }

    fn copy_start(&self, copy: u8) -> u64 {
        self.fat_start + copy as u64 * self.sectors_per_fat
    }
}

/// Table stored in sectors of a block device, mirrored across all copies
pub struct SectorFat<D: BlockDevice> {
    device: D,
    layout: FatLayout,
    sector_buf: Vec<u8>,
}

impl<D: BlockDevice> SectorFat<D> {
    pub fn new(device: D, layout: FatLayout) -> Result<Self, FsError> {
        if layout.fat_count == 0
            || layout.sectors_per_fat == 0
            || layout.bytes_per_sector != device.block_size()
        {
            return Err(FsError::InvalidGeometry);
        }
        let sector_buf = vec![0u8; layout.bytes_per_sector];
        Ok(Self {
            device,
            layout,
            sector_buf,
        })
    }

    /// Zeroes every copy of the table and writes the two reserved entries
    pub fn initialize(&mut self, media_type: u8) -> Result<(), FsError> {
        let zero = vec![0u8; self.layout.bytes_per_sector];
        for copy in 0..self.layout.fat_count {
            let start = self.layout.copy_start(copy);
            for i in 0..self.layout.sectors_per_fat {
                self.device.write_block(start + i, &zero)?;
            }
        }

        let fat_type = self.layout.fat_type;
        self.write_raw(0, (fat_type.mask() & !0xFF) | media_type as u32)?;
        self.write_raw(1, fat_type.eoc_mark())
    }

    fn check(&self, cluster: ClusterIndex) -> Result<usize, FsError> {
        let offset = self.layout.entry_offset(cluster);
        if offset + self.layout.entry_width() > self.layout.table_bytes() {
            return Err(FsError::InvalidCluster(cluster));
        }
        Ok(offset)
    }

    /// Copies `out.len()` bytes of the first table copy starting at `offset`
    fn read_span(&mut self, offset: usize, out: &mut [u8]) -> Result<(), FsError> {
        let bps = self.layout.bytes_per_sector;
        let mut done = 0;
        while done < out.len() {
            let pos = offset + done;
            let start = pos % bps;
            let n = min(bps - start, out.len() - done);
            self.device
                .read_block(self.layout.fat_start + (pos / bps) as u64, &mut self.sector_buf)?;
            out[done..done + n].copy_from_slice(&self.sector_buf[start..start + n]);
            done += n;
        }
        Ok(())
    }

    /// Read-modify-writes `bytes` at `offset` in every table copy
    fn write_span(&mut self, offset: usize, bytes: &[u8]) -> Result<(), FsError> {
        let bps = self.layout.bytes_per_sector;
        for copy in 0..self.layout.fat_count {
            let base = self.layout.copy_start(copy);
            let mut done = 0;
            while done < bytes.len() {
                let pos = offset + done;
                let sector = base + (pos / bps) as u64;
                let start = pos % bps;
                let n = min(bps - start, bytes.len() - done);
                self.device.read_block(sector, &mut self.sector_buf)?;
                self.sector_buf[start..start + n].copy_from_slice(&bytes[done..done + n]);
                self.device.write_block(sector, &self.sector_buf)?;
                done += n;
            }
        }
        Ok(())
    }

    fn read_raw(&mut self, cluster: ClusterIndex) -> Result<u32, FsError> {
        let offset = self.check(cluster)?;
        match self.layout.fat_type {
            FatType::Fat12 => {
                let mut pair = [0u8; 2];
                self.read_span(offset, &mut pair)?;
                let packed = u16::from_le_bytes(pair);
                let value = if cluster & 1 == 1 {
                    packed >> 4
                } else {
                    packed & 0x0FFF
                };
                Ok(value as u32)
            }
            FatType::Fat16 => {
                let mut bytes = [0u8; 2];
                self.read_span(offset, &mut bytes)?;
                Ok(u16::from_le_bytes(bytes) as u32)
            }
            FatType::Fat32 => {
                let mut bytes = [0u8; 4];
                self.read_span(offset, &mut bytes)?;
                Ok(u32::from_le_bytes(bytes))
            }
        }
    }

    fn write_raw(&mut self, cluster: ClusterIndex, value: u32) -> Result<(), FsError> {
        let offset = self.check(cluster)?;
        match self.layout.fat_type {
            FatType::Fat12 => {
                // Two 12-bit entries share three bytes; keep the neighbour's nibble.
                let mut pair = [0u8; 2];
                self.read_span(offset, &mut pair)?;
                let packed = u16::from_le_bytes(pair);
                let value = (value & 0x0FFF) as u16;
                let packed = if cluster & 1 == 1 {
                    (packed & 0x000F) | (value << 4)
                } else {
                    (packed & 0xF000) | value
                };
                self.write_span(offset, &packed.to_le_bytes())
            }
            FatType::Fat16 => self.write_span(offset, &(value as u16).to_le_bytes()),
            FatType::Fat32 => {
                let mut bytes = [0u8; 4];
                self.read_span(offset, &mut bytes)?;
                let old = u32::from_le_bytes(bytes);
                let value = (old & !FatType::Fat32.mask()) | (value & FatType::Fat32.mask());
                self.write_span(offset, &value.to_le_bytes())
            }
        }
    }
}

impl<D: BlockDevice> FatAccess for SectorFat<D> {
    fn next(&mut self, cluster: ClusterIndex) -> Result<FatEntry, FsError> {
        if cluster < FIRST_DATA_CLUSTER {
            return Err(FsError::InvalidCluster(cluster));
        }
        let raw = self.read_raw(cluster)?;
        Ok(FatEntry::from_raw(raw, self.layout.fat_type))
    }

    fn set_next(&mut self, cluster: ClusterIndex, entry: FatEntry) -> Result<(), FsError> {
        if cluster < FIRST_DATA_CLUSTER {
            return Err(FsError::InvalidCluster(cluster));
        }
        self.write_raw(cluster, entry.to_raw(self.layout.fat_type))
    }

    /// Entries one table copy can hold
    fn capacity(&self) -> u32 {
        let bytes = self.layout.table_bytes();
        let entries = match self.layout.fat_type {
            FatType::Fat12 => bytes * 2 / 3,
            FatType::Fat16 => bytes / 2,
            FatType::Fat32 => bytes / 4,
        };
        min(entries, u32::MAX as usize) as u32
    }

    fn flush(&mut self) -> Result<(), FsError> {
        self.device.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SECTOR_SIZE;
    use crate::filesys::block::MemoryBlockDevice;

    fn layout(fat_type: FatType) -> FatLayout {
        FatLayout {
            fat_type,
            fat_start: 1,
            sectors_per_fat: 2,
            fat_count: 2,
            bytes_per_sector: SECTOR_SIZE,
        }
    }

    fn sector_fat(fat_type: FatType) -> SectorFat<MemoryBlockDevice> {
        let device = MemoryBlockDevice::new(8, SECTOR_SIZE);
        let mut fat = SectorFat::new(device, layout(fat_type)).unwrap();
        fat.initialize(MEDIA_FIXED_DISK).unwrap();
        fat
    }

    #[test]
    fn test_memory_fat_starts_free() {
        let mut fat = MemoryFat::new(FatType::Fat32, 10);
        for cluster in 2..12 {
            assert_eq!(fat.next(cluster), Ok(FatEntry::Free));
        }
        assert_eq!(fat.next(12), Err(FsError::InvalidCluster(12)));
        assert_eq!(fat.next(1), Err(FsError::InvalidCluster(1)));
    }

    #[test]
    fn test_memory_fat_link_chain() {
        let mut fat = MemoryFat::new(FatType::Fat32, 10);
        fat.link_chain(&[5, 6, 9]).unwrap();
        assert_eq!(fat.next(5), Ok(FatEntry::Linked(6)));
        assert_eq!(fat.next(6), Ok(FatEntry::Linked(9)));
        assert_eq!(fat.next(9), Ok(FatEntry::EndOfChain));
        assert_eq!(fat.raw(9), Some(0x0FFF_FFFF));
    }

    #[test]
    fn test_fat16_entries_mirrored() {
        let mut fat = sector_fat(FatType::Fat16);
        fat.set_next(3, FatEntry::Linked(4)).unwrap();
        fat.set_next(4, FatEntry::EndOfChain).unwrap();

        assert_eq!(fat.next(3), Ok(FatEntry::Linked(4)));
        assert_eq!(fat.next(4), Ok(FatEntry::EndOfChain));

        let mut first = [0u8; 512];
        let mut second = [0u8; 512];
        fat.device.read_block(1, &mut first).unwrap();
        fat.device.read_block(3, &mut second).unwrap();
        assert_eq!(first, second);
        assert_eq!(&first[0..4], &[0xF8, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&first[6..10], &[0x04, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn test_fat12_neighbours_do_not_clobber() {
        let mut fat = sector_fat(FatType::Fat12);
        fat.set_next(2, FatEntry::Linked(0xABC)).unwrap();
        fat.set_next(3, FatEntry::EndOfChain).unwrap();
        fat.set_next(4, FatEntry::Linked(0x123)).unwrap();

        assert_eq!(fat.next(2), Ok(FatEntry::Linked(0xABC)));
        assert_eq!(fat.next(3), Ok(FatEntry::EndOfChain));
        assert_eq!(fat.next(4), Ok(FatEntry::Linked(0x123)));

        fat.set_next(3, FatEntry::Free).unwrap();
        assert_eq!(fat.next(2), Ok(FatEntry::Linked(0xABC)));
        assert_eq!(fat.next(3), Ok(FatEntry::Free));
        assert_eq!(fat.next(4), Ok(FatEntry::Linked(0x123)));
    }

    #[test]
    fn test_fat12_entry_straddling_sectors() {
        let mut fat = sector_fat(FatType::Fat12);
        // Entry 341 occupies bytes 511 and 512 of the table.
        fat.set_next(341, FatEntry::Linked(0x456)).unwrap();
        fat.set_next(340, FatEntry::Linked(0x789)).unwrap();

        assert_eq!(fat.next(341), Ok(FatEntry::Linked(0x456)));
        assert_eq!(fat.next(340), Ok(FatEntry::Linked(0x789)));
        assert_eq!(fat.next(342), Ok(FatEntry::Free));
    }

    #[test]
    fn test_fat32_preserves_reserved_bits() {
        let mut fat = sector_fat(FatType::Fat32);
        fat.write_span(28, &0xF000_0000u32.to_le_bytes()).unwrap();
        assert_eq!(fat.next(7), Ok(FatEntry::Free));

        fat.set_next(7, FatEntry::Linked(9)).unwrap();
        assert_eq!(fat.read_raw(7), Ok(0xF000_0009));
        assert_eq!(fat.next(7), Ok(FatEntry::Linked(9)));
    }

    #[test]
    fn test_entries_past_table_rejected() {
        let mut fat = sector_fat(FatType::Fat16);
        assert_eq!(fat.capacity(), 512);
        assert_eq!(fat.next(511), Ok(FatEntry::Free));
        assert_eq!(fat.next(512), Err(FsError::InvalidCluster(512)));
    }

    #[test]
    fn test_layout_must_match_device() {
        let mut bad = layout(FatType::Fat16);
        bad.bytes_per_sector = 1024;
        assert!(matches!(
            SectorFat::new(MemoryBlockDevice::new(8, 512), bad),
            Err(FsError::InvalidGeometry)
        ));
    }
}
