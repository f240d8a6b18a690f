//! FAT cluster-chain management
//!
//! A [`Volume`] couples a sector device, a FAT accessor and the partition
//! geometry, and translates byte ranges of a chain into whole-cluster I/O.
//! Every chain mutation takes `&mut self`; wrap the volume in a
//! [`SharedVolume`] when several tasks drive the same partition.

use super::*;
use alloc::vec;
use alloc::vec::Vec;

mod allocator;
mod chain;
mod cluster;
mod fat_entry;
mod geometry;
mod reader;
mod shared;
mod table;
mod truncate;
mod writer;

pub use cluster::{read_cluster, write_cluster};
pub use fat_entry::{ClusterIndex, FatEntry, FatType};
pub use geometry::PartitionGeometry;
pub use shared::SharedVolume;
pub use table::{FatLayout, MemoryFat, SectorFat};

/// Mounted partition context for the chain operations
pub struct Volume<D: BlockDevice, F: FatAccess> {
    /// Underlying sector device, raw or cached
    device: D,
    /// Table accessor used for every link lookup and update
    fat: F,
    geometry: PartitionGeometry,
    /// One cluster of scratch space, reused by every read-modify-write
    scratch: Vec<u8>,
}

impl<D: BlockDevice, F: FatAccess> Volume<D, F> {
    pub fn new(device: D, fat: F, geometry: PartitionGeometry) -> Result<Self, FsError> {
        if device.block_size() != geometry.bytes_per_sector
            || device.total_blocks() < geometry.end_sector()
        {
            return Err(FsError::InvalidGeometry);
        }
        if fat.capacity() <= geometry.last_cluster() {
            return Err(FsError::InvalidGeometry);
        }

        let scratch = vec![0u8; geometry.bytes_per_cluster];
        Ok(Self {
            device,
            fat,
            geometry,
            scratch,
        })
    }

    pub fn geometry(&self) -> &PartitionGeometry {
        &self.geometry
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn fat(&self) -> &F {
        &self.fat
    }

    pub fn fat_mut(&mut self) -> &mut F {
        &mut self.fat
    }

    /// Pushes table updates and cached sectors to the device
    pub fn flush(&mut self) -> Result<(), FsError> {
        self.fat.flush()?;
        self.device.flush()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesys::block::MemoryBlockDevice;

    #[test]
    fn test_volume_rejects_mismatched_device() {
        let geometry = PartitionGeometry::new(512, 1, 0, 10).unwrap();
        let fat = MemoryFat::new(FatType::Fat16, 10);
        assert!(matches!(
            Volume::new(MemoryBlockDevice::new(10, 256), fat, geometry),
            Err(FsError::InvalidGeometry)
        ));

        let fat = MemoryFat::new(FatType::Fat16, 10);
        assert!(matches!(
            Volume::new(MemoryBlockDevice::new(9, 512), fat, geometry),
            Err(FsError::InvalidGeometry)
        ));
    }

    #[test]
    fn test_volume_rejects_table_smaller_than_data_region() {
        let geometry = PartitionGeometry::new(512, 1, 0, 10).unwrap();
        let fat = MemoryFat::new(FatType::Fat16, 9);
        assert!(matches!(
            Volume::new(MemoryBlockDevice::new(10, 512), fat, geometry),
            Err(FsError::InvalidGeometry)
        ));

        // One FAT16 sector holds 16 entries: clusters 2..=15 at most.
        let layout = FatLayout {
            fat_type: FatType::Fat16,
            fat_start: 0,
            sectors_per_fat: 1,
            fat_count: 1,
            bytes_per_sector: 32,
        };
        let fat = SectorFat::new(MemoryBlockDevice::new(1, 32), layout).unwrap();
        assert_eq!(fat.capacity(), 16);
        let geometry = PartitionGeometry::new(32, 1, 1, 15).unwrap();
        assert!(matches!(
            Volume::new(MemoryBlockDevice::new(16, 32), fat, geometry),
            Err(FsError::InvalidGeometry)
        ));

        let fat = SectorFat::new(MemoryBlockDevice::new(1, 32), layout).unwrap();
        let geometry = PartitionGeometry::new(32, 1, 1, 14).unwrap();
        assert!(Volume::new(MemoryBlockDevice::new(15, 32), fat, geometry).is_ok());
    }

    #[test]
    fn test_chain_on_disk_table_behind_cache() {
        use crate::constants::fat::MEDIA_FIXED_DISK;
        use crate::constants::SECTOR_SIZE;
        use crate::filesys::block::{CacheConfig, SectorCache, WritePolicy};
        use alloc::sync::Arc;
        use spin::Mutex;

        let geometry = PartitionGeometry::new(SECTOR_SIZE, 2, 3, 32).unwrap();
        let disk = Arc::new(Mutex::new(MemoryBlockDevice::new(
            geometry.end_sector(),
            SECTOR_SIZE,
        )));
        let layout = FatLayout {
            fat_type: FatType::Fat16,
            fat_start: 1,
            sectors_per_fat: 1,
            fat_count: 2,
            bytes_per_sector: SECTOR_SIZE,
        };

        let cache: SectorCache<_, 4> = SectorCache::new(
            disk.clone(),
            CacheConfig {
                policy: WritePolicy::WriteBack,
            },
        );
        let mut fat = SectorFat::new(cache, layout).unwrap();
        fat.initialize(MEDIA_FIXED_DISK).unwrap();

        let mut vol = Volume::new(disk.clone(), fat, geometry).unwrap();
        let first = vol.allocate_new_cluster(0).unwrap();
        assert_eq!(first, 2);

        let data: Vec<u8> = (0..3000u32).map(|i| (i % 251) as u8).collect();
        assert_eq!(vol.write_chain(first, &data, 0), Ok(3000));
        assert_eq!(vol.chain_clusters(first), Ok(vec![2, 3, 4]));

        // Push the cached table sectors to disk, then remount from scratch.
        vol.flush().unwrap();
        drop(vol);
        let mut fat_sectors = [[0u8; SECTOR_SIZE]; 2];
        disk.lock().read_block(1, &mut fat_sectors[0]).unwrap();
        disk.lock().read_block(2, &mut fat_sectors[1]).unwrap();
        assert_eq!(fat_sectors[0], fat_sectors[1]);

        let fat = SectorFat::new(disk.clone(), layout).unwrap();
        let mut vol = Volume::new(disk, fat, geometry).unwrap();
        assert_eq!(vol.chain_len(2), Ok(3));
        let mut back = vec![0u8; 3000];
        assert_eq!(vol.read_chain(2, &mut back, 0), Ok(3000));
        assert_eq!(back, data);
        assert_eq!(vol.free_cluster_count(), Ok(29));
    }

    #[test]
    fn test_scratch_sized_once_per_cluster() {
        let vol = test_util::volume(4);
        assert_eq!(vol.scratch.len(), test_util::CLUSTER_BYTES);
        assert_eq!(vol.geometry().bytes_per_cluster, test_util::CLUSTER_BYTES);
    }
}
