#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]
extern crate alloc;

pub mod constants;
pub mod filesys;
pub mod logging;

pub mod prelude {
    pub use crate::filesys::block::{CacheConfig, MemoryBlockDevice, SectorCache, WritePolicy};
    pub use crate::filesys::fat::{
        ClusterIndex, FatEntry, FatLayout, FatType, MemoryFat, PartitionGeometry,
        SectorFat, SharedVolume, Volume,
    };
    pub use crate::filesys::{BlockDevice, FatAccess, FsError};
}
