use core::result::Result;

pub mod block;
pub mod fat;

use fat::ClusterIndex;

// Define error types for the cluster-chain operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    /// The sector device rejected a transfer
    IOError,
    /// No free cluster was found while extending or allocating
    DiskFull,
    /// A cluster index outside the data region reached the chain logic
    InvalidCluster(ClusterIndex),
    /// A chain member is marked bad in the FAT
    BadCluster(ClusterIndex),
    /// A chain member points at a free slot, or the walk never terminates
    BrokenChain(ClusterIndex),
    /// Geometry is zero-sized or disagrees with the device
    InvalidGeometry,
}

impl core::fmt::Display for FsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FsError::IOError => write!(f, "Sector I/O failed"),
            FsError::DiskFull => write!(f, "No free cluster available"),
            FsError::InvalidCluster(c) => write!(f, "Cluster {:#x} is outside the data region", c),
            FsError::BadCluster(c) => write!(f, "Cluster {:#x} is marked bad", c),
            FsError::BrokenChain(c) => write!(f, "Cluster chain is broken at {:#x}", c),
            FsError::InvalidGeometry => write!(f, "Invalid partition geometry"),
        }
    }
}

// Core traits for the cluster-chain layer

/// Represents a sector-addressed device that can be read from and written to
pub trait BlockDevice {
    fn read_block(&mut self, block_num: u64, buf: &mut [u8]) -> Result<(), FsError>;
    fn write_block(&mut self, block_num: u64, buf: &[u8]) -> Result<(), FsError>;
    fn block_size(&self) -> usize;
    fn total_blocks(&self) -> u64;

    /// Pushes buffered writes to the backing store
    fn flush(&mut self) -> Result<(), FsError> {
        Ok(())
    }
}

/// The File Allocation Table as seen by the chain logic
///
/// Implementations own the on-disk (or in-memory) encoding and convert
/// between raw values and [`fat::FatEntry`] at this boundary.
pub trait FatAccess {
    fn next(&mut self, cluster: ClusterIndex) -> Result<fat::FatEntry, FsError>;
    fn set_next(&mut self, cluster: ClusterIndex, entry: fat::FatEntry) -> Result<(), FsError>;

    /// Number of cluster indices the table describes, reserved slots included
    fn capacity(&self) -> u32;

    /// Pushes buffered table updates to the backing store
    fn flush(&mut self) -> Result<(), FsError> {
        Ok(())
    }
}
