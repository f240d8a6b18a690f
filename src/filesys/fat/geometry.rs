//! Static partition parameters consumed by the chain logic

use super::ClusterIndex;
use crate::constants::fat::FIRST_DATA_CLUSTER;
use crate::filesys::FsError;

/// Data-region layout of a mounted volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionGeometry {
    pub bytes_per_sector: usize,
    pub sectors_per_cluster: usize,
    pub bytes_per_cluster: usize,
    /// Physical sector holding cluster 2
    pub clusters_first_sector: u64,
    pub num_data_clusters: u32,
}

impl PartitionGeometry {
    pub fn new(
        bytes_per_sector: usize,
        sectors_per_cluster: usize,
        clusters_first_sector: u64,
        num_data_clusters: u32,
    ) -> Result<Self, FsError> {
        if bytes_per_sector == 0 || sectors_per_cluster == 0 || num_data_clusters == 0 {
            return Err(FsError::InvalidGeometry);
        }
        let bytes_per_cluster = bytes_per_sector
            .checked_mul(sectors_per_cluster)
            .ok_or(FsError::InvalidGeometry)?;
        num_data_clusters
            .checked_add(FIRST_DATA_CLUSTER)
            .ok_or(FsError::InvalidGeometry)?;

        Ok(Self {
            bytes_per_sector,
            sectors_per_cluster,
            bytes_per_cluster,
            clusters_first_sector,
            num_data_clusters,
        })
    }

    /// Highest cluster index backed by the data region
    pub fn last_cluster(&self) -> ClusterIndex {
        self.num_data_clusters + FIRST_DATA_CLUSTER - 1
    }

    pub fn is_data_cluster(&self, cluster: ClusterIndex) -> bool {
        (FIRST_DATA_CLUSTER..=self.last_cluster()).contains(&cluster)
    }

    /// Converts cluster number to absolute sector number
    pub fn cluster_to_sector(&self, cluster: ClusterIndex) -> u64 {
        self.clusters_first_sector
            + (cluster - FIRST_DATA_CLUSTER) as u64 * self.sectors_per_cluster as u64
    }

    /// Sector just past the data region
    pub fn end_sector(&self) -> u64 {
        self.cluster_to_sector(self.last_cluster()) + self.sectors_per_cluster as u64
    }
}
