//! Whole-cluster transfers between a buffer and the sector device

use super::*;

/// Fills `buf` with the `sectors_per_cluster` sectors backing `cluster`
pub fn read_cluster<D: BlockDevice + ?Sized>(
    device: &mut D,
    geometry: &PartitionGeometry,
    cluster: ClusterIndex,
    buf: &mut [u8],
) -> Result<(), FsError> {
    if !geometry.is_data_cluster(cluster) {
        return Err(FsError::InvalidCluster(cluster));
    }
    if buf.len() != geometry.bytes_per_cluster {
        return Err(FsError::IOError);
    }

    let sector = geometry.cluster_to_sector(cluster);
    for (i, sector_data) in buf.chunks_exact_mut(geometry.bytes_per_sector).enumerate() {
        device.read_block(sector + i as u64, sector_data)?;
    }
    Ok(())
}

/// Writes `buf` over the sectors backing `cluster`
pub fn write_cluster<D: BlockDevice + ?Sized>(
    device: &mut D,
    geometry: &PartitionGeometry,
    cluster: ClusterIndex,
    buf: &[u8],
) -> Result<(), FsError> {
    if !geometry.is_data_cluster(cluster) {
        return Err(FsError::InvalidCluster(cluster));
    }
    if buf.len() != geometry.bytes_per_cluster {
        return Err(FsError::IOError);
    }

    let sector = geometry.cluster_to_sector(cluster);
    for (i, sector_data) in buf.chunks_exact(geometry.bytes_per_sector).enumerate() {
        device.write_block(sector + i as u64, sector_data)?;
    }
    Ok(())
}

impl<D: BlockDevice, F: FatAccess> Volume<D, F> {
    pub fn read_cluster(&mut self, cluster: ClusterIndex, buf: &mut [u8]) -> Result<(), FsError> {
        read_cluster(&mut self.device, &self.geometry, cluster, buf)
    }

    pub fn write_cluster(&mut self, cluster: ClusterIndex, buf: &[u8]) -> Result<(), FsError> {
        write_cluster(&mut self.device, &self.geometry, cluster, buf)
    }

    /// Zero-fills a cluster, e.g. before it becomes a directory
    pub fn clear_cluster(&mut self, cluster: ClusterIndex) -> Result<(), FsError> {
        self.scratch.fill(0);
        write_cluster(&mut self.device, &self.geometry, cluster, &self.scratch)
    }

    /// Loads `cluster` into the scratch buffer
    pub(super) fn load_scratch(&mut self, cluster: ClusterIndex) -> Result<(), FsError> {
        read_cluster(&mut self.device, &self.geometry, cluster, &mut self.scratch)
    }

    /// Stores the scratch buffer into `cluster`
    pub(super) fn store_scratch(&mut self, cluster: ClusterIndex) -> Result<(), FsError> {
        write_cluster(&mut self.device, &self.geometry, cluster, &self.scratch)
    }
}
