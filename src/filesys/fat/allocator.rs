//! Free-space search and cluster allocation

use super::*;
use crate::constants::fat::FIRST_DATA_CLUSTER;
use core::cmp::max;
use log::{trace, warn};

impl<D: BlockDevice, F: FatAccess> Volume<D, F> {
    /// Returns the first free cluster in `max(hint, 2)..=last_cluster`.
    ///
    /// The scan does not wrap around to `2..hint`, so `None` only means no
    /// cluster at or after the hint is free.
    pub fn find_free_cluster(
        &mut self,
        hint: ClusterIndex,
    ) -> Result<Option<ClusterIndex>, FsError> {
        let start = max(hint, FIRST_DATA_CLUSTER);
        for cluster in start..=self.geometry.last_cluster() {
            if self.fat.next(cluster)?.is_free() {
                return Ok(Some(cluster));
            }
        }
        Ok(None)
    }

    /// Claims a free cluster as a new one-cluster chain.
    ///
    /// The returned cluster's entry already reads [`FatEntry::EndOfChain`].
    pub fn allocate_new_cluster(&mut self, hint: ClusterIndex) -> Result<ClusterIndex, FsError> {
        let Some(cluster) = self.find_free_cluster(hint)? else {
            warn!("allocate_new_cluster: no free cluster at or after {:#x}", hint);
            return Err(FsError::DiskFull);
        };

        self.fat.set_next(cluster, FatEntry::EndOfChain)?;
        trace!("allocate_new_cluster: claimed {:#x}", cluster);
        Ok(cluster)
    }

    /// Appends a fresh cluster after `tail` and returns it.
    ///
    /// Allocation and linking happen under the same `&mut self`; if linking
    /// fails the new cluster is released again.
    pub(super) fn extend_chain(&mut self, tail: ClusterIndex) -> Result<ClusterIndex, FsError> {
        let new_cluster = self.allocate_new_cluster(tail.saturating_add(1))?;
        if let Err(e) = self.fat.set_next(tail, FatEntry::Linked(new_cluster)) {
            if let Err(release) = self.fat.set_next(new_cluster, FatEntry::Free) {
                warn!(
                    "extend_chain: cluster {:#x} leaked after failed link from {:#x}: {}",
                    new_cluster, tail, release
                );
            }
            return Err(e);
        }
        trace!("extend_chain: {:#x} -> {:#x}", tail, new_cluster);
        Ok(new_cluster)
    }

    /// Number of free clusters in the data region
    pub fn free_cluster_count(&mut self) -> Result<u32, FsError> {
        let mut free = 0;
        for cluster in FIRST_DATA_CLUSTER..=self.geometry.last_cluster() {
            if self.fat.next(cluster)?.is_free() {
                free += 1;
            }
        }
        Ok(free)
    }
}
