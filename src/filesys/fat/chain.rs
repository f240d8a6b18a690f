//! Chain walking shared by the reader, writer and truncator

use super::*;

impl<D: BlockDevice, F: FatAccess> Volume<D, F> {
    pub(super) fn check_cluster(&self, cluster: ClusterIndex) -> Result<(), FsError> {
        if !self.geometry.is_data_cluster(cluster) {
            return Err(FsError::InvalidCluster(cluster));
        }
        Ok(())
    }

    /// Follows one link. `None` means `cluster` is the tail of its chain.
    pub(super) fn successor(
        &mut self,
        cluster: ClusterIndex,
    ) -> Result<Option<ClusterIndex>, FsError> {
        match self.fat.next(cluster)? {
            FatEntry::Linked(next) => {
                self.check_cluster(next)?;
                Ok(Some(next))
            }
            FatEntry::EndOfChain => Ok(None),
            FatEntry::Free => Err(FsError::BrokenChain(cluster)),
            FatEntry::Bad => Err(FsError::BadCluster(cluster)),
        }
    }

    /// Lists every cluster of the chain starting at `first_cluster`
    pub fn chain_clusters(
        &mut self,
        first_cluster: ClusterIndex,
    ) -> Result<Vec<ClusterIndex>, FsError> {
        let mut clusters = Vec::new();
        if first_cluster == 0 {
            return Ok(clusters);
        }
        self.check_cluster(first_cluster)?;

        let mut cur = Some(first_cluster);
        while let Some(cluster) = cur {
            // A well-formed chain cannot be longer than the data region.
            if clusters.len() == self.geometry.num_data_clusters as usize {
                return Err(FsError::BrokenChain(cluster));
            }
            clusters.push(cluster);
            cur = self.successor(cluster)?;
        }
        Ok(clusters)
    }

    pub fn chain_len(&mut self, first_cluster: ClusterIndex) -> Result<usize, FsError> {
        Ok(self.chain_clusters(first_cluster)?.len())
    }

    /// Cluster at position `index` of the chain, without extending it
    pub fn cluster_at(
        &mut self,
        first_cluster: ClusterIndex,
        index: usize,
    ) -> Result<Option<ClusterIndex>, FsError> {
        if first_cluster == 0 {
            return Ok(None);
        }
        self.check_cluster(first_cluster)?;

        let mut cur = first_cluster;
        for _ in 0..index {
            match self.successor(cur)? {
                Some(next) => cur = next,
                None => return Ok(None),
            }
        }
        Ok(Some(cur))
    }
}
