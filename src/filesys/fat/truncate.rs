//! Releasing the tail of a cluster chain

use super::*;
use log::{debug, trace};

impl<D: BlockDevice, F: FatAccess> Volume<D, F> {
    /// Keeps the first `keep_len` clusters of the chain and frees the rest.
    ///
    /// The last kept cluster becomes the new end of chain. With
    /// `keep_len == 0` every cluster is freed, `first_cluster` included, and
    /// the caller must drop its reference to it. Returns the number of
    /// clusters released.
    pub fn truncate_chain(
        &mut self,
        first_cluster: ClusterIndex,
        keep_len: usize,
    ) -> Result<usize, FsError> {
        if first_cluster == 0 {
            return Ok(0);
        }
        self.check_cluster(first_cluster)?;

        let mut cur = first_cluster;
        let mut position = 0;
        let mut released = 0;
        loop {
            // Read the link before the entry is overwritten.
            let next = self.successor(cur)?;
            position += 1;

            if position == keep_len && next.is_some() {
                self.fat.set_next(cur, FatEntry::EndOfChain)?;
                trace!("truncate_chain: new tail {:#x}", cur);
            } else if position > keep_len {
                self.fat.set_next(cur, FatEntry::Free)?;
                released += 1;
            }

            match next {
                Some(cluster) => cur = cluster,
                None => break,
            }
        }

        debug!(
            "truncate_chain: chain {:#x} kept {} released {}",
            first_cluster,
            position.min(keep_len),
            released
        );
        Ok(released)
    }

    /// Returns every cluster of the chain to the free pool
    pub fn free_chain(&mut self, first_cluster: ClusterIndex) -> Result<usize, FsError> {
        self.truncate_chain(first_cluster, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::test_util::*;
    use super::*;

    #[test]
    fn test_table_failure_mid_truncate() {
        let mut vol = faulty_volume(&[5, 6, 7, 8]);
        // Lookups of 5 and 6 succeed, the lookup of 7 fails.
        vol.fat_mut().next_fault = FailAt::once_after(2);

        assert_eq!(vol.truncate_chain(5, 1), Err(FsError::IOError));
        assert_eq!(vol.fat_mut().next(5), Ok(FatEntry::EndOfChain));
        assert_eq!(vol.fat_mut().next(6), Ok(FatEntry::Free));
        assert_eq!(vol.fat_mut().next(7), Ok(FatEntry::Linked(8)));
    }

    #[test]
    fn test_truncate_keeps_prefix() {
        let mut vol = volume_with_chain(&[2, 7, 4, 9, 3]);
        assert_eq!(vol.truncate_chain(2, 2), Ok(3));

        assert_eq!(vol.chain_clusters(2), Ok(vec![2, 7]));
        assert_eq!(vol.fat_mut().next(7), Ok(FatEntry::EndOfChain));
        for cluster in [4, 9, 3] {
            assert_eq!(vol.fat_mut().next(cluster), Ok(FatEntry::Free));
        }
    }

    #[test]
    fn test_truncate_to_one_cluster() {
        let mut vol = volume_with_chain(&[5, 6, 7]);
        assert_eq!(vol.truncate_chain(5, 1), Ok(2));
        assert_eq!(vol.chain_clusters(5), Ok(vec![5]));
        assert_eq!(vol.free_cluster_count(), Ok(15));
    }

    #[test]
    fn test_truncate_longer_than_chain_is_a_no_op() {
        let mut vol = volume_with_chain(&[5, 6, 7]);
        assert_eq!(vol.truncate_chain(5, 3), Ok(0));
        assert_eq!(vol.truncate_chain(5, 10), Ok(0));
        assert_eq!(vol.chain_clusters(5), Ok(vec![5, 6, 7]));
    }

    #[test]
    fn test_truncate_to_zero_frees_whole_chain() {
        let mut vol = volume_with_chain(&[5, 6, 7]);
        assert_eq!(vol.truncate_chain(5, 0), Ok(3));
        for cluster in [5, 6, 7] {
            assert_eq!(vol.fat_mut().next(cluster), Ok(FatEntry::Free));
        }
        assert_eq!(vol.free_cluster_count(), Ok(16));
    }

    #[test]
    #[ignore = "open question: truncating to zero may be meant to keep the first cluster as an empty chain"]
    fn test_truncate_to_zero_keeps_first_cluster() {
        let mut vol = volume_with_chain(&[5, 6, 7]);
        vol.truncate_chain(5, 0).unwrap();
        assert_eq!(vol.fat_mut().next(5), Ok(FatEntry::EndOfChain));
    }

    #[test]
    fn test_free_chain_and_absent_chain() {
        let mut vol = volume_with_chain(&[8, 9]);
        assert_eq!(vol.free_chain(0), Ok(0));
        assert_eq!(vol.free_chain(8), Ok(2));
        assert_eq!(vol.free_cluster_count(), Ok(16));
    }

    #[test]
    fn test_released_clusters_are_reused() {
        let mut vol = volume_with_chain(&[2, 3, 4]);
        vol.truncate_chain(2, 1).unwrap();
        assert_eq!(vol.write_chain(2, &[6; 700], 0), Ok(700));
        assert_eq!(vol.chain_clusters(2), Ok(vec![2, 3]));
    }
}
