//! Writing byte ranges into a cluster chain, growing it as needed

use super::*;
use core::cmp::min;
use log::{debug, warn};

impl<D: BlockDevice, F: FatAccess> Volume<D, F> {
    /// Follows the link out of `cluster`, appending a new cluster at the tail
    fn next_or_extend(&mut self, cluster: ClusterIndex) -> Result<ClusterIndex, FsError> {
        match self.successor(cluster)? {
            Some(next) => Ok(next),
            None => self.extend_chain(cluster),
        }
    }

    /// Writes all of `buf` starting `offset` bytes into the chain.
    ///
    /// Clusters are appended whenever the chain ends before the offset or
    /// before the data does, so a successful call always returns `buf.len()`.
    /// Running out of space fails the call with [`FsError::DiskFull`]; bytes
    /// written before that point stay on disk and the chain stays well formed.
    /// Creating the first cluster of a file is up to the caller; with
    /// `first_cluster == 0` nothing is written.
    pub fn write_chain(
        &mut self,
        first_cluster: ClusterIndex,
        buf: &[u8],
        offset: u64,
    ) -> Result<usize, FsError> {
        if first_cluster == 0 || buf.is_empty() {
            return Ok(0);
        }
        self.check_cluster(first_cluster)?;

        let cluster_size = self.geometry.bytes_per_cluster;
        let skip = offset / cluster_size as u64;

        let mut cur = first_cluster;
        for _ in 0..skip {
            cur = self.next_or_extend(cur).inspect_err(|e| {
                warn!("write_chain: cannot reach offset {:#x}: {}", offset, e);
            })?;
        }

        let mut cluster_offset = (offset % cluster_size as u64) as usize;
        let mut bytes_written = 0;
        loop {
            let chunk_size = min(cluster_size - cluster_offset, buf.len() - bytes_written);

            // Partial clusters are read first so bytes outside the range survive.
            if chunk_size < cluster_size {
                self.load_scratch(cur)?;
            }
            self.scratch[cluster_offset..cluster_offset + chunk_size]
                .copy_from_slice(&buf[bytes_written..bytes_written + chunk_size]);
            self.store_scratch(cur)?;

            bytes_written += chunk_size;
            cluster_offset = 0;

            if bytes_written >= buf.len() {
                break;
            }
            cur = self.next_or_extend(cur).inspect_err(|e| {
                warn!(
                    "write_chain: stopped after {:#x} of {:#x} bytes: {}",
                    bytes_written,
                    buf.len(),
                    e
                );
            })?;
        }

        debug!(
            "write_chain: {:#x} bytes at {:#x} into chain {:#x}",
            bytes_written, offset, first_cluster
        );
        Ok(bytes_written)
    }
}
