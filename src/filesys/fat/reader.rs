//! Copying byte ranges out of a cluster chain

use super::*;
use core::cmp::min;
use log::debug;

impl<D: BlockDevice, F: FatAccess> Volume<D, F> {
    /// Copies up to `buf.len()` bytes starting `offset` bytes into the chain.
    ///
    /// Returns the number of bytes produced. A result shorter than `buf`
    /// means the chain ended first; an offset past the end of the chain, or
    /// `first_cluster == 0`, yields 0.
    pub fn read_chain(
        &mut self,
        first_cluster: ClusterIndex,
        buf: &mut [u8],
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
            match self.successor(cur)? {
                Some(next) => cur = next,
                None => {
                    debug!(
                        "read_chain: offset {:#x} lies past the end of chain {:#x}",
                        offset, first_cluster
                    );
                    return Ok(0);
                }
            }
        }

        let mut cluster_offset = (offset % cluster_size as u64) as usize;
        let mut bytes_read = 0;
        while bytes_read < buf.len() {
            self.load_scratch(cur)?;

            let chunk_size = min(cluster_size - cluster_offset, buf.len() - bytes_read);
            buf[bytes_read..bytes_read + chunk_size]
                .copy_from_slice(&self.scratch[cluster_offset..cluster_offset + chunk_size]);
            bytes_read += chunk_size;
            cluster_offset = 0;

            if bytes_read == buf.len() {
                break;
            }
            match self.successor(cur)? {
                Some(next) => cur = next,
                None => break,
            }
        }

        Ok(bytes_read)
    }
}
