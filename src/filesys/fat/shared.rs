//! Serialized access to one volume from several tasks

use super::*;
use alloc::sync::Arc;
use spin::{Mutex, MutexGuard};

/// Cloneable handle that serializes every chain operation on a partition.
///
/// Each method holds the lock for its whole duration, so finding a free
/// cluster, marking it end of chain and linking it to its predecessor can
/// never interleave with another handle's mutation.
pub struct SharedVolume<D: BlockDevice, F: FatAccess> {
    inner: Arc<Mutex<Volume<D, F>>>,
}

impl<D: BlockDevice, F: FatAccess> Clone for SharedVolume<D, F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D: BlockDevice, F: FatAccess> SharedVolume<D, F> {
    pub fn new(volume: Volume<D, F>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(volume)),
        }
    }

    /// Locks the volume for a sequence of operations that must not interleave
    pub fn lock(&self) -> MutexGuard<'_, Volume<D, F>> {
        self.inner.lock()
    }

    pub fn read_chain(
        &self,
        first_cluster: ClusterIndex,
        buf: &mut [u8],
        offset: u64,
    ) -> Result<usize, FsError> {
        self.inner.lock().read_chain(first_cluster, buf, offset)
    }

    pub fn write_chain(
        &self,
        first_cluster: ClusterIndex,
        buf: &[u8],
        offset: u64,
    ) -> Result<usize, FsError> {
        self.inner.lock().write_chain(first_cluster, buf, offset)
    }

    pub fn allocate_new_cluster(&self, hint: ClusterIndex) -> Result<ClusterIndex, FsError> {
        self.inner.lock().allocate_new_cluster(hint)
    }

    pub fn truncate_chain(
        &self,
        first_cluster: ClusterIndex,
        keep_len: usize,
    ) -> Result<usize, FsError> {
        self.inner.lock().truncate_chain(first_cluster, keep_len)
    }

    pub fn flush(&self) -> Result<(), FsError> {
        self.inner.lock().flush()
    }
}
