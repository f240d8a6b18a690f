//! Filesystem-wide constants.

pub mod fat;

/// Sector size assumed by the in-memory fixtures and most real media.
pub const SECTOR_SIZE: usize = 512;
