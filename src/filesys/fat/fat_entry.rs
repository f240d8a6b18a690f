//! File allocation table entries

use crate::constants::fat::*;

/// Position of a cluster in the data region. 0 means "no cluster".
pub type ClusterIndex = u32;

/// Width of the table's entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatType {
    Fat12,
    Fat16,
    Fat32,
}

impl FatType {
    pub fn mask(self) -> u32 {
        match self {
            FatType::Fat12 => FAT12_MASK,
            FatType::Fat16 => FAT16_MASK,
            FatType::Fat32 => FAT32_MASK,
        }
    }

    /// Smallest raw value that terminates a chain
    pub fn eoc_min(self) -> u32 {
        match self {
            FatType::Fat12 => FAT12_EOC_MIN,
            FatType::Fat16 => FAT16_EOC_MIN,
            FatType::Fat32 => FAT32_EOC_MIN,
        }
    }

    /// Value written when marking a cluster as end of chain
    pub fn eoc_mark(self) -> u32 {
        self.mask()
    }

    pub fn bad_mark(self) -> u32 {
        match self {
            FatType::Fat12 => FAT12_BAD,
            FatType::Fat16 => FAT16_BAD,
            FatType::Fat32 => FAT32_BAD,
        }
    }
}

/// Decoded state of one cluster's table slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatEntry {
    Free,
    Linked(ClusterIndex),
    EndOfChain,
    Bad,
}

impl FatEntry {
    pub fn from_raw(raw: u32, fat_type: FatType) -> Self {
        let value = raw & fat_type.mask();
        if value == FREE_ENTRY {
            FatEntry::Free
        } else if value >= fat_type.eoc_min() {
            FatEntry::EndOfChain
        } else if value == fat_type.bad_mark() {
            FatEntry::Bad
        } else {
            FatEntry::Linked(value)
        }
    }

    pub fn to_raw(self, fat_type: FatType) -> u32 {
        match self {
            FatEntry::Free => FREE_ENTRY,
            FatEntry::Linked(next) => next & fat_type.mask(),
            FatEntry::EndOfChain => fat_type.eoc_mark(),
            FatEntry::Bad => fat_type.bad_mark(),
        }
    }

    /// Returns true if this cluster is unused/free
    pub fn is_free(&self) -> bool {
        matches!(self, FatEntry::Free)
    }
}
