//! FAT numbering and entry sentinels

/// First addressable data cluster; 0 and 1 are reserved table slots.
pub const FIRST_DATA_CLUSTER: u32 = 2;

/// Value of a free entry in every FAT width
pub const FREE_ENTRY: u32 = 0;

pub const FAT12_MASK: u32 = 0x0000_0FFF;
pub const FAT16_MASK: u32 = 0x0000_FFFF;
/// FAT32 entries are 28 bits wide; the top nibble is reserved.
pub const FAT32_MASK: u32 = 0x0FFF_FFFF;

pub const FAT12_EOC_MIN: u32 = 0x0FF8;
pub const FAT16_EOC_MIN: u32 = 0xFFF8;
pub const FAT32_EOC_MIN: u32 = 0x0FFF_FFF8;

pub const FAT12_BAD: u32 = 0x0FF7;
pub const FAT16_BAD: u32 = 0xFFF7;
pub const FAT32_BAD: u32 = 0x0FFF_FFF7;

/// Media descriptor for fixed disks, stored in the low byte of entry 0
pub const MEDIA_FIXED_DISK: u8 = 0xF8;

/// Sectors kept resident by a default-sized sector cache
pub const DEFAULT_CACHE_LINES: usize = 8;
