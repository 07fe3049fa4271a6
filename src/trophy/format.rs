//! Trophy block layout.
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ HEADER (20 bytes, big-endian)        │
//! │  magic: [u8; 4] = b"TROP"            │  0
//! │  version: u32                        │  4
//! │  total_size: u32                     │  8
//! │  150cc mushroom count: u16           │ 12
//! │  150cc feather count: u16            │ 14
//! │  200cc mushroom count: u16           │ 16
//! │  200cc feather count: u16            │ 18
//! ├──────────────────────────────────────┤
//! │ TRACK ENTRIES (8 bytes each)         │ 20
//! │  id: [u8; 4]                         │
//! │  flags: [u8; 4]                      │
//! │  ... until magic + total_size        │
//! └──────────────────────────────────────┘
//! ```

use serde::Serialize;

/// Magic bytes opening the trophy block.
pub const MAGIC: &[u8; 4] = b"TROP";

/// Offset of the magic inside the block. The block starts at the magic.
pub const MAGIC_OFFSET: usize = 0;

/// Offset of the format version field.
pub const VERSION_OFFSET: usize = MAGIC_OFFSET + 4;

/// Offset of the total-size field.
pub const SIZE_OFFSET: usize = VERSION_OFFSET + 4;

/// Offset of the first track entry.
pub const TRACK_DATA_OFFSET: usize = SIZE_OFFSET + 4 + Category::ALL.len() * 2;

/// Size of one track entry in bytes.
pub const TRACK_ENTRY_SIZE: usize = 8;

/// Size of the identifier at the start of a track entry.
pub const TRACK_ID_LEN: usize = 4;

/// Number of completion flags per entry.
pub const FLAG_COUNT: usize = 4;

/// Byte offset of the entry at decode position `index`.
pub fn entry_offset(index: usize) -> usize {
    TRACK_DATA_OFFSET + index * TRACK_ENTRY_SIZE
}

/// Byte offset of the flags inside an entry starting at `entry_offset`.
pub fn flags_offset(entry_offset: usize) -> usize {
    entry_offset + TRACK_ID_LEN
}

/// One cup tier × cup type completion dimension.
///
/// The discriminant is the position of the flag inside a track entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// 150cc, mushroom cup.
    NormalMushroom = 0,
    /// 150cc, feather cup.
    NormalFeather = 1,
    /// 200cc, mushroom cup.
    FastMushroom = 2,
    /// 200cc, feather cup.
    FastFeather = 3,
}

impl Category {
    /// All categories in flag order.
    pub const ALL: [Category; FLAG_COUNT] = [
        Category::NormalMushroom,
        Category::NormalFeather,
        Category::FastMushroom,
        Category::FastFeather,
    ];

    /// Position of this category's flag inside a track entry.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Offset of this category's `u16` counter in the header.
    pub fn counter_offset(self) -> usize {
        SIZE_OFFSET + 4 + self.index() * 2
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Category::NormalMushroom => "150cc",
            Category::NormalFeather => "150cc Feather",
            Category::FastMushroom => "200cc",
            Category::FastFeather => "200cc Feather",
        }
    }
}
