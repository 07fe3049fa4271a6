//! Trophy record model: block layout, track entries, decoding and encoding.

pub mod block;
pub mod format;
pub mod track;

pub use block::{SaveFile, TrackRecord, TrackTable, TrophyBlock};
pub use format::Category;
pub use track::{Flags, TrackEntry, TrackId};
