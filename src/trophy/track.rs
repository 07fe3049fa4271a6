//! Track identifiers and decoded track entries.

use std::fmt;

use serde::{Serialize, Serializer};

use super::format::{Category, FLAG_COUNT, TRACK_ID_LEN};

/// Raw 4-byte track identifier.
///
/// Compared as bytes; displayed as uppercase hex without separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub [u8; TRACK_ID_LEN]);

impl TrackId {
    /// Uppercase hex form used as the name-lookup key.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02X}")).collect()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

impl Serialize for TrackId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Completion flags in entry order.
pub type Flags = [u8; FLAG_COUNT];

/// One decoded track entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackEntry {
    /// Identifier; never mutated after decoding.
    pub id: TrackId,
    /// Display name resolved at decode time (presentation only).
    pub name: String,
    /// Completion flags, one byte per [`Category`].
    pub flags: Flags,
}

impl TrackEntry {
    /// True if any flag byte is non-zero.
    pub fn has_completion(&self) -> bool {
        self.flags.iter().any(|&b| b != 0)
    }

    /// True if the flag for `category` is exactly 1.
    pub fn is_complete(&self, category: Category) -> bool {
        self.flags[category.index()] == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_id_hex_is_uppercase_without_separators() {
        let id = TrackId([0xab, 0x0c, 0x12, 0xff]);
        assert_eq!(id.to_hex(), "AB0C12FF");
        assert_eq!(id.to_string(), "AB0C12FF");
    }

    #[test]
    fn test_completion_checks() {
        let mut entry = TrackEntry {
            id: TrackId([1, 2, 3, 4]),
            name: "Luigi Circuit".into(),
            flags: [0, 0, 0, 0],
        };
        assert!(!entry.has_completion());

        entry.flags = [0, 0, 2, 0];
        assert!(entry.has_completion());
        assert!(!entry.is_complete(Category::FastMushroom));

        entry.flags = [0, 1, 0, 0];
        assert!(entry.is_complete(Category::NormalFeather));
        assert!(!entry.is_complete(Category::NormalMushroom));
    }
}
