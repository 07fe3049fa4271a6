//! Counter recomputation and flag write-back.

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::trophy::{Category, Flags, TrackId, TrackTable, TrophyBlock};

/// A track counted as complete in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedTrack {
    /// Offset of the entry inside its trophy block.
    #[serde(skip)]
    pub offset: usize,
    pub id: TrackId,
    pub name: String,
}

/// Completion tally for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTally {
    pub category: Category,
    pub label: &'static str,
    pub count: u16,
    pub tracks: Vec<CompletedTrack>,
}

impl CategoryTally {
    fn contains(&self, offset: usize) -> bool {
        self.tracks.iter().any(|t| t.offset == offset)
    }
}

/// Per-category completion summary of one track table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrophySummary {
    pub categories: Vec<CategoryTally>,
}

impl TrophySummary {
    /// Tally for `category`.
    pub fn tally(&self, category: Category) -> &CategoryTally {
        &self.categories[category.index()]
    }

    /// Counter value for `category`.
    pub fn count(&self, category: Category) -> u16 {
        self.tally(category).count
    }

    /// Flags implied by category membership for the entry at `offset`.
    pub fn flags_for(&self, offset: usize) -> Flags {
        let mut flags = [0u8; 4];
        for tally in &self.categories {
            if tally.contains(offset) {
                flags[tally.category.index()] = 1;
            }
        }
        flags
    }
}

/// Count completions per category without touching any buffer.
///
/// Each category scans the full table; only a flag byte equal to 1 counts.
pub fn tally(table: &TrackTable) -> TrophySummary {
    let categories = Category::ALL
        .iter()
        .map(|&category| {
            let tracks: Vec<CompletedTrack> = table
                .records()
                .iter()
                .filter(|r| r.entry.is_complete(category))
                .map(|r| CompletedTrack {
                    offset: r.offset(),
                    id: r.entry.id,
                    name: r.entry.name.clone(),
                })
                .collect();
            CategoryTally {
                category,
                label: category.label(),
                count: u16::try_from(tracks.len()).unwrap_or(u16::MAX),
                tracks,
            }
        })
        .collect();
    TrophySummary { categories }
}

/// Recompute every entry's flags and the header counters, then write them into `block`.
///
/// Flags are rebuilt from category membership, so any flag byte other than
/// 0 or 1 is written back as 0. Membership is keyed by the record's offset,
/// never by display name, so unnamed or same-named tracks stay distinct.
/// Each record is written at its own offset. `table` must have been decoded
/// from `block`.
pub fn recompute_and_write(
    table: &mut TrackTable,
    block: &mut TrophyBlock,
) -> Result<TrophySummary> {
    let summary = tally(table);

    let mut normalized = 0usize;
    for record in table.records_mut() {
        let flags = summary.flags_for(record.offset());
        if flags != record.entry.flags {
            normalized += 1;
        }
        record.entry.flags = flags;
        block.write_flags_at(record.offset(), &flags)?;
    }

    for tally in &summary.categories {
        block.write_counter(tally.category, tally.count)?;
    }

    debug!(
        entries = table.len(),
        normalized = normalized,
        "Wrote track flags and trophy counters"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::TrackNames;
    use crate::trophy::format::MAGIC;

    fn block(entries: &[([u8; 4], [u8; 4])]) -> TrophyBlock {
        let mut b = Vec::new();
        b.extend_from_slice(MAGIC);
        b.extend_from_slice(&1u32.to_be_bytes());
        b.extend_from_slice(&((20 + entries.len() * 8) as u32).to_be_bytes());
        // Stale counters that must be overwritten.
        b.extend_from_slice(&[0xEE; 8]);
        for (id, flags) in entries {
            b.extend_from_slice(id);
            b.extend_from_slice(flags);
        }
        TrophyBlock::new(b)
    }

    fn names() -> TrackNames {
        TrackNames::load(["Luigi Circuit=01010101", "Moo Moo Meadows=02020202"])
    }

    #[test]
    fn test_tally_counts_and_names() {
        let b = block(&[([1; 4], [1, 1, 0, 0]), ([2; 4], [1, 0, 0, 1]), ([3; 4], [0; 4])]);
        let table = b.decode_tracks(&names()).unwrap();
        let summary = tally(&table);

        assert_eq!(summary.count(Category::NormalMushroom), 2);
        assert_eq!(summary.count(Category::NormalFeather), 1);
        assert_eq!(summary.count(Category::FastMushroom), 0);
        assert_eq!(summary.count(Category::FastFeather), 1);

        let names: Vec<&str> = summary
            .tally(Category::NormalMushroom)
            .tracks
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["Luigi Circuit", "Moo Moo Meadows"]);
        assert_eq!(
            summary.tally(Category::FastFeather).tracks[0].name,
            "Moo Moo Meadows"
        );
    }

    #[test]
    fn test_counters_match_flags_after_write() {
        let mut b = block(&[([1; 4], [1, 0, 1, 0]), ([2; 4], [0, 1, 1, 0]), ([3; 4], [1, 1, 1, 1])]);
        let mut table = b.decode_tracks(&names()).unwrap();
        recompute_and_write(&mut table, &mut b).unwrap();

        let reread = b.decode_tracks(&names()).unwrap();
        for category in Category::ALL {
            let expected = reread.entries().filter(|e| e.flags[category.index()] == 1).count();
            assert_eq!(b.counter(category).unwrap() as usize, expected);
        }
        assert_eq!(b.counter(Category::FastMushroom).unwrap(), 3);
        assert_eq!(b.counter(Category::FastFeather).unwrap(), 1);
    }

    #[test]
    fn test_write_back_is_identity_for_clean_flags() {
        let mut b = block(&[([1; 4], [1, 0, 1, 0]), ([2; 4], [0, 0, 0, 1])]);
        let before = b.as_bytes()[20..].to_vec();
        let mut table = b.decode_tracks(&names()).unwrap();
        recompute_and_write(&mut table, &mut b).unwrap();
        assert_eq!(&b.as_bytes()[20..], &before[..]);
    }

    #[test]
    fn test_non_binary_flags_normalized_to_zero() {
        let mut b = block(&[([1; 4], [2, 1, 0, 0xFF])]);
        let mut table = b.decode_tracks(&names()).unwrap();
        let summary = recompute_and_write(&mut table, &mut b).unwrap();

        assert_eq!(&b.as_bytes()[24..28], &[0, 1, 0, 0]);
        assert_eq!(summary.count(Category::NormalMushroom), 0);
        assert_eq!(table.records()[0].entry.flags, [0, 1, 0, 0]);
    }

    #[test]
    fn test_shared_display_name_does_not_conflate_tracks() {
        // Both ids are unnamed and resolve to the same placeholder.
        let mut b = block(&[([7; 4], [1, 0, 0, 0]), ([8; 4], [0, 0, 0, 0])]);
        let mut table = b.decode_tracks(&TrackNames::default()).unwrap();
        recompute_and_write(&mut table, &mut b).unwrap();

        assert_eq!(&b.as_bytes()[24..28], &[1, 0, 0, 0]);
        assert_eq!(&b.as_bytes()[32..36], &[0, 0, 0, 0]);
        assert_eq!(b.counter(Category::NormalMushroom).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_ids_keep_their_own_flags() {
        let mut b = block(&[([1; 4], [1, 0, 0, 0]), ([1; 4], [0, 1, 0, 0])]);
        let mut table = b.decode_tracks(&names()).unwrap();
        recompute_and_write(&mut table, &mut b).unwrap();

        assert_eq!(&b.as_bytes()[24..28], &[1, 0, 0, 0]);
        assert_eq!(&b.as_bytes()[32..36], &[0, 1, 0, 0]);
        assert_eq!(b.counter(Category::NormalMushroom).unwrap(), 1);
        assert_eq!(b.counter(Category::NormalFeather).unwrap(), 1);
    }

    #[test]
    fn test_writes_follow_record_offsets() {
        let mut b = block(&[([1; 4], [0; 4]), ([2; 4], [0; 4])]);
        let mut table = b.decode_tracks(&names()).unwrap();
        table.find_mut(&TrackId([2; 4])).unwrap().flags = [0, 0, 0, 1];
        recompute_and_write(&mut table, &mut b).unwrap();

        assert_eq!(&b.as_bytes()[24..28], &[0, 0, 0, 0]);
        assert_eq!(&b.as_bytes()[32..36], &[0, 0, 0, 1]);
    }

    #[test]
    fn test_counters_on_truncated_header_fail() {
        // A header too short to hold the counters cannot be patched.
        let mut short = TrophyBlock::new(b"TROP\x00\x00\x00\x01\x00\x00\x00\x0C\x00\x00".to_vec());
        let mut table = short.decode_tracks(&names()).unwrap();
        assert!(recompute_and_write(&mut table, &mut short).is_err());
    }
}
