//! Carry completion flags from an old track table onto a new one.

use serde::Serialize;
use tracing::debug;

use crate::trophy::TrackTable;

/// Statistics returned by a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Old entries whose flags were copied onto a new entry.
    pub carried: usize,
    /// Old entries with progress but no matching identifier in the new table.
    pub dropped: usize,
    /// Old entries with all-zero flags, which never overwrite anything.
    pub skipped_empty: usize,
}

/// Copy completion state from `old` onto `new`, matching by identifier.
///
/// For each old entry with at least one non-zero flag, the first new entry
/// with the same identifier has its flags replaced verbatim. The copy is a
/// full overwrite, not a union. New entries without an old counterpart keep
/// their flags.
pub fn merge_completion(old: &TrackTable, new: &mut TrackTable) -> MergeStats {
    let mut stats = MergeStats::default();

    for old_entry in old.entries() {
        if !old_entry.has_completion() {
            stats.skipped_empty += 1;
            continue;
        }
        match new.find_mut(&old_entry.id) {
            Some(new_entry) => {
                new_entry.flags = old_entry.flags;
                stats.carried += 1;
            }
            None => {
                debug!(
                    id = %old_entry.id,
                    name = %old_entry.name,
                    "Track missing from new file, dropping its progress"
                );
                stats.dropped += 1;
            }
        }
    }

    stats
}
