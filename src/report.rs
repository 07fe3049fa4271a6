//! Human-readable rendering of trophy summaries.

use std::fmt::Write;

use crate::patch::TrophySummary;

/// Render the per-category track lists followed by the trophy totals.
///
/// `label` names the file version ("Old", "New", a file name, ...).
pub fn render_text(label: &str, summary: &TrophySummary) -> String {
    let mut out = String::new();

    for tally in &summary.categories {
        let _ = writeln!(out, "{label}: Tracks completed for {}:", tally.label);
        for track in &tally.tracks {
            let _ = writeln!(out, "- {}", track.name);
        }
        out.push('\n');
    }

    out.push_str("Trophy totals:\n");
    for tally in &summary.categories {
        let _ = writeln!(out, "{}: {}", tally.label, tally.count);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::TrackNames;
    use crate::patch::tally;
    use crate::trophy::format::MAGIC;
    use crate::trophy::TrophyBlock;

    #[test]
    fn test_render_text_layout() {
        let mut b = Vec::new();
        b.extend_from_slice(MAGIC);
        b.extend_from_slice(&1u32.to_be_bytes());
        b.extend_from_slice(&36u32.to_be_bytes());
        b.extend_from_slice(&[0u8; 8]);
        b.extend_from_slice(&[1, 2, 3, 4, 1, 0, 0, 1]);
        b.extend_from_slice(&[5, 6, 7, 8, 1, 0, 0, 0]);
        let names = TrackNames::load(["Luigi Circuit=01020304"]);
        let table = TrophyBlock::new(b).decode_tracks(&names).unwrap();

        let text = render_text("New", &tally(&table));
        let expected = "\
New: Tracks completed for 150cc:
- Luigi Circuit
- Unknown Track

New: Tracks completed for 150cc Feather:

New: Tracks completed for 200cc:

New: Tracks completed for 200cc Feather:
- Luigi Circuit

Trophy totals:
150cc: 2
150cc Feather: 0
200cc: 0
200cc Feather: 1
";
        assert_eq!(text, expected);
    }
}
