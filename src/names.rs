//! Track identifier → display name lookup.
//!
//! Name lists are plain text, one `Display Name=HEXID` pair per line.
//! The lookup is presentational: it never changes what gets merged or
//! written, only how tracks are labelled in reports.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{PulError, Result};
use crate::trophy::track::TrackId;

/// Name reported for identifiers missing from every loaded list.
pub const UNKNOWN_TRACK: &str = "Unknown Track";

/// Mapping from uppercase hex identifier to display name.
#[derive(Debug, Clone, Default)]
pub struct TrackNames {
    by_id: HashMap<String, String>,
}

impl TrackNames {
    /// Build a table from `name=hexId` lines. Later lines override earlier ones.
    pub fn load<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = Self::default();
        names.extend_from_lines(lines);
        names
    }

    /// Read each source in order and build one table from their combined lines.
    ///
    /// Sources that cannot be read are skipped with a warning; the table is
    /// built from whatever remains (possibly nothing).
    pub fn from_sources<P: AsRef<Path>>(sources: &[P]) -> Self {
        let mut names = Self::default();
        for source in sources {
            match read_name_list(source.as_ref()) {
                Ok(lines) => names.extend_from_lines(lines),
                Err(e) => warn!(error = %e, "Skipping track name list"),
            }
        }
        debug!(count = names.len(), "Track names loaded");
        names
    }

    /// Add `name=hexId` lines to the table.
    pub fn extend_from_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            if let Some((name, key)) = parse_line(line.as_ref()) {
                self.by_id.insert(key, name);
            }
        }
    }

    /// Display name for `id`, or [`UNKNOWN_TRACK`].
    pub fn resolve(&self, id: &TrackId) -> &str {
        self.by_id
            .get(&id.to_hex())
            .map(String::as_str)
            .unwrap_or(UNKNOWN_TRACK)
    }

    /// Number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True if no names are loaded.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Read a name list file into lines.
///
/// The file is decoded as UTF-8 (a leading BOM is honoured). A file that
/// cannot be opened or is not valid text yields [`PulError::NameListUnreadable`].
pub fn read_name_list(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path).map_err(|e| PulError::NameListUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(&bytes);
    if had_errors {
        return Err(PulError::NameListUnreadable {
            path: path.to_path_buf(),
            reason: "not valid UTF-8 text".into(),
        });
    }
    Ok(text.lines().map(str::to_owned).collect())
}

/// Split a line into `(name, KEY)`. Lines without exactly one `=` or with an
/// empty side are ignored.
fn parse_line(line: &str) -> Option<(String, String)> {
    let (name, key) = line.split_once('=')?;
    if key.contains('=') {
        return None;
    }
    let (name, key) = (name.trim(), key.trim());
    if name.is_empty() || key.is_empty() {
        return None;
    }
    Some((name.to_string(), key.to_uppercase()))
}
