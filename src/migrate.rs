//! End-to-end migration: read both saves, merge, patch, write.
//!
//! The byte-level work lives in [`migrate_bytes`], which never touches the
//! filesystem. [`run`] wraps it with the existence checks, the name-list
//! loading and the final write. The output file is only created after every
//! fallible step has succeeded.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::FilesConfig;
use crate::error::PulError;
use crate::merge::{merge_completion, MergeStats};
use crate::names::TrackNames;
use crate::patch::{recompute_and_write, tally, TrophySummary};
use crate::trophy::SaveFile;

/// Locations of every file a migration touches.
#[derive(Debug, Clone)]
pub struct MigrationPaths {
    pub old_save: PathBuf,
    pub new_save: PathBuf,
    pub old_names: PathBuf,
    pub new_names: PathBuf,
    /// Shared names; skipped when absent.
    pub normal_names: Option<PathBuf>,
    pub output: PathBuf,
}

impl From<&FilesConfig> for MigrationPaths {
    fn from(files: &FilesConfig) -> Self {
        Self {
            old_save: files.old_save.clone(),
            new_save: files.new_save.clone(),
            old_names: files.old_names.clone(),
            new_names: files.new_names.clone(),
            normal_names: Some(files.normal_names.clone()),
            output: files.output.clone(),
        }
    }
}

impl MigrationPaths {
    /// Files that must exist before anything is parsed.
    pub fn required(&self) -> [&Path; 4] {
        [
            self.old_save.as_path(),
            self.new_save.as_path(),
            self.old_names.as_path(),
            self.new_names.as_path(),
        ]
    }

    /// Name sources for one version: its own list first, then the shared list.
    fn name_sources(&self, version_list: &Path) -> Vec<PathBuf> {
        let mut sources = vec![version_list.to_path_buf()];
        if let Some(normal) = &self.normal_names {
            sources.push(normal.clone());
        }
        sources
    }
}

/// Summary of a completed migration.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    /// Tally of the old save, as read.
    pub old: TrophySummary,
    /// Tally of the new save after merging.
    pub new: TrophySummary,
    pub merge: MergeStats,
    /// Size of the patched file in bytes.
    pub output_size: u64,
    /// Where the patched file went; `None` on a dry run.
    pub output: Option<PathBuf>,
}

/// Result of the in-memory migration.
#[derive(Debug, Clone)]
pub struct Migrated {
    /// New prefix followed by the patched trophy block.
    pub bytes: Vec<u8>,
    pub old: TrophySummary,
    pub new: TrophySummary,
    pub merge: MergeStats,
}

/// Migrate trophy progress between two in-memory save files.
///
/// Fails with [`PulError::MagicNotFound`] or [`PulError::BufferUnderrun`]
/// on a corrupt save; on failure nothing is produced.
pub fn migrate_bytes(
    old_bytes: &[u8],
    new_bytes: &[u8],
    old_names: &TrackNames,
    new_names: &TrackNames,
) -> crate::error::Result<Migrated> {
    let old_file = SaveFile::parse(old_bytes)?;
    let mut new_file = SaveFile::parse(new_bytes)?;

    let old_tracks = old_file.block.decode_tracks(old_names)?;
    let mut new_tracks = new_file.block.decode_tracks(new_names)?;
    debug!(
        old = old_tracks.len(),
        new = new_tracks.len(),
        "Decoded both trophy blocks"
    );

    let merge = merge_completion(&old_tracks, &mut new_tracks);
    let old = tally(&old_tracks);
    let new = recompute_and_write(&mut new_tracks, &mut new_file.block)?;

    Ok(Migrated {
        bytes: new_file.to_bytes(),
        old,
        new,
        merge,
    })
}

/// Check that every required input exists.
pub fn check_inputs(paths: &MigrationPaths) -> crate::error::Result<()> {
    let missing: Vec<PathBuf> = paths
        .required()
        .iter()
        .filter(|p| !p.exists())
        .map(|p| p.to_path_buf())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PulError::MissingInputFile(missing))
    }
}

/// Run a full migration on disk.
///
/// With `dry_run` set, everything is computed and reported but no file is
/// written.
pub fn run(paths: &MigrationPaths, dry_run: bool) -> anyhow::Result<MigrationReport> {
    check_inputs(paths)?;

    let old_bytes = read_save(&paths.old_save)?;
    let new_bytes = read_save(&paths.new_save)?;

    let old_names = TrackNames::from_sources(&paths.name_sources(&paths.old_names));
    let new_names = TrackNames::from_sources(&paths.name_sources(&paths.new_names));

    let migrated = migrate_bytes(&old_bytes, &new_bytes, &old_names, &new_names)
        .with_context(|| {
            format!(
                "Cannot migrate '{}' into '{}'",
                paths.old_save.display(),
                paths.new_save.display()
            )
        })?;

    let output = if dry_run {
        info!("Dry run, output not written");
        None
    } else {
        std::fs::write(&paths.output, &migrated.bytes)
            .map_err(|e| PulError::io(&paths.output, e))?;
        info!(
            path = %paths.output.display(),
            bytes = migrated.bytes.len(),
            "Patched save written"
        );
        Some(paths.output.clone())
    };

    Ok(MigrationReport {
        old: migrated.old,
        new: migrated.new,
        merge: migrated.merge,
        output_size: migrated.bytes.len() as u64,
        output,
    })
}

/// Read a whole save file.
pub fn read_save(path: &Path) -> crate::error::Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| PulError::io(path, e))
}
