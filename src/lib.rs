//! `pul-migrate` — carry trophy progress between `Settings.pul` save versions.
//!
//! This crate locates the `TROP` trophy block inside a save file, decodes its
//! fixed-size track entries, copies completion flags from an old save onto the
//! matching tracks of a new one, and writes the new save back with its cup
//! counters recomputed.

pub mod buffer;
pub mod config;
pub mod error;
pub mod i18n;
pub mod merge;
pub mod migrate;
pub mod names;
pub mod patch;
pub mod report;
pub mod trophy;
