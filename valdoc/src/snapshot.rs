//! JSON snapshots of detail lists and section states
//!
//! The builder can export what it holds in memory so that a change set can be
//! inspected (or recomputed) outside the browser.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::detail::DetailRecord;
use crate::section_state::SectionStates;

/// Errors that can occur when reading or writing snapshots
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Error reading or writing the snapshot file
    #[error("IO error on {}: {}", .0.display(), .1)]
    IoError(PathBuf, #[source] std::io::Error),

    /// The file is not valid JSON of the expected shape
    #[error("Invalid snapshot {}: {}", .0.display(), .1)]
    JsonError(PathBuf, #[source] serde_json::Error),
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SnapshotError> {
    let content =
        fs::read_to_string(path).map_err(|e| SnapshotError::IoError(path.to_path_buf(), e))?;
    serde_json::from_str(&content).map_err(|e| SnapshotError::JsonError(path.to_path_buf(), e))
}

/// Read a JSON array of detail records
pub fn read_details(path: &Path) -> Result<Vec<DetailRecord>, SnapshotError> {
    read_json(path)
}

/// Read a JSON object mapping section ids to section states
pub fn read_sections(path: &Path) -> Result<SectionStates, SnapshotError> {
    let sections: SectionStates = read_json(path)?;
    log::debug!(
        "Read {} sections from {}",
        sections.len(),
        path.display()
    );
    Ok(sections)
}

/// Write any serializable value as pretty-printed JSON
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SnapshotError> {
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| SnapshotError::JsonError(path.to_path_buf(), e))?;
    fs::write(path, content).map_err(|e| SnapshotError::IoError(path.to_path_buf(), e))
}
