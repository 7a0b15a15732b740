//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't corrupt data on failure.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::error::TallyError;

/// Read a ledger slot, tolerating absent or damaged files
///
/// Returns `None` when the file is missing or cannot be parsed. A file that
/// reads but does not parse is moved aside to `<name>.corrupt-<timestamp>`
/// so the next save cannot overwrite the only copy.
pub fn read_slot<T, P>(path: P) -> Option<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return None;
    }

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable slot, using defaults");
            return None;
        }
    };

    match serde_json::from_reader(BufReader::new(file)) {
        Ok(data) => Some(data),
        Err(e) if e.is_io() => {
            warn!(path = %path.display(), error = %e, "unreadable slot, using defaults");
            None
        }
        Err(e) => {
            match quarantine(path) {
                Ok(moved) => warn!(
                    path = %path.display(),
                    moved_to = %moved.display(),
                    error = %e,
                    "malformed slot moved aside, using defaults"
                ),
                Err(rename) => warn!(
                    path = %path.display(),
                    error = %e,
                    rename_error = %rename,
                    "malformed slot could not be moved aside, using defaults"
                ),
            }
            None
        }
    }
}

/// Rename a damaged slot next to itself with a timestamped suffix
fn quarantine(path: &Path) -> std::io::Result<PathBuf> {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".corrupt-{}", Utc::now().format("%Y%m%d%H%M%S")));
    let target = path.with_file_name(name);
    fs::rename(path, &target)?;
    Ok(target)
}

/// Write JSON to a file atomically (write to temp, then rename)
///
/// The file is either completely written or not modified at all.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), TallyError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            TallyError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays atomic
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| TallyError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| TallyError::Storage(format!("Failed to serialize data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| TallyError::Storage(format!("Failed to flush data: {}", e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| TallyError::Storage(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        TallyError::Storage(format!(
            "Failed to replace {}: {}",
            path.display(),
            e
        ))
    })?;

    Ok(())
}
