//! Atomic file writes.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::{Result, TocSplitError};

/// Write `bytes` to `path` atomically, creating parent directories.
///
/// Writes to a hidden temp file next to the target, syncs it to disk and
/// renames it over the target, so a crash never leaves a partial file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            TocSplitError::InvalidConfiguration(format!("not a file path: {}", path.display()))
        })?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir)?;
    }

    let temp_file = dir.join(format!(".{file_name}.tmp"));
    {
        let mut file = File::create(&temp_file)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path)?;
    }

    fs::rename(&temp_file, path)?;
    Ok(())
}
