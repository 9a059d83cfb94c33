//! Utility functions for error handling
//!
//! File helpers that attach the offending path to IO failures.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};

/// Open a file, reporting the path and the purpose on failure
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.is_file() {
        return Err(Error::io(
            path,
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found (needed for: {purpose})"),
            ),
        ));
    }

    fs::File::open(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => "permission denied".to_string(),
            _ => format!("failed to open file for: {purpose}"),
        };
        Error::io(path, io::Error::new(e.kind(), format!("{context}: {e}")))
    })
}

/// Read a whole file into memory
pub fn safe_read(path: &Path, purpose: &str) -> Result<Vec<u8>> {
    let mut file = safe_open_file(path, purpose)?;
    let mut content = Vec::new();
    io::Read::read_to_end(&mut file, &mut content).map_err(|e| Error::io(path, e))?;
    Ok(content)
}

/// Create a directory (and its parents) if it does not exist yet
pub fn ensure_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}

/// Remove every file of a directory, keeping the directory itself
pub fn clear_directory(path: &Path) -> Result<usize> {
    ensure_directory(path)?;
    let mut removed = 0;
    for entry in fs::read_dir(path).map_err(|e| Error::io(path, e))? {
        let entry = entry.map_err(|e| Error::io(path, e))?;
        let entry_path = entry.path();
        if entry_path.is_file() {
            fs::remove_file(&entry_path).map_err(|e| Error::io(&entry_path, e))?;
            removed += 1;
        }
    }
    Ok(removed)
}
