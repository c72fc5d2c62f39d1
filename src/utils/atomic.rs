//! Atomic file operations
//!
//! Full rewrites of the data file go through a sibling temp file:
//!
//! 1. Write to `<name>.tmp`
//! 2. Call sync_all() to flush to disk
//! 3. Rename temp file to final path (atomic on most filesystems)
//!
//! A crash leaves either the old version or the new one, never a torn file.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Result type for atomic operations
pub type AtomicResult<T> = Result<T, AtomicError>;

/// Errors that can occur during atomic operations
#[derive(Debug, thiserror::Error)]
pub enum AtomicError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Not a file path: {0}")]
    NotAFile(String),
}

/// Path of the temp file used while rewriting `path`
///
/// `data/.eventstore` becomes `data/.eventstore.tmp`.
pub fn temp_path_for(path: &Path) -> AtomicResult<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| AtomicError::NotAFile(path.display().to_string()))?;

    let mut temp_name = OsString::from(file_name);
    temp_name.push(".tmp");
    Ok(path.with_file_name(temp_name))
}

/// Atomically replace the file at `path` with what `write_fn` produces
///
/// The writer handed to `write_fn` is buffered; it is flushed and synced
/// before the rename.
///
/// # Example
///
/// ```ignore
/// atomic_write_with(".eventstore", |out| {
///     writeln!(out, "2024-03-01T10:00:00Z,com.example.type,data")?;
///     Ok(())
/// })?;
/// ```
pub fn atomic_write_with<P, F>(path: P, write_fn: F) -> AtomicResult<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let path = path.as_ref();
    let temp_path = temp_path_for(path)?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(&temp_path)?);
    if let Err(e) = write_fn(&mut writer) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Remove a temp file left behind by an interrupted rewrite of `path`
///
/// Returns whether a leftover was found.
pub fn cleanup_temp_file<P: AsRef<Path>>(path: P) -> AtomicResult<bool> {
    let temp_path = temp_path_for(path.as_ref())?;

    match fs::remove_file(&temp_path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
