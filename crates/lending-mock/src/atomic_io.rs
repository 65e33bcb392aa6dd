//! Atomic file replacement for the on-disk storage backend.
//!
//! Values are written to a hidden temporary file in the storage directory and
//! renamed over the target, so a reader never observes a partially written
//! collection.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use cap_std::fs::{Dir, OpenOptions};

use crate::error::StorageError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replaces `file_name` in `dir` with `contents`.
///
/// `file_name` must be a single path component; the storage backend checks
/// keys before calling this.
///
/// # Errors
///
/// Returns [`StorageError::Io`] if the temporary file cannot be written or
/// renamed into place.
pub(crate) fn write_atomic(dir: &Dir, file_name: &str, contents: &str) -> Result<(), StorageError> {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(
        ".{file_name}.tmp.{}.{suffix}.{counter}",
        std::process::id()
    );

    write_to_temp_file(dir, &tmp_name, file_name, contents)?;
    rename_temp_to_target(dir, &tmp_name, file_name)?;
    sync_directory(dir);

    Ok(())
}

fn io_error(key: &str, err: &io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_owned(),
        message: err.to_string(),
    }
}

fn write_to_temp_file(
    dir: &Dir,
    tmp_name: &str,
    key: &str,
    contents: &str,
) -> Result<(), StorageError> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir
        .open_with(tmp_name, &options)
        .map_err(|err| io_error(key, &err))?;

    let written = file
        .write_all(contents.as_bytes())
        .and_then(|()| file.sync_all());
    if let Err(err) = written {
        drop(file);
        drop(dir.remove_file(tmp_name));
        return Err(io_error(key, &err));
    }

    Ok(())
}

fn rename_temp_to_target(dir: &Dir, tmp_name: &str, target_name: &str) -> Result<(), StorageError> {
    if let Err(err) = rename_temp_to_target_impl(dir, tmp_name, target_name) {
        drop(dir.remove_file(tmp_name));
        return Err(io_error(target_name, &err));
    }
    Ok(())
}

#[cfg(windows)]
fn rename_temp_to_target_impl(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    // Windows rename fails if the target exists, so remove it first.
    match dir.remove_file(target_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target_name)
}

#[cfg(not(windows))]
fn rename_temp_to_target_impl(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target_name)
}

/// Best effort: not every platform can fsync a directory handle.
fn sync_directory(dir: &Dir) {
    drop(dir.open(".").and_then(|handle| handle.sync_all()));
}
