//! Atomic file operations
//!
//! Every file this crate owns is replaced with the same pattern:
//!
//! 1. Write to a hidden sibling temp file (`.<name>.tmp`)
//! 2. Call sync_all() to flush to disk
//! 3. Rename temp file over the final path (atomic on the same filesystem)
//!
//! Readers see either the old file or the new one, never a partial write.
//! A failure before the rename leaves the temp file behind and the target
//! untouched; `cleanup_temp_files` sweeps such leftovers.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const TEMP_SUFFIX: &str = ".tmp";

/// Path of the temp sibling used while replacing `path`
pub fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}{}", name, TEMP_SUFFIX))
}

/// Atomically write bytes to a file
///
/// # Example
///
/// ```ignore
/// atomic_write("data/current.json", br#"{"users":[]}"#)?;
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> io::Result<()> {
    atomic_write_with(path, |file| file.write_all(content))
}

/// Atomically write content using a writer function
pub fn atomic_write_with<P, F>(path: P, write_fn: F) -> io::Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let path = path.as_ref();
    let temp_path = temp_path_for(path);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(&temp_path)?;
    write_fn(&mut file)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)?;
    sync_parent_dir(path);

    Ok(())
}

/// Best-effort fsync of the directory holding `path`, so the rename itself
/// survives a crash.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    if let Some(parent) = path.parent() {
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}

/// Append raw bytes to a file, creating it if needed
pub fn append_bytes<P: AsRef<Path>>(path: P, content: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(content)?;
    file.flush()
}

/// Move `from` to `to`, replacing whatever was at `to`
///
/// # Returns
///
/// * `Ok(true)` - File was moved
/// * `Ok(false)` - Source file doesn't exist
pub fn rotate_file<P1, P2>(from: P1, to: P2) -> io::Result<bool>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    let from = from.as_ref();
    let to = to.as_ref();

    if !from.exists() {
        return Ok(false);
    }

    // rename() does not replace an existing target on every platform
    if to.exists() {
        fs::remove_file(to)?;
    }
    fs::rename(from, to)?;

    Ok(true)
}

/// Remove `.<name>.tmp` files left behind by interrupted writes
///
/// Only call this while holding the roster lock, otherwise a concurrent
/// writer's in-flight temp file could be removed.
pub fn cleanup_temp_files<P: AsRef<Path>>(dir: P) -> io::Result<usize> {
    let dir = dir.as_ref();
    let mut cleaned = 0;

    if !dir.exists() {
        return Ok(0);
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if name.starts_with('.') && name.ends_with(TEMP_SUFFIX) && entry.file_type()?.is_file() {
            fs::remove_file(entry.path())?;
            cleaned += 1;
        }
    }

    Ok(cleaned)
}
