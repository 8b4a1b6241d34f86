//! Scoped exclusive lock on the roster
//!
//! The filesystem backend takes an OS advisory lock (flock on unix,
//! LockFileEx on windows) on a sibling lock file. Acquisition polls with a
//! bounded wait; release happens on drop, so every exit path releases.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use log::{debug, warn};
use parking_lot::MutexGuard;

use crate::error::{GachaError, GachaResult};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Exclusive OS lock on a lock file, released on drop
///
/// The lock file itself is never deleted: removing it while another process
/// waits on the old inode would let two holders in at once.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Block for at most `timeout` trying to take the lock
    pub fn acquire(path: &Path, timeout: Duration) -> GachaResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let contended = fs2::lock_contended_error().raw_os_error();
        let started = Instant::now();

        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => {
                    debug!(
                        "acquired {} after {} ms",
                        path.display(),
                        started.elapsed().as_millis()
                    );
                    return Ok(Self {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if e.raw_os_error() == contended => {}
                Err(e) => return Err(e.into()),
            }

            let waited = started.elapsed();
            if waited >= timeout {
                return Err(GachaError::LockTimeout {
                    target: path.display().to_string(),
                    waited_ms: waited.as_millis() as u64,
                });
            }
            thread::sleep(POLL_INTERVAL.min(timeout - waited));
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Closing the handle releases the lock anyway; unlock explicitly so
        // the release does not depend on descriptor lifetime.
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!("failed to unlock {}: {}", self.path.display(), e);
        }
    }
}

/// Lock held by a `RosterTxn`, whatever the backend
// Variants are held only for their release-on-drop.
#[allow(dead_code)]
#[derive(Debug)]
pub enum LockGuard<'a> {
    File(FileLock),
    Memory(MutexGuard<'a, ()>),
}
