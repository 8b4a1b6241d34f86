//! Storage backends for the roster

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::Paths;
use crate::error::{GachaError, GachaResult};
use crate::utils::{atomic_write, cleanup_temp_files};

use super::lock::{FileLock, LockGuard};

/// Where the roster bytes live and how writers are serialized
pub trait RosterBackend: Send + Sync {
    /// Human-readable location, used in error messages
    fn location(&self) -> String;

    /// Current content, `None` if nothing was ever committed
    fn read(&self) -> io::Result<Option<Vec<u8>>>;

    /// Replace the content in one atomic step
    fn replace(&self, content: &[u8]) -> io::Result<()>;

    /// Take the exclusive lock, waiting at most `timeout`
    fn lock(&self, timeout: Duration) -> GachaResult<LockGuard<'_>>;

    /// Remove leftovers of interrupted writes; call only under the lock
    fn sweep_orphans(&self) -> io::Result<usize> {
        Ok(0)
    }
}

impl<T: RosterBackend + ?Sized> RosterBackend for Arc<T> {
    fn location(&self) -> String {
        (**self).location()
    }

    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        (**self).read()
    }

    fn replace(&self, content: &[u8]) -> io::Result<()> {
        (**self).replace(content)
    }

    fn lock(&self, timeout: Duration) -> GachaResult<LockGuard<'_>> {
        (**self).lock(timeout)
    }

    fn sweep_orphans(&self) -> io::Result<usize> {
        (**self).sweep_orphans()
    }
}

/// Roster file on disk, replaced via temp file + rename
#[derive(Debug, Clone)]
pub struct FsBackend {
    roster_path: PathBuf,
    lock_path: PathBuf,
}

impl FsBackend {
    pub fn new(roster_path: PathBuf, lock_path: PathBuf) -> Self {
        Self {
            roster_path,
            lock_path,
        }
    }

    pub fn from_paths(paths: &Paths) -> Self {
        Self::new(paths.roster_path(), paths.lock_path())
    }

    pub fn roster_path(&self) -> &Path {
        &self.roster_path
    }
}

impl RosterBackend for FsBackend {
    fn location(&self) -> String {
        self.roster_path.display().to_string()
    }

    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match std::fs::read(&self.roster_path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn replace(&self, content: &[u8]) -> io::Result<()> {
        atomic_write(&self.roster_path, content)
    }

    fn lock(&self, timeout: Duration) -> GachaResult<LockGuard<'_>> {
        FileLock::acquire(&self.lock_path, timeout).map(LockGuard::File)
    }

    fn sweep_orphans(&self) -> io::Result<usize> {
        match self.roster_path.parent() {
            Some(dir) => cleanup_temp_files(dir),
            None => Ok(0),
        }
    }
}

/// Roster held in memory, for tests
///
/// `set_fail_writes(true)` makes every `replace` fail without changing the
/// content, mimicking a disk error before the rename.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    content: Mutex<Option<Vec<u8>>>,
    gate: Mutex<()>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: Mutex::new(Some(content.into())),
            ..Self::default()
        }
    }

    pub fn content(&self) -> Option<Vec<u8>> {
        self.content.lock().clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl RosterBackend for MemoryBackend {
    fn location(&self) -> String {
        "<memory>".to_string()
    }

    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.content.lock().clone())
    }

    fn replace(&self, content: &[u8]) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::other("injected write failure"));
        }
        *self.content.lock() = Some(content.to_vec());
        Ok(())
    }

    fn lock(&self, timeout: Duration) -> GachaResult<LockGuard<'_>> {
        self.gate
            .try_lock_for(timeout)
            .map(LockGuard::Memory)
            .ok_or_else(|| GachaError::LockTimeout {
                target: self.location(),
                waited_ms: timeout.as_millis() as u64,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fs_backend_absent_file_reads_none() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FsBackend::from_paths(&Paths::new(temp_dir.path()));

        assert!(backend.read().unwrap().is_none());
    }

    #[test]
    fn test_fs_backend_replace_and_sweep() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::new(temp_dir.path());
        let backend = FsBackend::from_paths(&paths);

        backend.replace(b"{\"users\":[]}").unwrap();
        assert_eq!(backend.read().unwrap().unwrap(), b"{\"users\":[]}");

        fs::write(paths.data_dir().join(".current.json.tmp"), "orphan").unwrap();
        assert_eq!(backend.sweep_orphans().unwrap(), 1);
        assert!(paths.roster_path().exists());
    }

    #[test]
    fn test_memory_backend_injected_failure() {
        let backend = MemoryBackend::with_content("old");
        backend.set_fail_writes(true);

        assert!(backend.replace(b"new").is_err());
        assert_eq!(backend.content().unwrap(), b"old");
    }

    #[test]
    fn test_memory_backend_lock_times_out_while_held() {
        let backend = MemoryBackend::new();
        let _held = backend.lock(Duration::from_millis(10)).unwrap();

        let err = backend.lock(Duration::from_millis(20)).unwrap_err();
        assert!(matches!(err, GachaError::LockTimeout { .. }));
    }
}
