//! Roster Store - load and atomic commit of the roster
//!
//! Mutations go through `RosterStore::lock`, which returns a `RosterTxn`
//! holding the exclusive lock for the whole read-modify-write. The txn is
//! the only way to commit, and dropping it releases the lock on every exit
//! path, errors included.

use std::time::Duration;

use log::debug;

use crate::config::Paths;
use crate::error::{GachaError, GachaResult};
use crate::types::Roster;

use super::backend::{FsBackend, MemoryBackend, RosterBackend};
use super::lock::LockGuard;

/// Lock timeout used by `RosterStore::in_memory`
const MEMORY_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Owner of the canonical roster state
pub struct RosterStore {
    backend: Box<dyn RosterBackend>,
    lock_timeout: Duration,
}

impl RosterStore {
    /// Store over an arbitrary backend
    pub fn new(backend: impl RosterBackend + 'static, lock_timeout: Duration) -> Self {
        Self {
            backend: Box::new(backend),
            lock_timeout,
        }
    }

    /// Store over `data/current.json` under the given layout
    pub fn open(paths: &Paths, lock_timeout: Duration) -> Self {
        Self::new(FsBackend::from_paths(paths), lock_timeout)
    }

    /// Empty store held in memory
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new(), MEMORY_LOCK_TIMEOUT)
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// Read the roster without taking the lock
    ///
    /// Safe for display: commits replace the file atomically, so this never
    /// observes a torn write. Use `lock` for anything that writes back.
    pub fn load(&self) -> GachaResult<Roster> {
        let raw = self.backend.read()?;
        self.decode(raw.as_deref())
    }

    /// Take the exclusive lock for one read-modify-write
    pub fn lock(&self) -> GachaResult<RosterTxn<'_>> {
        let guard = self.backend.lock(self.lock_timeout)?;

        match self.backend.sweep_orphans() {
            Ok(0) => {}
            Ok(n) => debug!("removed {} orphaned temp file(s) near {}", n, self.location()),
            Err(e) => debug!("temp file sweep skipped: {}", e),
        }

        Ok(RosterTxn {
            store: self,
            _guard: guard,
        })
    }

    fn decode(&self, raw: Option<&[u8]>) -> GachaResult<Roster> {
        match raw {
            None => Ok(Roster::new()),
            Some(bytes) => Roster::from_json_slice(bytes)
                .map_err(|e| GachaError::corrupt(self.location(), e)),
        }
    }
}

/// Exclusive access to the roster, released on drop
pub struct RosterTxn<'a> {
    store: &'a RosterStore,
    _guard: LockGuard<'a>,
}

impl RosterTxn<'_> {
    /// Exact bytes currently persisted, `None` if no roster exists yet
    pub fn read_raw(&self) -> GachaResult<Option<Vec<u8>>> {
        Ok(self.store.backend.read()?)
    }

    /// Current roster; empty if absent, `CorruptState` if unreadable
    pub fn load(&self) -> GachaResult<Roster> {
        let raw = self.read_raw()?;
        self.store.decode(raw.as_deref())
    }

    /// Parse bytes previously returned by `read_raw`
    pub fn decode(&self, raw: Option<&[u8]>) -> GachaResult<Roster> {
        self.store.decode(raw)
    }

    /// Durably replace the persisted roster
    ///
    /// Either the whole new content lands or the previous file stays.
    pub fn commit(&self, roster: &Roster) -> GachaResult<()> {
        let bytes = roster.to_json_bytes()?;
        self.store.backend.replace(&bytes)?;
        debug!(
            "committed {} player(s) to {}",
            roster.len(),
            self.store.location()
        );
        Ok(())
    }
}
