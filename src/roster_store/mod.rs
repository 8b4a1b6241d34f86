//! Roster Store module
//!
//! - `RosterStore`: load and atomic commit of the roster
//! - `RosterTxn`: scoped exclusive access for one read-modify-write
//! - `RosterBackend`: injected storage (`FsBackend`, `MemoryBackend`)
//!
//! # Write path
//!
//! ```text
//! lock() ──► load() ──► stat engine ──► commit() ──► drop(txn)
//!  flock     current.json              .current.json.tmp
//!  (bounded)                            + rename
//! ```

mod backend;
mod lock;
mod store;

pub use backend::{FsBackend, MemoryBackend, RosterBackend};
pub use lock::{FileLock, LockGuard};
pub use store::{RosterStore, RosterTxn};
