//! Gacha Tally
//!
//! A durable play-result ledger for a gacha event. Each draw is recorded
//! against a player; per-player counters and reward flags are kept in one
//! JSON roster file, mirrored into a browser-loadable `data.js`.
//!
//! # Features
//!
//! - **Atomic commits**: temp file + fsync + rename, never a torn roster
//! - **Cross-process locking**: bounded-wait file lock around every mutation
//! - **Backups**: verbatim copy before every reset or restore
//! - **History**: one JSON event document and one log line per command
//!
//! # Modules
//!
//! - `types`: Core data structures (PlayerRecord, Roster, CommandEvent)
//! - `roster_store`: Locked load/commit over pluggable backends
//! - `stat_engine`: Pure result-to-roster transitions
//! - `backup`: Timestamped backups, script wrappers and index
//! - `snapshot`: `data.js` generation
//! - `recorder`: Event documents and rolling app.log
//! - `service`: One method per command
//! - `config`: Directory layout and `setting.json`
//! - `validation`: Player name rules
//! - `utils`: Atomic file writes, timestamps
//!
//! # Example
//!
//! ```no_run
//! use gacha_tally::{GachaService, Paths};
//!
//! fn main() -> gacha_tally::GachaResult<()> {
//!     let service = GachaService::open(Paths::new("/srv/gacha"))?;
//!     let record = service.record("userA", "1")?;
//!     println!("{}: hit={} jackpot={}", record.name(), record.hit_count(), record.jackpot_count());
//!     Ok(())
//! }
//! ```

pub mod backup;
pub mod config;
pub mod error;
pub mod recorder;
pub mod roster_store;
pub mod service;
pub mod snapshot;
pub mod stat_engine;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export commonly used items at crate root
pub use backup::{BackupArtifact, BackupManager};
pub use config::{Paths, Settings};
pub use error::{GachaError, GachaResult};
pub use recorder::EventRecorder;
pub use roster_store::RosterStore;
pub use service::{GachaService, RestoreReport};
pub use snapshot::{DataSnapshot, SnapshotGenerator};
pub use stat_engine::PlayResult;
pub use types::{CommandEvent, Flags, PlayerRecord, Present, Roster, Status};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
