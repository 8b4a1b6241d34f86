//! Backup Manager module
//!
//! ```text
//! backups/
//! ├── 2025-01-15_103000.json   # verbatim copy of data/current.json
//! ├── 2025-01-15_103000.js     # window.__GACHA_BACKUP__ = {...};
//! └── index.js                 # window.__GACHA_BACKUPS__ = [{"Name","JS"}];
//! ```

mod index;
mod manager;

pub use index::{IndexEntry, BACKUP_GLOBAL, INDEX_FILE, INDEX_GLOBAL};
pub use manager::{BackupArtifact, BackupManager};
