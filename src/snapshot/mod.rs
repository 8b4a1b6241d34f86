//! Snapshot Generator - browser-embeddable roster data
//!
//! The front end loads `data/data.js` with a plain `<script>` tag, so the
//! file is a single global assignment:
//!
//! ```text
//! window.__GACHA_DATA__ = {"users":[...],"updatedAt":"..."};
//! ```
//!
//! The output depends only on the roster, so regenerating an unchanged
//! roster yields byte-identical files.

use std::path::{Path, PathBuf};

use log::debug;

use crate::error::GachaResult;
use crate::types::Roster;
use crate::utils::atomic_write;

/// Global the front end reads the roster from
pub const DATA_GLOBAL: &str = "window.__GACHA_DATA__";

/// Render `<global> = <json>;\n`
///
/// U+2028 and U+2029 are legal in JSON strings but end a line in older JS
/// parsers, so they are escaped. They can only occur inside strings, where
/// the escape means the same character.
pub fn js_assignment(global: &str, json: &str) -> String {
    let json = json
        .trim_end()
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029");
    format!("{} = {};\n", global, json)
}

/// Result of one regeneration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSnapshot {
    pub path: PathBuf,
    pub bytes: usize,
}

/// Writes the roster snapshot to a fixed path
#[derive(Debug, Clone)]
pub struct SnapshotGenerator {
    path: PathBuf,
}

impl SnapshotGenerator {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot text for `roster`, without writing it
    pub fn render(roster: &Roster) -> GachaResult<String> {
        let json = serde_json::to_string(roster)?;
        Ok(js_assignment(DATA_GLOBAL, &json))
    }

    /// Overwrite the snapshot file with the current roster
    pub fn regenerate(&self, roster: &Roster) -> GachaResult<DataSnapshot> {
        let content = Self::render(roster)?;
        atomic_write(&self.path, content.as_bytes())?;
        debug!(
            "regenerated {} ({} player(s))",
            self.path.display(),
            roster.len()
        );

        Ok(DataSnapshot {
            path: self.path.clone(),
            bytes: content.len(),
        })
    }
}
