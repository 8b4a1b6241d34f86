//! `setting.json`: operator-tunable settings
//!
//! A missing file is created with defaults. Keys added in newer versions
//! are merged into an existing file without touching unknown keys. A
//! malformed file falls back to defaults with a warning; settings never
//! block a command.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::atomic_write;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Write one JSON document per processed command under logs/
    pub event_json_log: bool,
    /// Bounded wait for the roster lock
    pub lock_timeout_ms: u64,
    /// app.log rolls over to app.log.1 past this size
    pub max_log_bytes: u64,
    /// Emit `<backup>.js` wrappers and `backups/index.js` for the front end
    pub backup_js_wrappers: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            event_json_log: true,
            lock_timeout_ms: 5_000,
            max_log_bytes: 1024 * 1024,
            backup_js_wrappers: true,
        }
    }
}

impl Settings {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Read settings, falling back to defaults on any problem
    pub fn load(path: &Path) -> Self {
        match fs::read(path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("ignoring malformed {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!("cannot read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Create the file if absent and add any missing keys, then load it
    pub fn load_or_init(path: &Path) -> Self {
        if let Err(e) = Self::ensure_upgraded(path) {
            warn!("cannot prepare {}: {}", path.display(), e);
        }
        Self::load(path)
    }

    /// Write defaults for missing keys, preserving everything else
    ///
    /// Returns true when the file was written.
    pub fn ensure_upgraded(path: &Path) -> io::Result<bool> {
        let defaults = serde_json::to_value(Self::default()).map_err(io::Error::other)?;

        let mut current = match fs::read(path) {
            Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                Ok(Value::Object(map)) => map,
                // Leave files we cannot merge into alone
                _ => return Ok(false),
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Default::default(),
            Err(e) => return Err(e),
        };

        let mut changed = false;
        if let Value::Object(defaults) = defaults {
            for (key, value) in defaults {
                if !current.contains_key(&key) {
                    current.insert(key, value);
                    changed = true;
                }
            }
        }

        if changed {
            let mut bytes = serde_json::to_vec_pretty(&Value::Object(current))
                .map_err(io::Error::other)?;
            bytes.push(b'\n');
            atomic_write(path, &bytes)?;
            info!("wrote settings defaults to {}", path.display());
        }

        Ok(changed)
    }
}
