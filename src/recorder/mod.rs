//! Event Recorder - per-command history sink
//!
//! Every processed command leaves two traces under `logs/`:
//!
//! - `<YYYY-MM-DDTHHMMSS>_<uuid>.json`: the full `CommandEvent`
//! - one line in `app.log`, rolled over to `app.log.1` past a size limit
//!
//! Recording is a side effect only. Failures are logged and swallowed so a
//! full disk under `logs/` never fails a command that already committed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config::Settings;
use crate::types::CommandEvent;
use crate::utils::{append_bytes, atomic_write, event_stamp, local_log_stamp, rotate_file};

/// Recorder configuration
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    pub logs_dir: PathBuf,
    pub event_json_log: bool,
    pub max_log_bytes: u64,
}

impl RecorderConfig {
    pub fn new<P: AsRef<Path>>(logs_dir: P, settings: &Settings) -> Self {
        Self {
            logs_dir: logs_dir.as_ref().to_path_buf(),
            event_json_log: settings.event_json_log,
            max_log_bytes: settings.max_log_bytes,
        }
    }

    pub fn app_log_path(&self) -> PathBuf {
        self.logs_dir.join("app.log")
    }

    pub fn rolled_log_path(&self) -> PathBuf {
        self.logs_dir.join("app.log.1")
    }

    pub fn event_path(&self, event: &CommandEvent) -> PathBuf {
        self.logs_dir
            .join(format!("{}_{}.json", event_stamp(), event.id))
    }
}

pub struct EventRecorder {
    config: RecorderConfig,
}

impl EventRecorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Record one processed command; never fails
    pub fn record(&self, event: &CommandEvent) {
        if self.config.event_json_log {
            if let Err(e) = self.write_event(event) {
                warn!("failed to write event {}: {}", event.id, e);
            }
        }
        if let Err(e) = self.append_line(event) {
            warn!(
                "failed to append to {}: {}",
                self.config.app_log_path().display(),
                e
            );
        }
    }

    fn write_event(&self, event: &CommandEvent) -> io::Result<PathBuf> {
        let path = self.config.event_path(event);
        let mut bytes = serde_json::to_vec_pretty(event).map_err(io::Error::other)?;
        bytes.push(b'\n');
        atomic_write(&path, &bytes)?;
        debug!("wrote event {}", path.display());
        Ok(path)
    }

    fn append_line(&self, event: &CommandEvent) -> io::Result<()> {
        let path = self.config.app_log_path();

        let size = match fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e),
        };
        if size > self.config.max_log_bytes {
            rotate_file(&path, self.config.rolled_log_path())?;
            debug!("rolled over {}", path.display());
        }

        let line = format!("{} {}\n", local_log_stamp(), event.summary_line());
        append_bytes(&path, line.as_bytes())
    }
}
