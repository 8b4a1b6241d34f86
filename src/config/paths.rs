//! On-disk layout under the base directory

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming the base directory
pub const BASE_DIR_ENV: &str = "GACHA_HOME";

/// Every file location, derived from one base directory
///
/// ```text
/// <base>/setting.json
/// <base>/data/current.json        roster
/// <base>/data/current.json.lock   lock file
/// <base>/data/data.js             browser snapshot
/// <base>/backups/*.json|*.js      backups, index.js
/// <base>/logs/*.json, app.log     event documents, rolling log
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    base_dir: PathBuf,
}

impl Paths {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Resolve the base directory: explicit value, then `GACHA_HOME`, then
    /// the directory holding the executable, then the working directory.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        if let Some(dir) = explicit {
            return Self::new(dir);
        }
        if let Ok(dir) = env::var(BASE_DIR_ENV) {
            if !dir.trim().is_empty() {
                return Self::new(dir);
            }
        }
        let exe_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Self::new(exe_dir.unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn roster_path(&self) -> PathBuf {
        self.data_dir().join("current.json")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.data_dir().join("current.json.lock")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir().join("data.js")
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    pub fn app_log_path(&self) -> PathBuf {
        self.logs_dir().join("app.log")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.base_dir.join("setting.json")
    }

    /// Create data, logs and backups directories
    pub fn ensure_dirs(&self) -> io::Result<()> {
        for dir in [self.data_dir(), self.logs_dir(), self.backups_dir()] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
