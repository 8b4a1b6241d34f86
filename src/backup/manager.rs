//! Timestamped copies of the roster under `backups/`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{GachaError, GachaResult};
use crate::utils::{atomic_write, backup_stamp};

use super::index;

/// A backup file that was just written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArtifact {
    pub name: String,
    pub path: PathBuf,
    pub size: usize,
}

/// Writes, lists and reads roster backups
#[derive(Debug, Clone)]
pub struct BackupManager {
    dir: PathBuf,
    js_wrappers: bool,
}

impl BackupManager {
    pub fn new<P: AsRef<Path>>(dir: P, js_wrappers: bool) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            js_wrappers,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `current` verbatim to `<YYYY-MM-DD_HHMMSS>.json`
    ///
    /// Names never collide: a second backup within the same second gets a
    /// `_1`, `_2`, ... suffix. Wrapper and index upkeep is best-effort once
    /// the copy is durable. A copy that is not valid JSON (a corrupt roster
    /// being reset) gets no wrapper and stays out of the index.
    pub fn snapshot_before_reset(&self, current: &[u8]) -> GachaResult<BackupArtifact> {
        fs::create_dir_all(&self.dir).map_err(backup_failed)?;

        let path = self.unique_path(&backup_stamp());
        atomic_write(&path, current).map_err(backup_failed)?;

        let name = file_name_of(&path);
        info!("backed up roster to {}", path.display());

        if self.js_wrappers {
            if is_json(current) {
                if let Err(e) = index::write_wrapper(&path) {
                    warn!("failed to write script wrapper for {}: {}", name, e);
                }
            } else {
                warn!("{} is not valid JSON, leaving it out of the index", name);
            }
            if let Err(e) = self.rebuild_index() {
                warn!("failed to rebuild backup index: {}", e);
            }
        }

        Ok(BackupArtifact {
            name,
            path,
            size: current.len(),
        })
    }

    /// Backup file names, newest first
    pub fn list(&self) -> GachaResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_backup_name(&name) {
                names.push(name);
            }
        }

        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names)
    }

    /// Bytes of a backup, addressed by file name with or without extension
    ///
    /// `2025-01-15_103000`, `2025-01-15_103000.json` and
    /// `2025-01-15_103000.js` all name the same backup. Directory parts are
    /// ignored so a name cannot escape `backups/`.
    pub fn read(&self, name: &str) -> GachaResult<Vec<u8>> {
        let path = self.resolve(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(GachaError::BackupNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Rewrite every script wrapper and `index.js`; returns the number of
    /// backups indexed
    ///
    /// Backups that are not valid JSON are skipped: their wrapper would not
    /// be a valid script.
    pub fn rebuild_index(&self) -> GachaResult<usize> {
        fs::create_dir_all(&self.dir)?;

        let mut indexed = Vec::new();
        for name in self.list()? {
            let path = self.dir.join(&name);
            if !is_json(&fs::read(&path)?) {
                debug!("not indexing {}: not valid JSON", name);
                continue;
            }
            if self.js_wrappers {
                if let Err(e) = index::write_wrapper(&path) {
                    warn!("failed to write script wrapper for {}: {}", name, e);
                }
            }
            indexed.push(name);
        }

        index::write_index(&self.dir, &indexed)?;
        Ok(indexed.len())
    }

    fn resolve(&self, name: &str) -> GachaResult<PathBuf> {
        let base = Path::new(name.trim())
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| GachaError::BackupNotFound(name.to_string()))?;

        let stem = base
            .strip_suffix(".json")
            .or_else(|| base.strip_suffix(".js"))
            .unwrap_or(&base);
        if stem.is_empty() || stem.starts_with('.') {
            return Err(GachaError::BackupNotFound(name.to_string()));
        }

        Ok(self.dir.join(format!("{}.json", stem)))
    }

    fn unique_path(&self, stamp: &str) -> PathBuf {
        let mut path = self.dir.join(format!("{}.json", stamp));
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("{}_{}.json", stamp, n));
            n += 1;
        }
        path
    }
}

fn backup_failed(source: io::Error) -> GachaError {
    GachaError::BackupFailed { source }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_json(bytes: &[u8]) -> bool {
    serde_json::from_slice::<serde::de::IgnoredAny>(bytes).is_ok()
}

fn is_backup_name(name: &str) -> bool {
    name.ends_with(".json") && !name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager(temp_dir: &TempDir) -> BackupManager {
        BackupManager::new(temp_dir.path().join("backups"), true)
    }

    #[test]
    fn test_backup_is_verbatim_copy() {
        let temp_dir = TempDir::new().unwrap();
        let backups = manager(&temp_dir);
        let current = b"{\n  \"users\": []\n}\n";

        let artifact = backups.snapshot_before_reset(current).unwrap();

        assert_eq!(fs::read(&artifact.path).unwrap(), current);
        assert_eq!(artifact.size, current.len());
        assert!(artifact.name.ends_with(".json"));
        assert!(artifact.path.with_extension("js").exists());
        assert!(backups.dir().join("index.js").exists());
    }

    #[test]
    fn test_same_second_backups_do_not_collide() {
        let temp_dir = TempDir::new().unwrap();
        let backups = manager(&temp_dir);

        let stamp = "2025-01-15_103000";
        fs::create_dir_all(backups.dir()).unwrap();
        fs::write(backups.dir().join(format!("{}.json", stamp)), "a").unwrap();

        let next = backups.unique_path(stamp);
        assert_eq!(next, backups.dir().join("2025-01-15_103000_1.json"));
    }

    #[test]
    fn test_consecutive_backups_are_distinct() {
        let temp_dir = TempDir::new().unwrap();
        let backups = manager(&temp_dir);

        let first = backups.snapshot_before_reset(b"one").unwrap();
        let second = backups.snapshot_before_reset(b"two").unwrap();

        assert_ne!(first.path, second.path);
        assert_eq!(fs::read(&first.path).unwrap(), b"one");
        assert_eq!(fs::read(&second.path).unwrap(), b"two");
        assert_eq!(backups.list().unwrap().len(), 2);
    }

    #[test]
    fn test_unwritable_dir_is_backup_failed() {
        let temp_dir = TempDir::new().unwrap();
        // A plain file where the directory should be
        fs::write(temp_dir.path().join("backups"), "not a dir").unwrap();
        let backups = manager(&temp_dir);

        let err = backups.snapshot_before_reset(b"{}").unwrap_err();
        assert!(matches!(err, GachaError::BackupFailed { .. }));
    }

    #[test]
    fn test_list_newest_first_and_skips_other_files() {
        let temp_dir = TempDir::new().unwrap();
        let backups = manager(&temp_dir);
        fs::create_dir_all(backups.dir()).unwrap();
        for name in [
            "2025-01-15_103000.json",
            "2025-01-16_090000.json",
            "2025-01-15_103000.js",
            "index.js",
            ".2025-01-17_000000.json.tmp",
        ] {
            fs::write(backups.dir().join(name), "{}").unwrap();
        }

        assert_eq!(
            backups.list().unwrap(),
            vec!["2025-01-16_090000.json", "2025-01-15_103000.json"]
        );
    }

    #[test]
    fn test_list_without_dir_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        assert!(manager(&temp_dir).list().unwrap().is_empty());
    }

    #[test]
    fn test_read_accepts_any_extension() {
        let temp_dir = TempDir::new().unwrap();
        let backups = manager(&temp_dir);
        fs::create_dir_all(backups.dir()).unwrap();
        fs::write(backups.dir().join("2025-01-15_103000.json"), "{}").unwrap();

        for name in [
            "2025-01-15_103000",
            "2025-01-15_103000.json",
            "2025-01-15_103000.js",
            "backups/2025-01-15_103000.json",
        ] {
            assert_eq!(backups.read(name).unwrap(), b"{}", "name {}", name);
        }
    }

    #[test]
    fn test_read_missing_backup() {
        let temp_dir = TempDir::new().unwrap();
        let backups = manager(&temp_dir);

        for name in ["2020-01-01_000000", "", "..", "../data/current.json"] {
            let err = backups.read(name).unwrap_err();
            assert!(
                matches!(err, GachaError::BackupNotFound(_)),
                "name {:?} gave {:?}",
                name,
                err
            );
        }
    }

    #[test]
    fn test_invalid_json_backup_is_kept_but_not_indexed() {
        let temp_dir = TempDir::new().unwrap();
        let backups = manager(&temp_dir);

        let good = backups.snapshot_before_reset(b"{\"users\": []}\n").unwrap();
        let broken = backups.snapshot_before_reset(b"{broken").unwrap();

        assert_eq!(fs::read(&broken.path).unwrap(), b"{broken");
        assert!(!broken.path.with_extension("js").exists());
        assert!(good.path.with_extension("js").exists());
        assert_eq!(backups.list().unwrap().len(), 2);

        let text = fs::read_to_string(backups.dir().join("index.js")).unwrap();
        assert!(text.contains(&good.name));
        assert!(!text.contains(&broken.name));
        assert_eq!(backups.rebuild_index().unwrap(), 1);
    }

    #[test]
    fn test_rebuild_index_counts_backups() {
        let temp_dir = TempDir::new().unwrap();
        let backups = manager(&temp_dir);
        fs::create_dir_all(backups.dir()).unwrap();
        fs::write(backups.dir().join("2025-01-15_103000.json"), "{}").unwrap();

        assert_eq!(backups.rebuild_index().unwrap(), 1);
        assert!(backups.dir().join("2025-01-15_103000.js").exists());

        let text = fs::read_to_string(backups.dir().join("index.js")).unwrap();
        assert!(text.contains("\"Name\":\"2025-01-15_103000.json\""));
    }
}
