//! Service - one method per command
//!
//! Each mutating command runs its whole read-modify-write under the roster
//! lock: lock, load, transition, commit, regenerate the snapshot, unlock.
//! Input is parsed and validated before the lock is taken; player names are
//! trimmed first. Every command, read-only ones included, successful or
//! not, is then handed to the recorder.

use log::{debug, info, warn};
use serde_json::json;

use crate::backup::{BackupArtifact, BackupManager};
use crate::config::{Paths, Settings};
use crate::error::{GachaError, GachaResult};
use crate::recorder::{EventRecorder, RecorderConfig};
use crate::roster_store::{RosterStore, RosterTxn};
use crate::snapshot::{DataSnapshot, SnapshotGenerator};
use crate::stat_engine::{self, PlayResult};
use crate::types::{CommandEvent, CommandKind, PlayerRecord, Roster, Status};
use crate::utils::{cleanup_temp_files, now_rfc3339};
use crate::validation::validate_player_name;

/// What `restore` did
#[derive(Debug, Clone)]
pub struct RestoreReport {
    /// Copy of the roster as it was right before the restore
    pub safety_backup: BackupArtifact,
    /// Backup file the roster was restored from
    pub restored_from: String,
    pub players: usize,
}

pub struct GachaService {
    paths: Paths,
    settings: Settings,
    store: RosterStore,
    backups: BackupManager,
    snapshots: SnapshotGenerator,
    recorder: EventRecorder,
}

impl GachaService {
    /// Service over the on-disk layout under `paths`
    ///
    /// Creates the data, logs and backups directories and `setting.json` if
    /// they are missing.
    pub fn open(paths: Paths) -> GachaResult<Self> {
        paths.ensure_dirs()?;
        let settings = Settings::load_or_init(&paths.settings_path());
        let store = RosterStore::open(&paths, settings.lock_timeout());
        Ok(Self::with_store(paths, settings, store))
    }

    /// Service with an injected roster store; derived files still go under
    /// `paths`
    pub fn with_store(paths: Paths, settings: Settings, store: RosterStore) -> Self {
        let backups = BackupManager::new(paths.backups_dir(), settings.backup_js_wrappers);
        let snapshots = SnapshotGenerator::new(paths.snapshot_path());
        let recorder = EventRecorder::new(RecorderConfig::new(paths.logs_dir(), &settings));

        Self {
            paths,
            settings,
            store,
            backups,
            snapshots,
            recorder,
        }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &RosterStore {
        &self.store
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// `record <name> <result>`
    pub fn record(&self, player_name: &str, result_code: &str) -> GachaResult<PlayerRecord> {
        let args = json!({ "player": player_name, "result": result_code });
        self.run(CommandKind::Record, args, || {
            let result: PlayResult = result_code.parse()?;
            let player_name = player_name.trim();
            validate_player_name(player_name)?;

            let txn = self.lock()?;
            let roster = txn.load()?;
            let (mut next, record) = stat_engine::apply_result(&roster, player_name, result)
                .map_err(|e| e.located(self.store.location()))?;
            next.touch(now_rfc3339());
            txn.commit(&next)?;
            self.refresh_snapshot(&next);

            info!(
                "recorded {} for {} (hit={}, jackpot={})",
                result,
                player_name,
                record.hit_count(),
                record.jackpot_count()
            );
            Ok(record)
        })
    }

    /// `reset`: back up the roster file, then clear the roster
    ///
    /// The backup is the exact persisted bytes, so a corrupt roster can
    /// still be reset and its content recovered from `backups/`.
    pub fn reset(&self) -> GachaResult<BackupArtifact> {
        self.run(CommandKind::Reset, json!({}), || {
            let txn = self.lock()?;
            let artifact = self.backup_locked(&txn)?;

            let empty = Roster::new();
            txn.commit(&empty)?;
            self.refresh_snapshot(&empty);

            info!("reset roster, previous content in {}", artifact.name);
            Ok(artifact)
        })
    }

    /// `regenerate-snapshot`
    pub fn regenerate_snapshot(&self) -> GachaResult<DataSnapshot> {
        self.run(CommandKind::RegenerateSnapshot, json!({}), || {
            let txn = self.lock()?;
            let roster = txn.load()?;
            self.snapshots.regenerate(&roster)
        })
    }

    /// `backup`: copy the roster file without changing it
    pub fn backup(&self) -> GachaResult<BackupArtifact> {
        self.run(CommandKind::Backup, json!({}), || {
            let txn = self.lock()?;
            self.backup_locked(&txn)
        })
    }

    /// `restore <backup>`: back up the current roster, then replace it with
    /// the named backup
    pub fn restore(&self, backup_name: &str) -> GachaResult<RestoreReport> {
        let args = json!({ "backup": backup_name });
        self.run(CommandKind::Restore, args, || {
            let bytes = self.backups.read(backup_name)?;
            let restored = Roster::from_json_slice(&bytes).map_err(|e| {
                GachaError::corrupt(self.backups.dir().join(backup_name), e)
            })?;

            let txn = self.lock()?;
            let safety_backup = self.backup_locked(&txn)?;
            txn.commit(&restored)?;
            self.refresh_snapshot(&restored);

            info!(
                "restored {} player(s) from {}",
                restored.len(),
                backup_name
            );
            Ok(RestoreReport {
                safety_backup,
                restored_from: backup_name.to_string(),
                players: restored.len(),
            })
        })
    }

    /// `gen-backup-index`; returns the number of backups indexed
    pub fn rebuild_backup_index(&self) -> GachaResult<usize> {
        self.run(CommandKind::GenBackupIndex, json!({}), || {
            let _txn = self.lock()?;
            self.backups.rebuild_index()
        })
    }

    /// `status <name> <none|progress|done>`
    pub fn set_status(&self, player_name: &str, status: &str) -> GachaResult<PlayerRecord> {
        let args = json!({ "player": player_name, "status": status });
        self.run(CommandKind::SetStatus, args, || {
            let status: Status = status.parse()?;
            let player_name = player_name.trim();
            validate_player_name(player_name)?;

            let txn = self.lock()?;
            let roster = txn.load()?;
            let (mut next, record) = stat_engine::set_status(&roster, player_name, status)?;
            next.touch(now_rfc3339());
            txn.commit(&next)?;
            self.refresh_snapshot(&next);

            info!("set status of {} to {}", player_name, status);
            Ok(record)
        })
    }

    /// `backups`: backup names, newest first
    pub fn list_backups(&self) -> GachaResult<Vec<String>> {
        self.run(CommandKind::ListBackups, json!({}), || self.backups.list())
    }

    /// `show`: current roster, read without the lock
    pub fn show(&self) -> GachaResult<Roster> {
        self.run(CommandKind::Show, json!({}), || self.roster())
    }

    /// Current roster, read without the lock and without recording a command
    pub fn roster(&self) -> GachaResult<Roster> {
        self.store.load()
    }

    fn run<T, F>(&self, kind: CommandKind, args: serde_json::Value, command: F) -> GachaResult<T>
    where
        F: FnOnce() -> GachaResult<T>,
    {
        let mut event = CommandEvent::new(kind, args);
        let result = command();
        if let Err(e) = &result {
            event.fail(e);
        }
        self.recorder.record(&event);
        result
    }

    fn lock(&self) -> GachaResult<RosterTxn<'_>> {
        let txn = self.store.lock()?;
        match cleanup_temp_files(self.backups.dir()) {
            Ok(0) => {}
            Ok(n) => debug!("removed {} orphaned temp file(s) from backups", n),
            Err(e) => debug!("backup temp file sweep skipped: {}", e),
        }
        Ok(txn)
    }

    /// Back up the persisted roster bytes; an absent roster is backed up as
    /// the serialized empty roster
    fn backup_locked(&self, txn: &RosterTxn<'_>) -> GachaResult<BackupArtifact> {
        let current = match txn.read_raw()? {
            Some(bytes) => bytes,
            None => Roster::new().to_json_bytes()?,
        };
        self.backups.snapshot_before_reset(&current)
    }

    /// Regenerate data.js after a commit; the roster already changed, so a
    /// failure here only warns
    fn refresh_snapshot(&self, roster: &Roster) {
        if let Err(e) = self.snapshots.regenerate(roster) {
            warn!(
                "roster committed but {} was not regenerated: {}",
                self.snapshots.path().display(),
                e
            );
        }
    }
}
