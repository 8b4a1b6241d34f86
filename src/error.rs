//! Error kinds for every command path
//!
//! Validation failures (`InvalidResult`, `InvalidPlayerName`, ...) are
//! rejections: they are raised before the roster lock is taken and never
//! touch disk. The remaining kinds surface storage problems. None of them
//! can leave a partially written roster behind, since commit is always the
//! last step of a command.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type used throughout the crate
pub type GachaResult<T> = Result<T, GachaError>;

/// Errors produced by the roster engine and its collaborators
#[derive(Debug, Error)]
pub enum GachaError {
    #[error("result code must be 0 or 1, got {0:?}")]
    InvalidResult(String),

    #[error("invalid player name: {0}")]
    InvalidPlayerName(String),

    #[error("status must be none, progress or done, got {0:?}")]
    InvalidStatus(String),

    #[error("player not found: {0}")]
    PlayerNotFound(String),

    #[error("backup not found: {0}")]
    BackupNotFound(String),

    #[error("corrupt roster data in {path:?}: {reason}")]
    CorruptState { path: String, reason: String },

    #[error("timed out after {waited_ms} ms waiting for the roster lock on {target}")]
    LockTimeout { target: String, waited_ms: u64 },

    #[error("backup failed, roster left untouched: {source}")]
    BackupFailed {
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GachaError {
    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        GachaError::CorruptState {
            path: path.into().display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Point a `CorruptState` raised away from the store at the store's file
    pub(crate) fn located(self, location: String) -> Self {
        match self {
            GachaError::CorruptState { reason, .. } => GachaError::CorruptState {
                path: location,
                reason,
            },
            other => other,
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            GachaError::InvalidResult(_)
            | GachaError::InvalidPlayerName(_)
            | GachaError::InvalidStatus(_) => 3,
            GachaError::CorruptState { .. } => 4,
            GachaError::LockTimeout { .. } => 5,
            GachaError::BackupFailed { .. } => 6,
            GachaError::PlayerNotFound(_) | GachaError::BackupNotFound(_) => 7,
            GachaError::Io(_) | GachaError::Json(_) => 1,
        }
    }

    /// True when the command was refused on its input rather than failing
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            GachaError::InvalidResult(_)
                | GachaError::InvalidPlayerName(_)
                | GachaError::InvalidStatus(_)
                | GachaError::PlayerNotFound(_)
                | GachaError::BackupNotFound(_)
        )
    }

    /// Stable machine-readable name, used in event documents
    pub fn kind(&self) -> &'static str {
        match self {
            GachaError::InvalidResult(_) => "invalid_result",
            GachaError::InvalidPlayerName(_) => "invalid_player_name",
            GachaError::InvalidStatus(_) => "invalid_status",
            GachaError::PlayerNotFound(_) => "player_not_found",
            GachaError::BackupNotFound(_) => "backup_not_found",
            GachaError::CorruptState { .. } => "corrupt_state",
            GachaError::LockTimeout { .. } => "lock_timeout",
            GachaError::BackupFailed { .. } => "backup_failed",
            GachaError::Io(_) => "io",
            GachaError::Json(_) => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_from_success() {
        let errors = vec![
            GachaError::InvalidResult("2".to_string()),
            GachaError::corrupt("data/current.json", "expected value"),
            GachaError::LockTimeout {
                target: "x".to_string(),
                waited_ms: 10,
            },
            GachaError::BackupFailed {
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            },
        ];

        let codes: Vec<u8> = errors.iter().map(|e| e.exit_code()).collect();
        assert!(codes.iter().all(|&c| c != 0));
        assert_eq!(codes, vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_rejections() {
        assert!(GachaError::InvalidResult("x".to_string()).is_rejection());
        assert!(GachaError::PlayerNotFound("x".to_string()).is_rejection());
        assert!(!GachaError::corrupt("p", "r").is_rejection());
        assert_eq!(GachaError::corrupt("p", "r").kind(), "corrupt_state");
    }
}
