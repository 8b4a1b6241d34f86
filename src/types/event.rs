//! Command event types
//!
//! One `CommandEvent` is produced per processed command, successful or not,
//! and handed to the recorder. Events are write-only history: nothing in the
//! crate reads them back to rebuild state.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GachaError;

/// Commands the service can process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Record,
    Reset,
    RegenerateSnapshot,
    Backup,
    Restore,
    GenBackupIndex,
    SetStatus,
    ListBackups,
    Show,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Record => write!(f, "record"),
            CommandKind::Reset => write!(f, "reset"),
            CommandKind::RegenerateSnapshot => write!(f, "regenerate_snapshot"),
            CommandKind::Backup => write!(f, "backup"),
            CommandKind::Restore => write!(f, "restore"),
            CommandKind::GenBackupIndex => write!(f, "gen_backup_index"),
            CommandKind::SetStatus => write!(f, "set_status"),
            CommandKind::ListBackups => write!(f, "list_backups"),
            CommandKind::Show => write!(f, "show"),
        }
    }
}

/// How a command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    /// Refused on its input; nothing was touched
    Rejected,
    /// Storage-level failure; last committed state left intact
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ok => write!(f, "ok"),
            Outcome::Rejected => write!(f, "rejected"),
            Outcome::Failed => write!(f, "failed"),
        }
    }
}

/// Structured record of one processed command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEvent {
    /// Fresh identifier per invocation; also part of the event file name
    pub id: Uuid,

    /// RFC 3339 UTC time the command started
    pub at: String,

    pub command: CommandKind,

    /// Command arguments as given
    pub args: serde_json::Value,

    pub outcome: Outcome,

    #[serde(rename = "errorKind", skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandEvent {
    /// Start an event; the outcome stays `Ok` until `fail` is called
    pub fn new(command: CommandKind, args: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            at: crate::utils::now_rfc3339(),
            command,
            args,
            outcome: Outcome::Ok,
            error_kind: None,
            error: None,
        }
    }

    pub fn fail(&mut self, err: &GachaError) {
        self.outcome = if err.is_rejection() {
            Outcome::Rejected
        } else {
            Outcome::Failed
        };
        self.error_kind = Some(err.kind().to_string());
        self.error = Some(err.to_string());
    }

    /// Human-readable app.log line body, e.g.
    /// `record: player="userA" result="1" -> ok`
    pub fn summary_line(&self) -> String {
        let mut args = String::new();
        if let serde_json::Value::Object(map) = &self.args {
            for (key, value) in map {
                args.push(' ');
                args.push_str(key);
                args.push('=');
                args.push_str(&value.to_string());
            }
        }

        match &self.error {
            Some(error) => format!("{}:{} -> {} ({})", self.command, args, self.outcome, error),
            None => format!("{}:{} -> {}", self.command, args, self.outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_line_ok() {
        let event = CommandEvent::new(
            CommandKind::Record,
            json!({"player": "userA", "result": "1"}),
        );
        assert_eq!(
            event.summary_line(),
            r#"record: player="userA" result="1" -> ok"#
        );
    }

    #[test]
    fn test_fail_marks_rejection() {
        let mut event = CommandEvent::new(CommandKind::Record, json!({"result": "2"}));
        event.fail(&GachaError::InvalidResult("2".to_string()));

        assert_eq!(event.outcome, Outcome::Rejected);
        assert_eq!(event.error_kind.as_deref(), Some("invalid_result"));
        assert!(event.summary_line().contains("-> rejected"));
    }

    #[test]
    fn test_events_get_distinct_ids() {
        let a = CommandEvent::new(CommandKind::Reset, json!({}));
        let b = CommandEvent::new(CommandKind::Reset, json!({}));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_serialized_keys() {
        let mut event = CommandEvent::new(CommandKind::Reset, json!({}));
        event.fail(&GachaError::LockTimeout {
            target: "current.json".to_string(),
            waited_ms: 5,
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["command"], "reset");
        assert_eq!(value["outcome"], "failed");
        assert_eq!(value["errorKind"], "lock_timeout");
    }
}
