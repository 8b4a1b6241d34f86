//! Player record types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GachaError;
use crate::stat_engine::{derive_flags, derive_present};

/// Display flags derived from a player's counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    pub illust: bool,
    pub gif: bool,
}

/// Reward the front end presents for a player, derived from `Flags`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Present {
    #[default]
    #[serde(rename = "")]
    Nothing,
    Illustration,
    Gif,
}

/// Operator-maintained progress of a player's reward
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    #[serde(alias = "")]
    None,
    Progress,
    Done,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::None => write!(f, "none"),
            Status::Progress => write!(f, "progress"),
            Status::Done => write!(f, "done"),
        }
    }
}

impl FromStr for Status {
    type Err = GachaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Status::None),
            "progress" => Ok(Status::Progress),
            "done" => Ok(Status::Done),
            _ => Err(GachaError::InvalidStatus(s.to_string())),
        }
    }
}

/// One player's cumulative statistics
///
/// Fields are private: counts only move through the stat engine, and the
/// derived fields (`flags`, `present`, `done`) are recomputed on every
/// change and on every load, so they cannot drift from the counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredPlayer")]
pub struct PlayerRecord {
    name: String,
    hit: u64,
    jackpot: u64,
    flags: Flags,
    done: bool,
    order: u32,
    status: Status,
    present: Present,
}

impl PlayerRecord {
    /// Fresh record with zero counts
    pub(crate) fn new(name: String, order: u32) -> Self {
        let mut record = Self {
            name,
            hit: 0,
            jackpot: 0,
            flags: Flags::default(),
            done: false,
            order,
            status: Status::None,
            present: Present::Nothing,
        };
        record.set_counts(0, 0);
        record
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hit_count(&self) -> u64 {
        self.hit
    }

    pub fn jackpot_count(&self) -> u64 {
        self.jackpot
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// 1-based order of first win (0 for legacy records without one)
    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn present(&self) -> Present {
        self.present
    }

    pub(crate) fn set_counts(&mut self, hit: u64, jackpot: u64) {
        self.hit = hit;
        self.jackpot = jackpot;
        self.flags = derive_flags(hit, jackpot);
        self.present = derive_present(self.flags);
    }

    pub(crate) fn set_order(&mut self, order: u32) {
        self.order = order;
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = status;
        self.done = status == Status::Done;
    }
}

/// On-disk shape of a player; derived fields are read but ignored
#[derive(Debug, Deserialize)]
struct StoredPlayer {
    name: String,
    #[serde(default)]
    hit: u64,
    #[serde(default)]
    jackpot: u64,
    #[serde(default)]
    order: u32,
    #[serde(default)]
    status: Status,
    #[serde(default)]
    done: bool,
}

impl TryFrom<StoredPlayer> for PlayerRecord {
    type Error = String;

    fn try_from(stored: StoredPlayer) -> Result<Self, Self::Error> {
        if stored.name.is_empty() {
            return Err("player with empty name".to_string());
        }

        let mut record = PlayerRecord::new(stored.name, stored.order);
        record.set_counts(stored.hit, stored.jackpot);

        // Older files only carry the `done` boolean
        let status = if stored.done && stored.status == Status::None {
            Status::Done
        } else {
            stored.status
        };
        record.set_status(status);

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_shape() {
        let mut record = PlayerRecord::new("userA".to_string(), 1);
        record.set_counts(1, 0);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "userA",
                "hit": 1,
                "jackpot": 0,
                "flags": {"illust": true, "gif": false},
                "done": false,
                "order": 1,
                "status": "none",
                "present": "Illustration"
            })
        );
    }

    #[test]
    fn test_load_recomputes_hand_edited_flags() {
        let record: PlayerRecord = serde_json::from_value(json!({
            "name": "userB",
            "hit": 3,
            "jackpot": 0,
            "flags": {"illust": false, "gif": false},
            "present": ""
        }))
        .unwrap();

        assert!(record.flags().illust);
        assert!(record.flags().gif);
        assert_eq!(record.present(), Present::Gif);
    }

    #[test]
    fn test_legacy_done_and_empty_status() {
        let record: PlayerRecord = serde_json::from_value(json!({
            "name": "userC",
            "hit": 1,
            "status": "",
            "done": true
        }))
        .unwrap();

        assert_eq!(record.status(), Status::Done);
        assert!(record.is_done());
    }

    #[test]
    fn test_negative_count_is_rejected() {
        let result: Result<PlayerRecord, _> =
            serde_json::from_value(json!({"name": "x", "hit": -1}));
        assert!(result.is_err());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Done".parse::<Status>().unwrap(), Status::Done);
        assert_eq!(" progress ".parse::<Status>().unwrap(), Status::Progress);
        assert!(matches!(
            "finished".parse::<Status>(),
            Err(GachaError::InvalidStatus(_))
        ));
    }
}
