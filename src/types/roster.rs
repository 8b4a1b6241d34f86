//! Roster: the ordered collection of player records

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use super::player::PlayerRecord;

/// All player records, in first-seen order
///
/// Serialized as `{"users": [...], "updatedAt": "..."}`, which is both the
/// roster file format and the payload of the browser snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredRoster")]
pub struct Roster {
    users: Vec<PlayerRecord>,
    #[serde(rename = "updatedAt", skip_serializing_if = "String::is_empty")]
    updated_at: String,
}

impl Roster {
    /// Empty roster
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> &[PlayerRecord] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PlayerRecord> {
        self.users.iter().find(|u| u.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// RFC 3339 time of the last mutation (empty for a never-written roster)
    pub fn updated_at(&self) -> &str {
        &self.updated_at
    }

    pub(crate) fn touch(&mut self, at: String) {
        self.updated_at = at;
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut PlayerRecord> {
        self.users.iter_mut().find(|u| u.name() == name)
    }

    pub(crate) fn push(&mut self, record: PlayerRecord) {
        self.users.push(record);
    }

    /// Order number the next first-time winner receives, `None` once the
    /// numbers are exhausted
    pub(crate) fn next_order(&self) -> Option<u32> {
        self.users
            .iter()
            .map(|u| u.order())
            .max()
            .unwrap_or(0)
            .checked_add(1)
    }

    /// Roster file content: pretty JSON with a trailing newline
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn from_json_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

#[derive(Debug, Deserialize)]
struct StoredRoster {
    #[serde(deserialize_with = "null_as_empty")]
    users: Vec<PlayerRecord>,
    #[serde(rename = "updatedAt", default)]
    updated_at: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl TryFrom<StoredRoster> for Roster {
    type Error = String;

    fn try_from(stored: StoredRoster) -> Result<Self, Self::Error> {
        let mut seen = HashSet::new();
        for user in &stored.users {
            if !seen.insert(user.name()) {
                return Err(format!("duplicate player name {:?}", user.name()));
            }
        }

        Ok(Roster {
            users: stored.users,
            updated_at: stored.updated_at.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_roster_shape() {
        let bytes = Roster::new().to_json_bytes().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, serde_json::json!({"users": []}));
    }

    #[test]
    fn test_users_key_is_required() {
        assert!(Roster::from_json_slice(b"{}").is_err());
        assert!(Roster::from_json_slice(b"[]").is_err());
        assert!(Roster::from_json_slice(br#"{"users": "x"}"#).is_err());
    }

    #[test]
    fn test_null_users_is_empty() {
        let roster = Roster::from_json_slice(br#"{"users": null}"#).unwrap();
        assert!(roster.is_empty());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = Roster::from_json_slice(
            br#"{"users": [{"name": "a", "hit": 1}, {"name": "a", "hit": 2}]}"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("duplicate player name"));
    }

    #[test]
    fn test_order_preserved_through_round_trip() {
        let mut roster = Roster::new();
        roster.push(PlayerRecord::new("b".to_string(), 1));
        roster.push(PlayerRecord::new("a".to_string(), 2));
        roster.touch("2025-01-15T10:30:00Z".to_string());

        let loaded = Roster::from_json_slice(&roster.to_json_bytes().unwrap()).unwrap();
        let names: Vec<&str> = loaded.users().iter().map(|u| u.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(loaded.updated_at(), "2025-01-15T10:30:00Z");
        assert_eq!(loaded.next_order(), Some(3));
    }
}
