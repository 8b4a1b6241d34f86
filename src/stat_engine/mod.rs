//! Stat Engine - pure roster transitions
//!
//! Given a roster and one play result, compute the next roster. Nothing in
//! here touches disk or the clock; the service stamps `updatedAt` and
//! persists the result.

mod rules;

use std::fmt;
use std::str::FromStr;

use crate::error::{GachaError, GachaResult};
use crate::types::{PlayerRecord, Roster, Status};
use crate::validation::validate_player_name;

pub use rules::{derive_flags, derive_present, GIF_HIT_THRESHOLD};

/// Outcome of one draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayResult {
    /// Ordinary hit, code `0`
    Hit,
    /// Jackpot hit, code `1`
    Jackpot,
}

impl PlayResult {
    /// Command-line code of this result
    pub fn code(self) -> u8 {
        match self {
            PlayResult::Hit => 0,
            PlayResult::Jackpot => 1,
        }
    }
}

impl fmt::Display for PlayResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayResult::Hit => write!(f, "hit"),
            PlayResult::Jackpot => write!(f, "jackpot"),
        }
    }
}

impl FromStr for PlayResult {
    type Err = GachaError;

    /// Accepts exactly `0` or `1`, ignoring surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(PlayResult::Hit),
            "1" => Ok(PlayResult::Jackpot),
            _ => Err(GachaError::InvalidResult(s.to_string())),
        }
    }
}

/// Apply one play result to `player_name`
///
/// Returns the next roster and the player's updated record. A new player is
/// appended with zero counts first. A hit grows `hit` by one and a jackpot
/// grows `jackpot` by one. On error the input roster is untouched, since it
/// is only borrowed.
///
/// A counter already at its maximum can only come from a hand-edited file
/// and fails with `CorruptState`.
pub fn apply_result(
    roster: &Roster,
    player_name: &str,
    result: PlayResult,
) -> GachaResult<(Roster, PlayerRecord)> {
    validate_player_name(player_name)?;

    let mut next = roster.clone();
    let needs_order = next.get(player_name).map_or(true, |r| r.order() == 0);
    let order = if needs_order {
        next.next_order()
            .ok_or_else(|| saturated(player_name, "order"))?
    } else {
        0
    };

    if !next.contains(player_name) {
        next.push(PlayerRecord::new(player_name.to_string(), order));
    }

    let record = next
        .get_mut(player_name)
        .ok_or_else(|| GachaError::PlayerNotFound(player_name.to_string()))?;

    let (hit, jackpot) = match result {
        PlayResult::Hit => (
            record
                .hit_count()
                .checked_add(1)
                .ok_or_else(|| saturated(player_name, "hit"))?,
            record.jackpot_count(),
        ),
        PlayResult::Jackpot => (
            record.hit_count(),
            record
                .jackpot_count()
                .checked_add(1)
                .ok_or_else(|| saturated(player_name, "jackpot"))?,
        ),
    };
    record.set_counts(hit, jackpot);

    // Records from older files carry no order number yet
    if record.order() == 0 {
        record.set_order(order);
    }

    let updated = record.clone();
    Ok((next, updated))
}

fn saturated(player_name: &str, field: &str) -> GachaError {
    GachaError::corrupt(
        "roster",
        format!("{} of {:?} cannot grow any further", field, player_name),
    )
}

/// Parse a result code and apply it
pub fn apply_result_code(
    roster: &Roster,
    player_name: &str,
    result_code: &str,
) -> GachaResult<(Roster, PlayerRecord)> {
    let result: PlayResult = result_code.parse()?;
    apply_result(roster, player_name, result)
}

/// Set a player's reward status; the player must already exist
pub fn set_status(
    roster: &Roster,
    player_name: &str,
    status: Status,
) -> GachaResult<(Roster, PlayerRecord)> {
    let mut next = roster.clone();
    let record = next
        .get_mut(player_name)
        .ok_or_else(|| GachaError::PlayerNotFound(player_name.to_string()))?;

    record.set_status(status);

    let updated = record.clone();
    Ok((next, updated))
}
