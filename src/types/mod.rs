//! Data types for the gacha roster
//!
//! This module contains the core data structures shared by the store, the
//! stat engine and the recorder.

mod event;
mod player;
mod roster;

pub use event::{CommandEvent, CommandKind, Outcome};
pub use player::{Flags, PlayerRecord, Present, Status};
pub use roster::Roster;
