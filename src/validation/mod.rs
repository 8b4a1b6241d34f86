//! Input validation for command arguments
//!
//! Everything here runs before the roster lock is taken, so a rejected
//! command never touches disk.

mod names;

pub use names::{validate_player_name, MAX_PLAYER_NAME_CHARS};
