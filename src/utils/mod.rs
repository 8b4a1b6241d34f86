//! Utility functions and helpers
//!
//! Atomic file replacement and timestamp formatting shared by every store.

pub mod atomic;
pub mod time;

pub use atomic::{append_bytes, atomic_write, atomic_write_with, cleanup_temp_files, rotate_file};
pub use time::{backup_stamp, event_stamp, local_log_stamp, now_rfc3339};
