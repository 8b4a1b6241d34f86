//! Derived-field rules

use crate::types::{Flags, Present};

/// Hits needed for the animated reward without a jackpot
pub const GIF_HIT_THRESHOLD: u64 = 3;

/// `illust` after the first hit; `gif` after any jackpot or the third hit
pub fn derive_flags(hit: u64, jackpot: u64) -> Flags {
    Flags {
        illust: hit >= 1,
        gif: jackpot >= 1 || hit >= GIF_HIT_THRESHOLD,
    }
}

/// Gif wins over Illustration
pub fn derive_present(flags: Flags) -> Present {
    if flags.gif {
        Present::Gif
    } else if flags.illust {
        Present::Illustration
    } else {
        Present::Nothing
    }
}
