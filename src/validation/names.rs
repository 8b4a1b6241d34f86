//! Player name rules

use crate::error::{GachaError, GachaResult};

/// Longest accepted player name, in characters
pub const MAX_PLAYER_NAME_CHARS: usize = 100;

/// Check a player name before it can enter the roster
///
/// Names are arbitrary text: multi-byte characters and inner whitespace are
/// fine. Empty names, overly long names and C0 control characters other
/// than tab, CR and LF are rejected.
pub fn validate_player_name(name: &str) -> GachaResult<()> {
    if name.is_empty() {
        return Err(GachaError::InvalidPlayerName("name is empty".to_string()));
    }

    let chars = name.chars().count();
    if chars > MAX_PLAYER_NAME_CHARS {
        return Err(GachaError::InvalidPlayerName(format!(
            "name too long ({} > {} characters)",
            chars, MAX_PLAYER_NAME_CHARS
        )));
    }

    if name
        .chars()
        .any(|c| (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r'))
    {
        return Err(GachaError::InvalidPlayerName(
            "name contains control characters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_multibyte_and_spaces() {
        assert!(validate_player_name("userA").is_ok());
        assert!(validate_player_name("山田 太郎").is_ok());
        assert!(validate_player_name("ユーザーＣ").is_ok());
    }

    #[test]
    fn test_rejects_empty() {
        let err = validate_player_name("").unwrap_err();
        assert!(matches!(err, GachaError::InvalidPlayerName(_)));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let hundred_kana = "あ".repeat(MAX_PLAYER_NAME_CHARS);
        assert!(validate_player_name(&hundred_kana).is_ok());

        let too_long = "a".repeat(MAX_PLAYER_NAME_CHARS + 1);
        assert!(validate_player_name(&too_long).is_err());
    }

    #[test]
    fn test_rejects_control_characters() {
        assert!(validate_player_name("bad\u{0007}name").is_err());
        assert!(validate_player_name("tab\tok").is_ok());
        assert!(validate_player_name("line\r\nbreak").is_ok());
    }

    #[test]
    fn test_only_c0_controls_are_rejected() {
        assert!(validate_player_name("nul\u{0}").is_err());
        assert!(validate_player_name("unit\u{1f}sep").is_err());
        assert!(validate_player_name("del\u{7f}").is_ok());
        assert!(validate_player_name("c1\u{85}range\u{9f}").is_ok());
    }
}
