//------------ Normalization --------------------------------------------------
//!
//! A single normalization function used by both the ingestion quality
//! filter and the lookup path. Per the design notes, inconsistent
//! normalization between the write and read sides is a frequent bug
//! class, so there must be exactly one implementation both sides call.

/// Lowercases and trims a raw phrase or prefix. Returns `None` if the
/// result is empty, since an empty string is not a valid prefix or
/// phrase anywhere in this system.
///
/// Unicode case folding is done scalar-value by scalar-value via
/// `char::to_lowercase`, so multi-codepoint lowercasing expansions are
/// preserved; no NFKC decomposition is attempted beyond that, matching
/// the "lowercase, trim" contract in the data model.
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered: String = trimmed.chars().flat_map(|c| c.to_lowercase()).collect();
    if lowered.is_empty() {
        None
    } else {
        Some(lowered)
    }
}

/// The three letter rows of a QWERTY keyboard, used by the "keyboard
/// smash" quality-filter heuristic. The data model names only the
/// bottom row, but a single-row run on the top or home row (e.g.
/// "asdfghjkla") is the same failure mode and is rejected the same way.
const KEYBOARD_ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl", "zxcvbnm"];

/// True if `phrase` (already normalized) is a run of length >= 10 made
/// up solely of characters from a single QWERTY keyboard row.
pub fn is_keyboard_smash(phrase: &str) -> bool {
    if phrase.chars().count() < 10 {
        return false;
    }
    KEYBOARD_ROWS
        .iter()
        .any(|row| phrase.chars().all(|c| row.contains(c)))
}

/// True if `phrase` is composed only of ASCII digits.
pub fn is_only_digits(phrase: &str) -> bool {
    !phrase.is_empty() && phrase.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize("  Apple  "), Some("apple".to_string()));
    }

    #[test]
    fn empty_after_trim_is_none() {
        assert_eq!(normalize("   "), None);
        assert_eq!(normalize(""), None);
    }

    #[test]
    fn keyboard_smash_detection() {
        assert!(is_keyboard_smash("asdfghjkla"));
        assert!(is_keyboard_smash("aaaaaaaaaa"));
        assert!(!is_keyboard_smash("zxcvb"));
        assert!(!is_keyboard_smash("helloworld"));
    }

    #[test]
    fn digits_detection() {
        assert!(is_only_digits("12345"));
        assert!(!is_only_digits("12a45"));
        assert!(!is_only_digits(""));
    }
}
