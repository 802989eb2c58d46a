//! Small shared helpers: the whitespace/emptiness rule, episode identity
//! keys, and timestamp formatting.

use chrono::Utc;

/// Timestamp format used everywhere a time is persisted or displayed.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Applies the whitespace rule used throughout parsing: a value that is
/// empty or all-whitespace after trimming is treated as absent, never as
/// an empty string.
pub fn clean_text(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Computes the identity key for an episode: the first non-empty value
/// among {guid, audio_url, link, title}, in that priority order.
///
/// The parser uses this chain to synthesize a guid for items that declare
/// none, and the reconciler uses the same chain to decide whether two
/// records denote the same episode. Keeping it a single function prevents
/// the two from drifting apart.
pub fn identity_key<'a>(
    guid: Option<&'a str>,
    audio_url: Option<&'a str>,
    link: Option<&'a str>,
    title: Option<&'a str>,
) -> Option<&'a str> {
    [guid, audio_url, link, title]
        .into_iter()
        .flatten()
        .find_map(clean_text)
}

/// Current UTC time as a `YYYY-MM-DD HH:MM:SS` string.
pub fn now_stamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_trims() {
        assert_eq!(clean_text("  hello  "), Some("hello"));
    }

    #[test]
    fn test_clean_text_blank_is_absent() {
        assert_eq!(clean_text(""), None);
        assert_eq!(clean_text("   \t\n  "), None);
    }

    #[test]
    fn test_identity_key_prefers_guid() {
        let key = identity_key(Some("g"), Some("a"), Some("l"), Some("t"));
        assert_eq!(key, Some("g"));
    }

    #[test]
    fn test_identity_key_fallback_order() {
        assert_eq!(
            identity_key(None, Some("a"), Some("l"), Some("t")),
            Some("a")
        );
        assert_eq!(identity_key(None, None, Some("l"), Some("t")), Some("l"));
        assert_eq!(identity_key(None, None, None, Some("t")), Some("t"));
    }

    #[test]
    fn test_identity_key_skips_blank_values() {
        // A whitespace-only guid does not count as declared
        assert_eq!(
            identity_key(Some("   "), Some("a"), None, Some("t")),
            Some("a")
        );
    }

    #[test]
    fn test_identity_key_all_empty() {
        assert_eq!(identity_key(None, None, None, None), None);
        assert_eq!(identity_key(Some(""), Some(" "), None, Some("")), None);
    }

    #[test]
    fn test_now_stamp_round_trips() {
        let stamp = now_stamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT).is_ok());
    }
}
