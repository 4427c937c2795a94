//! String helpers shared by commands and the character relay
//!
//! - **Version**: 1.1.1
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.1.1: Ids must be whole digit runs
//! - 1.1.0: Add mass mention neutralising and preview truncation
//! - 1.0.0: Snowflake extraction and tag sanitizing

use regex::Regex;
use std::sync::OnceLock;

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;

static SNOWFLAKE: OnceLock<Regex> = OnceLock::new();
static MASS_MENTION: OnceLock<Regex> = OnceLock::new();

fn snowflake_regex() -> &'static Regex {
    SNOWFLAKE.get_or_init(|| Regex::new(r"\b[0-9]{17,20}\b").expect("snowflake pattern is valid"))
}

fn mass_mention_regex() -> &'static Regex {
    MASS_MENTION.get_or_init(|| Regex::new(r"@(everyone|here)").expect("mention pattern is valid"))
}

/// Find the first Discord id embedded in `input`
///
/// Accepts raw ids, mentions (`<@123…>`) and message links (the first id wins,
/// so callers wanting the trailing message id of a link use [`extract_last_id`]).
pub fn extract_id(input: &str) -> Option<u64> {
    snowflake_regex()
        .find(input)
        .and_then(|m| m.as_str().parse().ok())
}

/// Find the last Discord id embedded in `input`
pub fn extract_last_id(input: &str) -> Option<u64> {
    snowflake_regex()
        .find_iter(input)
        .last()
        .and_then(|m| m.as_str().parse().ok())
}

/// Keep only word characters (letters, digits, underscore)
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Break `@everyone` and `@here` with a zero-width space
pub fn neutralize_mass_mentions(input: &str) -> String {
    mass_mention_regex()
        .replace_all(input, "@\u{200b}$1")
        .into_owned()
}

/// Shorten `text` to `max` characters, appending "..." when cut
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(max).collect();
    truncated.push_str("...");
    truncated
}

/// Truncate text to fit in a single Discord message
pub fn truncate_for_message(text: &str) -> String {
    truncate_chars(text, MESSAGE_LIMIT - 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_id_from_mention() {
        assert_eq!(extract_id("<@123456789012345678>"), Some(123456789012345678));
        assert_eq!(extract_id("<@!123456789012345678>"), Some(123456789012345678));
        assert_eq!(extract_id("123456789012345678"), Some(123456789012345678));
    }

    #[test]
    fn test_extract_id_rejects_short_numbers() {
        assert_eq!(extract_id("12345"), None);
        assert_eq!(extract_id("hero"), None);
    }

    #[test]
    fn test_extract_id_rejects_long_digit_runs() {
        assert_eq!(extract_id("123456789012345678901"), None);
        assert_eq!(extract_id("<@1234567890123456789012>"), None);
        assert_eq!(extract_last_id("123456789012345678 99999999999999999999999"), Some(123456789012345678));
    }

    #[test]
    fn test_extract_last_id_from_link() {
        let link = "https://discord.com/channels/111111111111111111/222222222222222222/333333333333333333";
        assert_eq!(extract_id(link), Some(111111111111111111));
        assert_eq!(extract_last_id(link), Some(333333333333333333));
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("Hero-01!"), "Hero01");
        assert_eq!(sanitize("my_char"), "my_char");
        assert_eq!(sanitize("***"), "");
    }

    #[test]
    fn test_neutralize_mass_mentions() {
        let out = neutralize_mass_mentions("hi @everyone and @here");
        assert_eq!(out, "hi @\u{200b}everyone and @\u{200b}here");
        assert_eq!(neutralize_mass_mentions("hi <@1>"), "hi <@1>");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("ééééé", 2), "éé...");
    }

    #[test]
    fn test_truncate_for_message() {
        let long = "x".repeat(MESSAGE_LIMIT + 10);
        assert_eq!(truncate_for_message(&long).chars().count(), MESSAGE_LIMIT);
    }
}
