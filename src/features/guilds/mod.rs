//! # Feature: Guild Settings
//!
//! Per-guild settings, currently the text command prefix. Every guild the
//! bot joins or sees at startup gets a row with default settings.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.6.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Per-guild command prefix

pub mod manager;

use serde::{Deserialize, Serialize};

pub use manager::GuildManager;

/// Longest prefix a guild may set
pub const MAX_GUILD_PREFIX_LENGTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildSettings {
    pub id: u64,
    /// Text command prefix; `None` keeps the configured default
    pub prefix: Option<String>,
}

impl GuildSettings {
    pub fn new(id: u64) -> Self {
        Self { id, prefix: None }
    }

    /// The guild's prefix, or `default` when it never set one
    pub fn prefix_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.prefix.as_deref().unwrap_or(default)
    }
}

/// Why a prefix can't be used, if it can't
pub fn validate_prefix(prefix: &str) -> Result<(), String> {
    if prefix.is_empty() {
        return Err("The prefix can't be empty.".to_string());
    }
    if prefix.chars().any(char::is_whitespace) {
        return Err("The prefix can't contain spaces.".to_string());
    }
    if prefix.chars().count() > MAX_GUILD_PREFIX_LENGTH {
        return Err(format!(
            "The prefix can be at most {MAX_GUILD_PREFIX_LENGTH} characters long."
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_or_default() {
        let mut settings = GuildSettings::new(1);
        assert_eq!(settings.prefix_or("_"), "_");

        settings.prefix = Some("!".to_string());
        assert_eq!(settings.prefix_or("_"), "!");
    }

    #[test]
    fn test_validate_prefix() {
        assert!(validate_prefix("z!").is_ok());
        assert!(validate_prefix("").is_err());
        assert!(validate_prefix("z !").is_err());
        assert!(validate_prefix("abcdefghijk").is_err());
        assert!(validate_prefix("ééééééééé").is_ok());
    }
}
