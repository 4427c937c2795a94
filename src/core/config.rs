//! Environment configuration
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.7.0
//!
//! ## Changelog
//! - 1.2.0: Add optional development guild for command deployment
//! - 1.1.0: Add configurable command prefix
//! - 1.0.0: Initial creation

use anyhow::{anyhow, Context as _, Result};
use std::env;

pub const DEFAULT_PREFIX: &str = "_";
pub const DEFAULT_DATABASE_PATH: &str = "zent.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    /// Required by the deploy binary only.
    pub application_id: Option<u64>,
    pub prefix: String,
    pub database_path: String,
    pub log_level: String,
    /// Guild that receives every command on deploy, for instant updates while developing.
    pub dev_guild_id: Option<u64>,
}

impl Config {
    /// Load configuration from process environment variables
    ///
    /// Call `dotenvy::dotenv()` first so `.env` values are visible.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| anyhow!("DISCORD_TOKEN environment variable not set"))?;

        let application_id = parse_id(&lookup, "DISCORD_APPLICATION_ID")?;
        let dev_guild_id = parse_id(&lookup, "DISCORD_GUILD_ID")?;

        let prefix = lookup("COMMAND_PREFIX")
            .map(|prefix| prefix.trim().to_string())
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        if prefix.chars().any(char::is_whitespace) {
            return Err(anyhow!("COMMAND_PREFIX must not contain whitespace"));
        }

        Ok(Self {
            discord_token,
            application_id,
            prefix,
            database_path: lookup("DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            dev_guild_id,
        })
    }

    /// Application id, failing when it was not configured
    pub fn require_application_id(&self) -> Result<u64> {
        self.application_id
            .ok_or_else(|| anyhow!("DISCORD_APPLICATION_ID environment variable not set"))
    }
}

fn parse_id<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|value| !value.trim().is_empty()) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .with_context(|| format!("{key} must be a numeric Discord id")),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[("DISCORD_TOKEN", "abc")])).unwrap();

        assert_eq!(config.discord_token, "abc");
        assert_eq!(config.prefix, "_");
        assert_eq!(config.database_path, "zent.db");
        assert_eq!(config.log_level, "info");
        assert!(config.application_id.is_none());
        assert!(config.dev_guild_id.is_none());
    }

    #[test]
    fn test_config_requires_token() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("DISCORD_TOKEN", "  ")])).is_err());
    }

    #[test]
    fn test_config_parses_ids() {
        let config = Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_APPLICATION_ID", "123456789012345678"),
            ("DISCORD_GUILD_ID", " 223456789012345678 "),
        ]))
        .unwrap();

        assert_eq!(config.application_id, Some(123456789012345678));
        assert_eq!(config.dev_guild_id, Some(223456789012345678));
        assert_eq!(config.require_application_id().unwrap(), 123456789012345678);
    }

    #[test]
    fn test_config_rejects_bad_id() {
        let result = Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_APPLICATION_ID", "not-a-number"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_custom_prefix() {
        let config = Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("COMMAND_PREFIX", "z!"),
        ]))
        .unwrap();
        assert_eq!(config.prefix, "z!");

        let result = Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("COMMAND_PREFIX", "z !"),
        ]));
        assert!(result.is_err());
    }
}
