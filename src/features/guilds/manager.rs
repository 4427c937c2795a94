//! Guild settings cache
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.6.0
//!
//! ## Changelog
//! - 1.0.0: Settings cached per guild, seeded on guild create

use anyhow::{Context as _, Result};
use dashmap::DashMap;
use log::{debug, info};
use std::sync::Arc;

use super::GuildSettings;
use crate::database::Database;

/// Settings of every guild seen so far
///
/// Clones share the cache.
#[derive(Clone)]
pub struct GuildManager {
    database: Database,
    guilds: Arc<DashMap<u64, GuildSettings>>,
}

impl GuildManager {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            guilds: Arc::new(DashMap::new()),
        }
    }

    /// Make sure a guild has a row, keeping any stored settings
    pub async fn ensure(&self, guild_id: u64) -> Result<GuildSettings> {
        if self
            .database
            .insert_guild(guild_id)
            .await
            .context("Failed to store guild")?
        {
            info!("🏠 Added settings for guild {guild_id}");
        }
        self.refresh(guild_id).await
    }

    /// Settings of a guild, loaded or created on first access
    pub async fn get(&self, guild_id: u64) -> Result<GuildSettings> {
        if let Some(settings) = self.guilds.get(&guild_id) {
            return Ok(settings.clone());
        }
        self.ensure(guild_id).await
    }

    async fn refresh(&self, guild_id: u64) -> Result<GuildSettings> {
        let settings = self
            .database
            .get_guild(guild_id)
            .await?
            .unwrap_or_else(|| GuildSettings::new(guild_id));
        debug!("Loaded settings for guild {guild_id}");
        self.guilds.insert(guild_id, settings.clone());
        Ok(settings)
    }

    /// Store a new prefix for a guild
    pub async fn set_prefix(&self, guild_id: u64, prefix: &str) -> Result<GuildSettings> {
        self.get(guild_id).await?;
        self.database
            .update_guild_prefix(guild_id, Some(prefix))
            .await
            .context("Failed to update guild prefix")?;

        let settings = GuildSettings {
            id: guild_id,
            prefix: Some(prefix.to_string()),
        };
        self.guilds.insert(guild_id, settings.clone());
        info!("⌨️ Guild {guild_id} prefix set to '{prefix}'");
        Ok(settings)
    }

    /// Text command prefix used in a guild; direct messages use `default`
    pub async fn prefix_for(&self, guild_id: Option<u64>, default: &str) -> Result<String> {
        let Some(guild_id) = guild_id else {
            return Ok(default.to_string());
        };
        Ok(self.get(guild_id).await?.prefix_or(default).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUILD: u64 = 111111111111111111;

    fn manager() -> GuildManager {
        GuildManager::new(Database::in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_unknown_guild_gets_default_settings() {
        let guilds = manager();

        assert_eq!(guilds.get(GUILD).await.unwrap(), GuildSettings::new(GUILD));
        assert!(guilds.database.get_guild(GUILD).await.unwrap().is_some());
        assert_eq!(guilds.prefix_for(Some(GUILD), "_").await.unwrap(), "_");
    }

    #[tokio::test]
    async fn test_set_prefix_updates_cache_and_database() {
        let guilds = manager();
        guilds.ensure(GUILD).await.unwrap();

        guilds.set_prefix(GUILD, "z!").await.unwrap();
        assert_eq!(guilds.prefix_for(Some(GUILD), "_").await.unwrap(), "z!");

        // a fresh cache reads the stored prefix
        let reloaded = GuildManager::new(guilds.database.clone());
        assert_eq!(reloaded.prefix_for(Some(GUILD), "_").await.unwrap(), "z!");
    }

    #[tokio::test]
    async fn test_ensure_keeps_stored_prefix() {
        let guilds = manager();
        guilds.set_prefix(GUILD, "!").await.unwrap();

        let settings = guilds.ensure(GUILD).await.unwrap();
        assert_eq!(settings.prefix.as_deref(), Some("!"));
    }

    #[tokio::test]
    async fn test_direct_messages_use_default() {
        assert_eq!(manager().prefix_for(None, "_").await.unwrap(), "_");
    }
}
