//! Shared context for command handlers
//!
//! - **Version**: 2.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 2.1.0: Guild settings and per-guild prefixes
//! - 2.0.0: Carry configuration and the character manager
//! - 1.0.0: Initial implementation with core shared state

use log::error;
use serenity::model::id::GuildId;
use std::time::Instant;

use crate::core::Config;
use crate::database::Database;
use crate::features::characters::CharacterManager;
use crate::features::guilds::GuildManager;

/// Services handed to every handler factory
///
/// - Config for the prefix and deployment settings
/// - Database for persistence
/// - CharacterManager for cached characters and channel webhooks
/// - GuildManager for per-guild settings
/// - Bot start time for uptime reporting
#[derive(Clone)]
pub struct CommandContext {
    pub config: Config,
    pub database: Database,
    pub characters: CharacterManager,
    pub guilds: GuildManager,
    pub start_time: Instant,
}

impl CommandContext {
    pub fn new(config: Config, database: Database) -> Self {
        let characters = CharacterManager::new(database.clone());
        let guilds = GuildManager::new(database.clone());
        Self {
            config,
            database,
            characters,
            guilds,
            start_time: Instant::now(),
        }
    }

    /// Default prefix from the configuration
    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    /// Prefix in effect for a guild, the default when it can't be read
    pub async fn prefix_in(&self, guild_id: Option<GuildId>) -> String {
        match self.guilds.prefix_for(guild_id.map(|id| id.0), self.prefix()).await {
            Ok(prefix) => prefix,
            Err(e) => {
                error!("Failed to read guild prefix: {e:#}");
                self.prefix().to_string()
            }
        }
    }
}
