//! Character cache and channel webhook cache
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.5.0
//!
//! ## Changelog
//! - 1.2.0: Webhook cache keyed by channel
//! - 1.1.0: Cache per user, loaded on first access
//! - 1.0.0: Database-backed character CRUD

use anyhow::{Context as _, Result};
use dashmap::DashMap;
use log::{debug, info};
use serenity::model::id::ChannelId;
use serenity::model::webhook::Webhook;
use serenity::prelude::Context;
use std::sync::Arc;

use super::Character;
use crate::database::Database;

/// Characters of every user seen so far, plus the bot's webhook per channel
///
/// Clones share both caches.
#[derive(Clone)]
pub struct CharacterManager {
    database: Database,
    characters: Arc<DashMap<u64, Vec<Character>>>,
    webhooks: Arc<DashMap<u64, Webhook>>,
}

impl CharacterManager {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            characters: Arc::new(DashMap::new()),
            webhooks: Arc::new(DashMap::new()),
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Every character of a user, loaded from the database on first access
    pub async fn get_all(&self, user_id: u64) -> Result<Vec<Character>> {
        if let Some(characters) = self.characters.get(&user_id) {
            return Ok(characters.clone());
        }
        self.refresh(user_id).await
    }

    /// Reload a user's characters, bypassing the cache
    pub async fn refresh(&self, user_id: u64) -> Result<Vec<Character>> {
        let characters = self.database.get_characters(user_id).await?;
        debug!("Loaded {} characters for user {user_id}", characters.len());
        self.characters.insert(user_id, characters.clone());
        Ok(characters)
    }

    pub async fn get_by_id(&self, user_id: u64, id: &str) -> Result<Option<Character>> {
        Ok(self
            .get_all(user_id)
            .await?
            .into_iter()
            .find(|character| character.id == id))
    }

    pub async fn get_by_tag(&self, user_id: u64, tag: &str) -> Result<Option<Character>> {
        Ok(self
            .get_all(user_id)
            .await?
            .into_iter()
            .find(|character| character.tag == tag))
    }

    pub async fn get_by_prefix(&self, user_id: u64, prefix: &str) -> Result<Option<Character>> {
        Ok(self
            .get_all(user_id)
            .await?
            .into_iter()
            .find(|character| character.prefix.as_deref() == Some(prefix)))
    }

    pub async fn create(&self, user_id: u64, tag: &str) -> Result<Character> {
        // warm the cache so the push below lands on the full list
        self.get_all(user_id).await?;

        let character = Character::new(user_id, tag);
        self.database
            .insert_character(&character)
            .await
            .context("Failed to store character")?;

        self.characters
            .entry(user_id)
            .or_default()
            .push(character.clone());

        info!("Created character '{tag}' for user {user_id}");
        Ok(character)
    }

    /// Persist a modified character; false when the user no longer owns it
    pub async fn update(&self, character: &Character) -> Result<bool> {
        if !self.database.update_character(character).await? {
            return Ok(false);
        }

        if let Some(mut characters) = self.characters.get_mut(&character.user_id) {
            if let Some(cached) = characters.iter_mut().find(|c| c.id == character.id) {
                *cached = character.clone();
            }
        }
        Ok(true)
    }

    pub async fn delete(&self, user_id: u64, id: &str) -> Result<bool> {
        if !self.database.delete_character(user_id, id).await? {
            return Ok(false);
        }

        if let Some(mut characters) = self.characters.get_mut(&user_id) {
            characters.retain(|character| character.id != id);
        }
        info!("Deleted character {id} of user {user_id}");
        Ok(true)
    }

    /// The bot-owned webhook of a channel, fetched or created on first use
    pub async fn webhook_for(&self, ctx: &Context, channel_id: ChannelId) -> Result<Webhook> {
        if let Some(webhook) = self.webhooks.get(&channel_id.0) {
            return Ok(webhook.clone());
        }

        let bot_id = ctx.cache.current_user_id();
        let existing = channel_id
            .webhooks(&ctx.http)
            .await
            .context("Failed to fetch channel webhooks")?
            .into_iter()
            .find(|webhook| {
                webhook.token.is_some()
                    && webhook.user.as_ref().is_some_and(|user| user.id == bot_id)
            });

        let webhook = match existing {
            Some(webhook) => webhook,
            None => {
                let name = ctx.cache.current_user().name;
                info!("🪝 Creating webhook in channel {channel_id}");
                channel_id
                    .create_webhook(&ctx.http, name)
                    .await
                    .context("Failed to create channel webhook")?
            }
        };

        self.webhooks.insert(channel_id.0, webhook.clone());
        Ok(webhook)
    }

    /// Drop the cached webhook of a channel, e.g. after it changed upstream
    pub fn forget_webhook(&self, channel_id: ChannelId) {
        if self.webhooks.remove(&channel_id.0).is_some() {
            debug!("Evicted cached webhook for channel {channel_id}");
        }
    }
}
