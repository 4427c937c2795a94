//! Re-send prefixed messages through the channel webhook as a character
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.5.0
//!
//! ## Changelog
//! - 1.2.0: Edit relayed messages in place
//! - 1.1.0: Attachments and reply previews
//! - 1.0.0: Initial relay

use anyhow::{Context as _, Result};
use log::{debug, error, warn};
use serenity::model::channel::{AttachmentType, ChannelType, Message};
use serenity::model::id::{ChannelId, MessageId};
use serenity::model::permissions::Permissions;
use serenity::prelude::Context;
use std::borrow::Cow;

use super::{
    reply_preview, Character, CharacterManager, CharacterMessage, MAX_MESSAGE_CONTENT_LENGTH,
};
use crate::core::neutralize_mass_mentions;
use crate::database::Database;

/// Pick the character whose prefix starts `content` and the text to send for it
///
/// `None` when nothing matches, the remaining text is empty without
/// attachments, or it is too long to relay.
pub fn prepare_relay<'a>(
    characters: &'a [Character],
    content: &str,
    has_attachments: bool,
) -> Option<(&'a Character, String)> {
    let (character, rest) = characters
        .iter()
        .find_map(|character| character.strip_prefix(content).map(|rest| (character, rest)))?;

    let body = neutralize_mass_mentions(rest.trim());
    if body.is_empty() && !has_attachments {
        return None;
    }
    if body.chars().count() > MAX_MESSAGE_CONTENT_LENGTH {
        return None;
    }

    Some((character, body))
}

fn compose(preview: Option<&str>, body: &str) -> String {
    match preview {
        Some(preview) => format!("{preview}\n{body}"),
        None => body.to_string(),
    }
}

/// Relayed messages only go to cached text channels where the bot may
/// delete messages and manage webhooks
fn can_relay(ctx: &Context, message: &Message) -> bool {
    let Some(guild_id) = message.guild_id else {
        return false;
    };
    // threads are not kept in the guild channel cache
    let Some(channel) = ctx.cache.guild_channel(message.channel_id) else {
        return false;
    };
    if !matches!(channel.kind, ChannelType::Text | ChannelType::News) {
        return false;
    }

    let bot_id = ctx.cache.current_user_id();
    let permissions = ctx
        .cache
        .guild_field(guild_id, |guild| {
            let member = guild.members.get(&bot_id)?;
            guild.user_permissions_in(&channel, member).ok()
        })
        .flatten();

    permissions.is_some_and(|p| p.contains(Permissions::MANAGE_MESSAGES | Permissions::MANAGE_WEBHOOKS))
}

/// Reply preview for a replied message, resolving relayed messages to their character
async fn preview_for(database: &Database, replied: &Message) -> Result<String> {
    let mut author = format!("<@{}>", replied.author.id);
    let mut content = replied.content.clone();

    if replied.webhook_id.is_some() {
        author = replied.author.name.clone();

        if let Some((stored, character)) = database.get_character_message(replied.id.0).await? {
            content = stored.content;
            if let Some(character) = character {
                author = character.display_name().to_string();
            }
        }
    }

    Ok(reply_preview(&author, &content, &replied.link()))
}

async fn download_attachments(message: &Message) -> Result<Vec<AttachmentType<'static>>> {
    let mut files = Vec::with_capacity(message.attachments.len());
    for attachment in &message.attachments {
        let data = attachment
            .download()
            .await
            .with_context(|| format!("Failed to download attachment {}", attachment.filename))?;
        files.push(AttachmentType::Bytes {
            data: Cow::Owned(data),
            filename: attachment.filename.clone(),
        });
    }
    Ok(files)
}

/// Relay a guild message through a character when it starts with one of the
/// author's character prefixes
///
/// Returns whether the message was relayed. Discord failures after a match
/// are logged rather than returned.
pub async fn relay_message(
    ctx: &Context,
    characters: &CharacterManager,
    message: &Message,
) -> Result<bool> {
    if message.author.bot || message.webhook_id.is_some() || message.guild_id.is_none() {
        return Ok(false);
    }

    let owned = characters.get_all(message.author.id.0).await?;
    let Some((character, body)) =
        prepare_relay(&owned, &message.content, !message.attachments.is_empty())
    else {
        return Ok(false);
    };

    if !can_relay(ctx, message) {
        debug!("Skipping relay in channel {}: unsupported channel or missing permissions", message.channel_id);
        return Ok(false);
    }

    let database = characters.database();

    let preview = match message.referenced_message.as_deref() {
        Some(replied) => match preview_for(database, replied).await {
            Ok(preview) => Some(preview),
            Err(e) => {
                warn!("Failed to build reply preview: {e}");
                None
            }
        },
        None => None,
    };

    let webhook = match characters.webhook_for(ctx, message.channel_id).await {
        Ok(webhook) => webhook,
        Err(e) => {
            error!("Failed to fetch or create webhook in {}: {e:#}", message.channel_id);
            return Ok(false);
        }
    };

    let files = match download_attachments(message).await {
        Ok(files) => files,
        Err(e) => {
            error!("{e:#}");
            return Ok(false);
        }
    };

    if let Err(e) = message.delete(&ctx.http).await {
        error!("Failed to delete message {} before relaying: {e}", message.id);
        return Ok(false);
    }

    let content = compose(preview.as_deref(), &body);
    let sent = webhook
        .execute(&ctx.http, true, |w| {
            w.username(character.display_name()).content(&content);
            if let Some(avatar_url) = &character.avatar_url {
                w.avatar_url(avatar_url);
            }
            w.add_files(files)
        })
        .await;

    let sent = match sent {
        Ok(Some(sent)) => sent,
        Ok(None) => return Ok(true),
        Err(e) => {
            // a stale webhook is refetched next time
            characters.forget_webhook(message.channel_id);
            error!("Failed to send webhook message as {}: {e}", character.tag);
            return Ok(false);
        }
    };

    database
        .insert_character_message(&CharacterMessage {
            id: sent.id.0,
            content: body,
            replied_message_id: message.referenced_message.as_ref().map(|m| m.id.0),
            character_id: Some(character.id.clone()),
        })
        .await?;

    Ok(true)
}

/// Replace the content of a relayed message, keeping its reply preview
pub async fn edit_relayed_message(
    ctx: &Context,
    characters: &CharacterManager,
    channel_id: ChannelId,
    stored: &CharacterMessage,
    content: &str,
) -> Result<()> {
    let body = neutralize_mass_mentions(content.trim());
    anyhow::ensure!(!body.is_empty(), "Relayed message content cannot be empty");
    anyhow::ensure!(
        body.chars().count() <= MAX_MESSAGE_CONTENT_LENGTH,
        "Relayed message content exceeds {MAX_MESSAGE_CONTENT_LENGTH} characters"
    );

    let database = characters.database();

    let preview = match stored.replied_message_id {
        Some(replied_id) => match channel_id.message(&ctx.http, replied_id).await {
            Ok(replied) => Some(preview_for(database, &replied).await?),
            Err(e) => {
                debug!("Replied message {replied_id} is gone: {e}");
                None
            }
        },
        None => None,
    };

    let webhook = characters.webhook_for(ctx, channel_id).await?;
    let content = compose(preview.as_deref(), &body);

    webhook
        .edit_message(&ctx.http, MessageId(stored.id), |m| m.content(&content))
        .await
        .context("Failed to edit webhook message")?;

    database.update_character_message_content(stored.id, &body).await?;
    Ok(())
}

/// A relayed message if `user_id` owns the character that sent it
pub async fn find_owned_message(
    database: &Database,
    message_id: u64,
    user_id: u64,
) -> Result<Option<(CharacterMessage, Character)>> {
    Ok(match database.get_character_message(message_id).await? {
        Some((stored, Some(character))) if character.user_id == user_id => {
            Some((stored, character))
        }
        _ => None,
    })
}

/// Delete a relayed message and its stored row
pub async fn delete_relayed_message(
    ctx: &Context,
    database: &Database,
    channel_id: ChannelId,
    message_id: u64,
) -> Result<()> {
    channel_id
        .delete_message(&ctx.http, message_id)
        .await
        .context("Failed to delete relayed message")?;
    database.delete_character_message(message_id).await?;
    Ok(())
}
