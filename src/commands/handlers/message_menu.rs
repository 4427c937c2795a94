//! Message context menus for character messages
//!
//! Handles: "Get character information", "Edit character's message",
//! "Delete character's message"
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.5.0
//!
//! ## Changelog
//! - 1.0.0: Initial release, edits go through the `character:edit-message` modal

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use log::{error, info};
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandType;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{ContextMenuCommand, ContextMenuCommandRecord};
use crate::commands::registry::CommandRegistry;
use crate::components::character::edit_message_modal;
use crate::features::characters::relay::{delete_relayed_message, find_owned_message};

pub const GET_INFO: &str = "Get character information";
pub const EDIT_MESSAGE: &str = "Edit character's message";
pub const DELETE_MESSAGE: &str = "Delete character's message";

fn message_menu(name: &str) -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name(name)
        .kind(CommandType::Message)
        .dm_permission(false)
        .to_owned()
}

pub fn register(registry: &mut CommandRegistry) -> Result<()> {
    registry.add_context_menu_command(ContextMenuCommandRecord::new(message_menu(GET_INFO), |context| {
        Ok(GetCharacterInfo { context })
    }))?;
    registry.add_context_menu_command(ContextMenuCommandRecord::new(
        message_menu(EDIT_MESSAGE),
        |context| Ok(EditCharacterMessage { context }),
    ))?;
    registry.add_context_menu_command(ContextMenuCommandRecord::new(
        message_menu(DELETE_MESSAGE),
        |context| Ok(DeleteCharacterMessage { context }),
    ))?;
    Ok(())
}

fn target_message(interaction: &ApplicationCommandInteraction) -> Result<&Message> {
    interaction
        .data
        .resolved
        .messages
        .values()
        .next()
        .context("Message context menu without a target message")
}

async fn reply_ephemeral(
    ctx: &Context,
    interaction: &ApplicationCommandInteraction,
    content: &str,
) -> Result<()> {
    interaction
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|data| data.content(content).ephemeral(true))
        })
        .await
        .context("Failed to send interaction response")
}

async fn follow_up(ctx: &Context, interaction: &ApplicationCommandInteraction, content: &str) -> Result<()> {
    interaction
        .create_followup_message(&ctx.http, |f| f.content(content).ephemeral(true))
        .await
        .context("Failed to send follow-up message")?;
    Ok(())
}

pub struct GetCharacterInfo {
    context: Arc<CommandContext>,
}

#[async_trait]
impl ContextMenuCommand for GetCharacterInfo {
    async fn execute(&self, ctx: &Context, interaction: &ApplicationCommandInteraction) -> Result<()> {
        let target = target_message(interaction)?;

        match self.context.database.get_character_message(target.id.0).await? {
            None => {
                reply_ephemeral(
                    ctx,
                    interaction,
                    "This message is not sent by a character or not in my database.",
                )
                .await
            }
            Some((_, None)) => {
                reply_ephemeral(ctx, interaction, "This character doesn't exist anymore.").await
            }
            Some((_, Some(character))) => interaction
                .create_interaction_response(&ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|data| {
                            data.add_embed(character.information_embed()).ephemeral(true)
                        })
                })
                .await
                .context("Failed to send character information"),
        }
    }
}

pub struct EditCharacterMessage {
    context: Arc<CommandContext>,
}

#[async_trait]
impl ContextMenuCommand for EditCharacterMessage {
    async fn execute(&self, ctx: &Context, interaction: &ApplicationCommandInteraction) -> Result<()> {
        let target = target_message(interaction)?;

        let owned = find_owned_message(&self.context.database, target.id.0, interaction.user.id.0).await?;
        let Some((stored, _)) = owned else {
            return reply_ephemeral(ctx, interaction, "You can't edit this message.").await;
        };

        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::Modal)
                    .interaction_response_data(|data| {
                        edit_message_modal(data, stored.id, &stored.content)
                    })
            })
            .await
            .context("Failed to open edit modal")
    }
}

pub struct DeleteCharacterMessage {
    context: Arc<CommandContext>,
}

#[async_trait]
impl ContextMenuCommand for DeleteCharacterMessage {
    async fn execute(&self, ctx: &Context, interaction: &ApplicationCommandInteraction) -> Result<()> {
        let target = target_message(interaction)?;

        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::DeferredChannelMessageWithSource)
                    .interaction_response_data(|data| data.ephemeral(true))
            })
            .await
            .context("Failed to defer interaction")?;

        if target.webhook_id.is_none() {
            return follow_up(ctx, interaction, "This message isn't sent by a character.").await;
        }

        let database = &self.context.database;
        let character = match database.get_character_message(target.id.0).await? {
            None => {
                return follow_up(
                    ctx,
                    interaction,
                    "This message isn't sent by a character or isn't in the database.",
                )
                .await;
            }
            Some((_, character)) => character,
        };

        let Some(character) = character.filter(|c| c.user_id == interaction.user.id.0) else {
            return follow_up(ctx, interaction, "You don't have permissions to delete this message.")
                .await;
        };

        if let Err(e) = delete_relayed_message(ctx, database, interaction.channel_id, target.id.0).await {
            error!("Failed to delete character message {}: {e:#}", target.id);
            return follow_up(ctx, interaction, "Failed to delete character message.").await;
        }

        info!(
            "🗑️ {} deleted message {} of character {}",
            interaction.user.name, target.id, character.tag
        );
        interaction
            .delete_original_interaction_response(&ctx.http)
            .await
            .context("Failed to remove deferred response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_menus_are_message_commands() {
        for name in [GET_INFO, EDIT_MESSAGE, DELETE_MESSAGE] {
            let data = message_menu(name);
            assert_eq!(data.0["name"], json!(name));
            assert_eq!(data.0["type"], json!(3));
            assert!(data.0.get("description").is_none());
        }
    }

    #[test]
    fn test_register_adds_three_menus() {
        let mut registry = CommandRegistry::new();
        register(&mut registry).unwrap();
        assert_eq!(registry.context_menu_commands().len(), 3);
    }
}
