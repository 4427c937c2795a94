//! Character message components
//!
//! Owns the `character` custom id prefix. The edit-message modal opened by the
//! "Edit character's message" context menu submits here.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.5.0
//!
//! ## Changelog
//! - 1.0.0: Edit-message modal

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use log::info;
use serenity::builder::CreateInteractionResponseData;
use serenity::model::application::component::{ActionRowComponent, InputTextStyle};
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;

use super::registry::{ComponentRecord, ComponentRegistry};
use super::Component;
use crate::commands::context::CommandContext;
use crate::features::characters::{
    edit_relayed_message, relay::find_owned_message, MAX_MESSAGE_CONTENT_LENGTH,
};

pub const CHARACTER_PREFIX: &str = "character";
const EDIT_MESSAGE: &str = "edit-message";
const CONTENT_INPUT: &str = "content";

pub fn register(registry: &mut ComponentRegistry) -> Result<()> {
    registry.add_component(ComponentRecord::new(CHARACTER_PREFIX, |context| {
        Ok(CharacterComponent { context })
    }))?;
    Ok(())
}

/// Custom id of the modal editing relayed message `message_id`
pub fn edit_modal_id(message_id: u64) -> String {
    format!("{CHARACTER_PREFIX}:{EDIT_MESSAGE}:{message_id}")
}

/// Fill a modal response editing a relayed message, prefilled with `content`
pub fn edit_message_modal<'a, 'b>(
    data: &'b mut CreateInteractionResponseData<'a>,
    message_id: u64,
    content: &str,
) -> &'b mut CreateInteractionResponseData<'a> {
    data.custom_id(edit_modal_id(message_id))
        .title("Edit message")
        .components(|c| {
            c.create_action_row(|row| {
                row.create_input_text(|input| {
                    input
                        .custom_id(CONTENT_INPUT)
                        .label("Content")
                        .style(InputTextStyle::Paragraph)
                        .value(content)
                        .required(true)
                        .min_length(1)
                        .max_length(MAX_MESSAGE_CONTENT_LENGTH as u64)
                })
            })
        })
}

fn input_value(interaction: &ModalSubmitInteraction, custom_id: &str) -> Option<String> {
    interaction
        .data
        .components
        .iter()
        .flat_map(|row| &row.components)
        .find_map(|component| match component {
            ActionRowComponent::InputText(input) if input.custom_id == custom_id => {
                Some(input.value.clone())
            }
            _ => None,
        })
}

pub struct CharacterComponent {
    context: Arc<CommandContext>,
}

impl CharacterComponent {
    async fn reply(&self, ctx: &Context, interaction: &ModalSubmitInteraction, content: &str) -> Result<()> {
        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|data| data.content(content).ephemeral(true))
            })
            .await
            .context("Failed to answer modal")
    }

    async fn edit_message(
        &self,
        ctx: &Context,
        interaction: &ModalSubmitInteraction,
        message_id: u64,
    ) -> Result<()> {
        let content = input_value(interaction, CONTENT_INPUT).unwrap_or_default();
        if content.trim().is_empty() {
            return self.reply(ctx, interaction, "The message can't be empty.").await;
        }

        let owned = find_owned_message(&self.context.database, message_id, interaction.user.id.0).await?;
        let Some((stored, character)) = owned else {
            return self
                .reply(ctx, interaction, "You can only edit messages sent by your characters.")
                .await;
        };

        edit_relayed_message(ctx, &self.context.characters, interaction.channel_id, &stored, &content)
            .await?;
        info!(
            "✏️ {} edited message {message_id} of character {}",
            interaction.user.name, character.tag
        );

        self.reply(ctx, interaction, "Message edited.").await
    }
}

#[async_trait]
impl Component for CharacterComponent {
    async fn execute_modal_submit(
        &self,
        ctx: &Context,
        interaction: &ModalSubmitInteraction,
        args: &[&str],
    ) -> Result<()> {
        match args {
            [EDIT_MESSAGE, id] => {
                let message_id = id.parse().context("Invalid message id in modal")?;
                self.edit_message(ctx, interaction, message_id).await
            }
            _ => Ok(()),
        }
    }
}
