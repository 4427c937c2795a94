//! Hybrid invocation context
//!
//! One handler body replies through [`HybridContext::send`] whether it was
//! invoked as a slash command or as a prefix text command.
//!
//! - **Version**: 1.4.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.4.0: Delete previously sent replies
//! - 1.3.0: Edit previously sent replies
//! - 1.2.0: Follow-up messages after the first interaction reply
//! - 1.1.0: Structured reply payload with embeds, components and files
//! - 1.0.0: Initial slash/prefix context

use anyhow::{Context as _, Result};
use serenity::builder::{
    CreateComponents, CreateEmbed, CreateInteractionResponseData,
    CreateInteractionResponseFollowup, CreateMessage, EditMessage,
};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::{AttachmentType, Message};
use serenity::model::id::{ChannelId, GuildId};
use serenity::model::user::User;
use serenity::prelude::Context;
use std::sync::atomic::{AtomicBool, Ordering};

/// Outbound reply accepted by every invocation surface
#[derive(Clone, Default)]
pub struct ReplyPayload {
    pub content: Option<String>,
    pub embeds: Vec<CreateEmbed>,
    pub components: Option<CreateComponents>,
    pub files: Vec<AttachmentType<'static>>,
    /// Only honoured for interactions
    pub ephemeral: bool,
}

impl ReplyPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn embed(mut self, embed: CreateEmbed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn components(mut self, components: CreateComponents) -> Self {
        self.components = Some(components);
        self
    }

    pub fn file(mut self, file: AttachmentType<'static>) -> Self {
        self.files.push(file);
        self
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    pub fn apply_to_response<'a, 'b>(
        self,
        data: &'b mut CreateInteractionResponseData<'a>,
    ) -> &'b mut CreateInteractionResponseData<'a> {
        if let Some(content) = self.content {
            data.content(content);
        }
        if !self.embeds.is_empty() {
            data.set_embeds(self.embeds);
        }
        if let Some(components) = self.components {
            data.set_components(components);
        }
        if !self.files.is_empty() {
            data.add_files(self.files);
        }
        data.ephemeral(self.ephemeral)
    }

    pub fn apply_to_followup<'a, 'b>(
        self,
        followup: &'b mut CreateInteractionResponseFollowup<'a>,
    ) -> &'b mut CreateInteractionResponseFollowup<'a> {
        if let Some(content) = self.content {
            followup.content(content);
        }
        if !self.embeds.is_empty() {
            followup.add_embeds(self.embeds);
        }
        if let Some(components) = self.components {
            followup.set_components(components);
        }
        if !self.files.is_empty() {
            followup.add_files(self.files);
        }
        followup.ephemeral(self.ephemeral)
    }

    pub fn apply_to_message<'a, 'b>(
        self,
        message: &'b mut CreateMessage<'a>,
    ) -> &'b mut CreateMessage<'a> {
        if let Some(content) = self.content {
            message.content(content);
        }
        if !self.embeds.is_empty() {
            message.set_embeds(self.embeds);
        }
        if let Some(components) = self.components {
            message.set_components(components);
        }
        if !self.files.is_empty() {
            message.add_files(self.files);
        }
        message
    }

    /// Replace content, embeds and components of an existing message
    pub fn apply_to_edit<'a, 'b>(self, edit: &'b mut EditMessage<'a>) -> &'b mut EditMessage<'a> {
        edit.content(self.content.unwrap_or_default());
        edit.set_embeds(self.embeds);
        edit.set_components(self.components.unwrap_or_default());
        edit
    }
}

impl From<&str> for ReplyPayload {
    fn from(content: &str) -> Self {
        Self::new().content(content)
    }
}

impl From<String> for ReplyPayload {
    fn from(content: String) -> Self {
        Self::new().content(content)
    }
}

/// The invocation a hybrid command is serving
pub enum HybridContext<'a> {
    Interaction {
        ctx: &'a Context,
        interaction: &'a ApplicationCommandInteraction,
        replied: AtomicBool,
    },
    Message {
        ctx: &'a Context,
        message: &'a Message,
    },
}

impl<'a> HybridContext<'a> {
    pub fn interaction(ctx: &'a Context, interaction: &'a ApplicationCommandInteraction) -> Self {
        HybridContext::Interaction {
            ctx,
            interaction,
            replied: AtomicBool::new(false),
        }
    }

    pub fn message(ctx: &'a Context, message: &'a Message) -> Self {
        HybridContext::Message { ctx, message }
    }

    pub fn is_interaction(&self) -> bool {
        matches!(self, HybridContext::Interaction { .. })
    }

    pub fn is_message(&self) -> bool {
        matches!(self, HybridContext::Message { .. })
    }

    pub fn serenity(&self) -> &'a Context {
        match self {
            HybridContext::Interaction { ctx, .. } | HybridContext::Message { ctx, .. } => ctx,
        }
    }

    /// Invoking user
    pub fn user(&self) -> &'a User {
        match self {
            HybridContext::Interaction { interaction, .. } => &interaction.user,
            HybridContext::Message { message, .. } => &message.author,
        }
    }

    pub fn channel_id(&self) -> ChannelId {
        match self {
            HybridContext::Interaction { interaction, .. } => interaction.channel_id,
            HybridContext::Message { message, .. } => message.channel_id,
        }
    }

    pub fn guild_id(&self) -> Option<GuildId> {
        match self {
            HybridContext::Interaction { interaction, .. } => interaction.guild_id,
            HybridContext::Message { message, .. } => message.guild_id,
        }
    }

    /// Reply to the invocation and return the sent message
    ///
    /// Interactions get the interaction response first and follow-ups after
    /// that; messages get a new message in the invoking channel.
    pub async fn send(&self, payload: impl Into<ReplyPayload>) -> Result<Message> {
        let payload = payload.into();

        match self {
            HybridContext::Interaction {
                ctx,
                interaction,
                replied,
            } => {
                if replied.swap(true, Ordering::SeqCst) {
                    return interaction
                        .create_followup_message(&ctx.http, |followup| {
                            payload.apply_to_followup(followup)
                        })
                        .await
                        .context("Failed to send follow-up message");
                }

                interaction
                    .create_interaction_response(&ctx.http, |response| {
                        response
                            .kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|data| payload.apply_to_response(data))
                    })
                    .await
                    .context("Failed to send interaction response")?;

                interaction
                    .get_interaction_response(&ctx.http)
                    .await
                    .context("Failed to fetch interaction response")
            }
            HybridContext::Message { ctx, message } => message
                .channel_id
                .send_message(&ctx.http, |m| payload.apply_to_message(m))
                .await
                .context("Failed to send message"),
        }
    }

    /// Edit a message previously returned by [`send`](Self::send)
    ///
    /// Attachments already on the message are kept.
    pub async fn edit(&self, message: &mut Message, payload: impl Into<ReplyPayload>) -> Result<()> {
        let payload = payload.into();

        match self {
            HybridContext::Interaction {
                ctx, interaction, ..
            } => {
                *message = interaction
                    .edit_followup_message(&ctx.http, message.id, |followup| {
                        payload.apply_to_followup(followup)
                    })
                    .await
                    .context("Failed to edit interaction message")?;
                Ok(())
            }
            HybridContext::Message { ctx, .. } => message
                .edit(*ctx, |m| payload.apply_to_edit(m))
                .await
                .context("Failed to edit message"),
        }
    }

    /// Delete a message previously returned by [`send`](Self::send)
    pub async fn delete(&self, message: &Message) -> Result<()> {
        match self {
            HybridContext::Interaction {
                ctx, interaction, ..
            } => interaction
                .delete_followup_message(&ctx.http, message.id)
                .await
                .context("Failed to delete interaction message"),
            HybridContext::Message { ctx, .. } => message
                .delete(*ctx)
                .await
                .context("Failed to delete message"),
        }
    }
}
