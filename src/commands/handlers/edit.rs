//! Edit a relayed character message
//!
//! `edit [message] <content...>`, targeting the replied message when no
//! message id or link is given.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.5.0
//!
//! ## Changelog
//! - 1.0.0: Initial release

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use log::info;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::sync::Arc;

use super::target_message;
use crate::commands::argument::{Argument, ArgumentList, ArgumentResolver};
use crate::commands::context::CommandContext;
use crate::commands::handler::{PrefixCommand, PrefixCommandRecord};
use crate::commands::registry::CommandRegistry;
use crate::core::extract_last_id;
use crate::features::characters::relay::find_owned_message;
use crate::features::characters::{edit_relayed_message, MAX_MESSAGE_CONTENT_LENGTH};

pub fn register(registry: &mut CommandRegistry) -> Result<()> {
    registry.add_prefix_command(PrefixCommandRecord::new(&["edit"], EditCommand::new))?;
    Ok(())
}

/// Split the optional message argument from the new content
///
/// A first token without a message id is part of the content.
pub fn split_target(raw_message: Option<&str>, content: &[&str]) -> (Option<u64>, String) {
    match raw_message {
        Some(raw) => match extract_last_id(raw) {
            Some(id) => (Some(id), content.join(" ")),
            None => {
                let mut words = vec![raw];
                words.extend_from_slice(content);
                (None, words.join(" "))
            }
        },
        None => (None, content.join(" ")),
    }
}

pub struct EditCommand {
    context: Arc<CommandContext>,
    arguments: ArgumentList,
}

impl EditCommand {
    pub fn new(context: Arc<CommandContext>) -> Result<Self> {
        let arguments = ArgumentList::of(vec![
            Argument::string("message")
                .description("Message link or ID to edit")
                .build()?,
            Argument::string("content")
                .description("Content to edit")
                .required()
                .tuple()
                .build()?,
        ])?;
        Ok(Self { context, arguments })
    }

    async fn say(&self, ctx: &Context, message: &Message, content: &str) -> Result<()> {
        message
            .channel_id
            .say(&ctx.http, content)
            .await
            .context("Failed to send reply")?;
        Ok(())
    }
}

#[async_trait]
impl PrefixCommand for EditCommand {
    fn arguments(&self) -> Option<&ArgumentList> {
        Some(&self.arguments)
    }

    async fn execute(&self, ctx: &Context, message: &Message, args: &ArgumentResolver) -> Result<()> {
        let (target_id, content) = split_target(args.get_string("message")?, &args.get_strings("content")?);

        if content.chars().count() > MAX_MESSAGE_CONTENT_LENGTH {
            return self
                .say(
                    ctx,
                    message,
                    &format!("Character messages can be at most {MAX_MESSAGE_CONTENT_LENGTH} characters long."),
                )
                .await;
        }

        let Some(target) = target_message(ctx, message, target_id, "edit").await? else {
            return Ok(());
        };

        let owned = find_owned_message(&self.context.database, target.id.0, message.author.id.0).await?;
        let Some((stored, character)) = owned else {
            return self.say(ctx, message, "You can't edit this message.").await;
        };

        let webhook = self.context.characters.webhook_for(ctx, message.channel_id).await?;
        if target.webhook_id != Some(webhook.id) {
            return self
                .say(ctx, message, "Couldn't edit this message since the original webhook is deleted.")
                .await;
        }

        message
            .delete(&ctx.http)
            .await
            .context("Failed to delete edit command message")?;

        edit_relayed_message(ctx, &self.context.characters, message.channel_id, &stored, &content).await?;
        info!(
            "✏️ {} edited message {} of character {}",
            message.author.name, target.id, character.tag
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::testing::test_context;

    #[test]
    fn test_split_target_with_link() {
        let (id, content) = split_target(
            Some("https://discord.com/channels/111111111111111111/222222222222222222/333333333333333333"),
            &["new", "text"],
        );
        assert_eq!(id, Some(333333333333333333));
        assert_eq!(content, "new text");
    }

    #[test]
    fn test_split_target_without_id_keeps_word() {
        let (id, content) = split_target(Some("hello"), &["there"]);
        assert_eq!(id, None);
        assert_eq!(content, "hello there");

        assert_eq!(split_target(None, &["only"]), (None, "only".to_string()));
    }

    #[test]
    fn test_arguments_are_valid() {
        let command = EditCommand::new(test_context()).unwrap();
        let arguments = command.arguments().unwrap();
        assert!(arguments.has_tuple());
        assert_eq!(arguments.len(), 2);
    }
}
