//! Delete a relayed character message
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
use crate::features::characters::relay::{delete_relayed_message, find_owned_message};

pub fn register(registry: &mut CommandRegistry) -> Result<()> {
    registry.add_prefix_command(PrefixCommandRecord::new(&["delete", "del"], DeleteCommand::new))?;
    Ok(())
}

pub struct DeleteCommand {
    context: Arc<CommandContext>,
    arguments: ArgumentList,
}

impl DeleteCommand {
    pub fn new(context: Arc<CommandContext>) -> Result<Self> {
        let arguments = ArgumentList::of(vec![Argument::string("message")
            .description("Message link or ID to delete")
            .build()?])?;
        Ok(Self { context, arguments })
    }
}

#[async_trait]
impl PrefixCommand for DeleteCommand {
    fn arguments(&self) -> Option<&ArgumentList> {
        Some(&self.arguments)
    }

    async fn execute(&self, ctx: &Context, message: &Message, args: &ArgumentResolver) -> Result<()> {
        let target_id = args.get_string("message")?.and_then(extract_last_id);
        let Some(target) = target_message(ctx, message, target_id, "delete").await? else {
            return Ok(());
        };

        let owned = find_owned_message(&self.context.database, target.id.0, message.author.id.0).await?;
        let Some((_, character)) = owned else {
            message
                .channel_id
                .say(&ctx.http, "You can't delete this message.")
                .await
                .context("Failed to send reply")?;
            return Ok(());
        };

        message
            .delete(&ctx.http)
            .await
            .context("Failed to delete command message")?;
        delete_relayed_message(ctx, &self.context.database, message.channel_id, target.id.0).await?;

        info!(
            "🗑️ {} deleted message {} of character {}",
            message.author.name, target.id, character.tag
        );
        Ok(())
    }
}
