//! Help command
//!
//! - **Version**: 2.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.1.0: Usage shown with the server's prefix
//! - 2.0.0: Hybrid command listing character usage
//! - 1.0.0: Slash-only command list

use anyhow::Result;
use async_trait::async_trait;
use serenity::builder::{CreateApplicationCommand, CreateEmbed};
use serenity::model::Timestamp;
use std::sync::Arc;

use crate::commands::argument::ArgumentResolver;
use crate::commands::context::CommandContext;
use crate::commands::handler::{HybridCommand, HybridCommandRecord};
use crate::commands::hybrid::{HybridContext, ReplyPayload};
use crate::commands::registry::CommandRegistry;
use crate::features::characters::CHARACTER_COLOR;

pub fn register(registry: &mut CommandRegistry) -> Result<()> {
    let data = CreateApplicationCommand::default()
        .name("help")
        .description("Shows how to use the bot.")
        .dm_permission(false)
        .to_owned();

    registry.add_hybrid_command(HybridCommandRecord::new(data, &["help", "h"], |context| {
        Ok(HelpCommand { context })
    }))?;
    Ok(())
}

pub fn help_text(prefix: &str) -> String {
    format!(
        r#"**Characters**
`{prefix}char create <tag>` - Create a character
`{prefix}char list [user]` - List characters
`{prefix}char info [user] <tag>` - Show a character
`{prefix}char edit <tag> name <name...>` - Rename a character
`{prefix}char edit <tag> tag <tag>` - Change a character's tag
`{prefix}char edit <tag> prefix <prefix>` - Set the prefix you type to speak as the character
`{prefix}char edit <tag> avatar [url]` - Set an avatar from an attachment or image link
`{prefix}char delete <tag>` - Delete a character

**Character messages**
`{prefix}edit [message] <content...>` - Edit a character message (or reply to it)
`{prefix}delete [message]` - Delete a character message (or reply to it)
Right-click a character message for info, edit and delete shortcuts.

**Server**
`{prefix}prefix [new prefix]` - Show or change this server's prefix
`{prefix}info` - About the bot

Every `{prefix}char` command is also available as `/character`."#
    )
}

pub struct HelpCommand {
    context: Arc<CommandContext>,
}

#[async_trait]
impl HybridCommand for HelpCommand {
    async fn execute(&self, context: &HybridContext<'_>, _args: &ArgumentResolver) -> Result<()> {
        let mut embed = CreateEmbed::default();
        embed
            .title("Zent")
            .description(help_text(&self.context.prefix_in(context.guild_id()).await))
            .color(CHARACTER_COLOR)
            .timestamp(Timestamp::now());

        context.send(ReplyPayload::new().embed(embed)).await?;
        Ok(())
    }
}
