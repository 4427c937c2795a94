//! Prefix command
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.6.0
//!
//! ## Changelog
//! - 1.0.0: Show or set the text command prefix of a server

use anyhow::Result;
use async_trait::async_trait;
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;
use std::sync::Arc;

use crate::commands::argument::{Argument, ArgumentList, ArgumentResolver};
use crate::commands::context::CommandContext;
use crate::commands::handler::{HybridCommand, HybridCommandRecord};
use crate::commands::hybrid::{HybridContext, ReplyPayload};
use crate::commands::registry::CommandRegistry;
use crate::features::guilds::{validate_prefix, MAX_GUILD_PREFIX_LENGTH};

pub fn register(registry: &mut CommandRegistry) -> Result<()> {
    let data = CreateApplicationCommand::default()
        .name("prefix")
        .description("Display the current prefix or set a new one for this server")
        .dm_permission(false)
        .create_option(|option| {
            option
                .name("new-prefix")
                .description("New prefix to modify")
                .kind(CommandOptionType::String)
                .max_length(MAX_GUILD_PREFIX_LENGTH as u16)
        })
        .to_owned();

    registry.add_hybrid_command(HybridCommandRecord::new(
        data,
        &["prefix"],
        GuildPrefixCommand::new,
    ))?;
    Ok(())
}

pub struct GuildPrefixCommand {
    context: Arc<CommandContext>,
    arguments: ArgumentList,
}

impl GuildPrefixCommand {
    pub fn new(context: Arc<CommandContext>) -> Result<Self> {
        let arguments = ArgumentList::of(vec![Argument::string("new-prefix")
            .description("New prefix to modify")
            .build()?])?;
        Ok(Self { context, arguments })
    }
}

#[async_trait]
impl HybridCommand for GuildPrefixCommand {
    fn arguments(&self) -> Option<&ArgumentList> {
        Some(&self.arguments)
    }

    async fn execute(&self, context: &HybridContext<'_>, args: &ArgumentResolver) -> Result<()> {
        let Some(guild_id) = context.guild_id() else {
            context
                .send(ReplyPayload::new().content("This command only works in servers.").ephemeral())
                .await?;
            return Ok(());
        };
        let guilds = &self.context.guilds;

        let Some(new_prefix) = args.get_string("new-prefix")? else {
            let current = guilds.prefix_for(Some(guild_id.0), self.context.prefix()).await?;
            context
                .send(format!("The current prefix of this server is `{current}`"))
                .await?;
            return Ok(());
        };

        if let Err(reason) = validate_prefix(new_prefix) {
            context.send(ReplyPayload::new().content(reason).ephemeral()).await?;
            return Ok(());
        }

        guilds.set_prefix(guild_id.0, new_prefix).await?;
        context
            .send(format!("Successfully set prefix of this server to `{new_prefix}`"))
            .await?;
        Ok(())
    }
}
