//! Command handler traits and registration records
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 2.0.0: Split into prefix, slash, context-menu and hybrid command traits
//! - 1.0.0: Initial slash command handler trait

use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::autocomplete::AutocompleteInteraction;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::any::type_name;
use std::sync::Arc;

use super::argument::{ArgumentList, ArgumentResolver};
use super::context::CommandContext;
use super::hybrid::HybridContext;
use super::subcommand::SubcommandManager;

/// Text command invoked by a prefixed trigger
///
/// # Example
///
/// ```ignore
/// pub struct DeleteCommand {
///     arguments: ArgumentList,
/// }
///
/// #[async_trait]
/// impl PrefixCommand for DeleteCommand {
///     fn arguments(&self) -> Option<&ArgumentList> {
///         Some(&self.arguments)
///     }
///
///     async fn execute(&self, ctx: &Context, message: &Message, args: &ArgumentResolver) -> Result<()> {
///         let target = args.get_string("message")?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait PrefixCommand: Send + Sync {
    /// Arguments resolved before `execute`
    fn arguments(&self) -> Option<&ArgumentList> {
        None
    }

    async fn execute(&self, ctx: &Context, message: &Message, args: &ArgumentResolver)
        -> Result<()>;

    fn subcommands(&self) -> Option<&SubcommandManager> {
        None
    }

    /// Run the subcommand registered under `key`
    async fn run_subcommand(
        &self,
        key: &str,
        _ctx: &Context,
        _message: &Message,
        _args: &ArgumentResolver,
    ) -> Result<()> {
        warn!("Subcommand '{key}' has no implementation");
        Ok(())
    }
}

/// Slash (chat-input) command
#[async_trait]
pub trait SlashCommand: Send + Sync {
    async fn execute(&self, ctx: &Context, interaction: &ApplicationCommandInteraction)
        -> Result<()>;

    fn subcommands(&self) -> Option<&SubcommandManager> {
        None
    }

    async fn run_subcommand(
        &self,
        key: &str,
        _ctx: &Context,
        _interaction: &ApplicationCommandInteraction,
        _args: &ArgumentResolver,
    ) -> Result<()> {
        warn!("Subcommand '{key}' has no implementation");
        Ok(())
    }

    async fn autocomplete(&self, _ctx: &Context, interaction: &AutocompleteInteraction) -> Result<()> {
        warn!("Command '{}' does not support autocomplete", interaction.data.name);
        Ok(())
    }
}

/// User or message context-menu command
#[async_trait]
pub trait ContextMenuCommand: Send + Sync {
    async fn execute(&self, ctx: &Context, interaction: &ApplicationCommandInteraction)
        -> Result<()>;
}

/// Command served from both a slash interaction and a prefix trigger
#[async_trait]
pub trait HybridCommand: Send + Sync {
    /// Arguments resolved before `execute`
    fn arguments(&self) -> Option<&ArgumentList> {
        None
    }

    async fn execute(&self, context: &HybridContext<'_>, args: &ArgumentResolver) -> Result<()>;

    fn subcommands(&self) -> Option<&SubcommandManager> {
        None
    }

    async fn run_subcommand(
        &self,
        key: &str,
        _context: &HybridContext<'_>,
        _args: &ArgumentResolver,
    ) -> Result<()> {
        warn!("Subcommand '{key}' has no implementation");
        Ok(())
    }

    async fn autocomplete(&self, _ctx: &Context, interaction: &AutocompleteInteraction) -> Result<()> {
        warn!("Command '{}' does not support autocomplete", interaction.data.name);
        Ok(())
    }
}

/// Builds a handler instance from the shared context
pub type Factory<T> = Arc<dyn Fn(Arc<CommandContext>) -> Result<Arc<T>> + Send + Sync>;

pub struct PrefixCommandRecord {
    /// Registering type, for logs
    pub name: &'static str,
    pub triggers: Vec<String>,
    pub guild_ids: Vec<u64>,
    pub factory: Factory<dyn PrefixCommand>,
}

impl PrefixCommandRecord {
    pub fn new<C, F>(triggers: &[&str], build: F) -> Self
    where
        C: PrefixCommand + 'static,
        F: Fn(Arc<CommandContext>) -> Result<C> + Send + Sync + 'static,
    {
        Self {
            name: type_name::<C>(),
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
            guild_ids: Vec::new(),
            factory: Arc::new(move |ctx| Ok(Arc::new(build(ctx)?) as Arc<dyn PrefixCommand>)),
        }
    }

    pub fn guild_ids(mut self, guild_ids: &[u64]) -> Self {
        self.guild_ids = guild_ids.to_vec();
        self
    }
}

pub struct SlashCommandRecord {
    pub name: &'static str,
    pub data: CreateApplicationCommand,
    pub guild_ids: Vec<u64>,
    pub factory: Factory<dyn SlashCommand>,
}

impl SlashCommandRecord {
    pub fn new<C, F>(data: CreateApplicationCommand, build: F) -> Self
    where
        C: SlashCommand + 'static,
        F: Fn(Arc<CommandContext>) -> Result<C> + Send + Sync + 'static,
    {
        Self {
            name: type_name::<C>(),
            data,
            guild_ids: Vec::new(),
            factory: Arc::new(move |ctx| Ok(Arc::new(build(ctx)?) as Arc<dyn SlashCommand>)),
        }
    }

    pub fn guild_ids(mut self, guild_ids: &[u64]) -> Self {
        self.guild_ids = guild_ids.to_vec();
        self
    }
}

pub struct ContextMenuCommandRecord {
    pub name: &'static str,
    pub data: CreateApplicationCommand,
    pub guild_ids: Vec<u64>,
    pub factory: Factory<dyn ContextMenuCommand>,
}

impl ContextMenuCommandRecord {
    pub fn new<C, F>(data: CreateApplicationCommand, build: F) -> Self
    where
        C: ContextMenuCommand + 'static,
        F: Fn(Arc<CommandContext>) -> Result<C> + Send + Sync + 'static,
    {
        Self {
            name: type_name::<C>(),
            data,
            guild_ids: Vec::new(),
            factory: Arc::new(move |ctx| {
                Ok(Arc::new(build(ctx)?) as Arc<dyn ContextMenuCommand>)
            }),
        }
    }

    pub fn guild_ids(mut self, guild_ids: &[u64]) -> Self {
        self.guild_ids = guild_ids.to_vec();
        self
    }
}

pub struct HybridCommandRecord {
    pub name: &'static str,
    pub application_command: CreateApplicationCommand,
    pub prefix_triggers: Vec<String>,
    pub guild_ids: Vec<u64>,
    pub factory: Factory<dyn HybridCommand>,
}

impl HybridCommandRecord {
    pub fn new<C, F>(
        application_command: CreateApplicationCommand,
        prefix_triggers: &[&str],
        build: F,
    ) -> Self
    where
        C: HybridCommand + 'static,
        F: Fn(Arc<CommandContext>) -> Result<C> + Send + Sync + 'static,
    {
        Self {
            name: type_name::<C>(),
            application_command,
            prefix_triggers: prefix_triggers.iter().map(|t| t.to_string()).collect(),
            guild_ids: Vec::new(),
            factory: Arc::new(move |ctx| Ok(Arc::new(build(ctx)?) as Arc<dyn HybridCommand>)),
        }
    }

    pub fn guild_ids(mut self, guild_ids: &[u64]) -> Self {
        self.guild_ids = guild_ids.to_vec();
        self
    }
}

/// Name declared in an application command schema
pub fn schema_name(data: &CreateApplicationCommand) -> Option<&str> {
    data.0.get("name").and_then(|name| name.as_str())
}
