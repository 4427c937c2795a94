//! Command manager: dispatch tables and routing
//!
//! - **Version**: 2.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 2.1.0: Load report, guild-scoped prefix routes, per-guild prefixes
//! - 2.0.0: Dispatch tables built from the frozen registry, hybrid routing
//! - 1.0.0: Slash command routing

use anyhow::{Context as _, Result};
use log::{debug, error, info, warn};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::autocomplete::AutocompleteInteraction;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::argument::{ArgumentList, ArgumentResolver};
use super::context::CommandContext;
use super::failure::{report_failure, FailedInteraction};
use super::handler::{
    schema_name, ContextMenuCommand, HybridCommand, PrefixCommand, SlashCommand,
};
use super::hybrid::HybridContext;
use super::options::subcommand_path;
use super::registry::CommandRegistry;
use crate::core::error::ConfigError;
use crate::core::truncate_for_message;

pub enum SlashEntry {
    Slash(Arc<dyn SlashCommand>),
    Hybrid(Arc<dyn HybridCommand>),
}

pub enum PrefixEntry {
    Prefix(Arc<dyn PrefixCommand>),
    Hybrid(Arc<dyn HybridCommand>),
}

struct PrefixRoute {
    entry: PrefixEntry,
    /// Empty means every guild and direct messages
    guild_ids: Arc<[u64]>,
}

impl PrefixRoute {
    fn available_in(&self, guild_id: Option<u64>) -> bool {
        self.guild_ids.is_empty() || guild_id.is_some_and(|id| self.guild_ids.contains(&id))
    }
}

/// Registered out of declared, for one command kind
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub registered: usize,
    pub total: usize,
}

/// Outcome of building the dispatch tables
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub prefix: Tally,
    pub slash: Tally,
    pub context_menu: Tally,
    pub hybrid: Tally,
    /// Hybrid commands that lost some of their routes to earlier registrations
    pub partial_hybrids: Vec<&'static str>,
}

/// Routes gateway events to command handlers
///
/// Built once from a frozen [`CommandRegistry`] and shared read-only.
pub struct CommandManager {
    context: Arc<CommandContext>,
    slash_commands: HashMap<String, SlashEntry>,
    prefix_commands: HashMap<String, PrefixRoute>,
    context_menu_commands: HashMap<String, Arc<dyn ContextMenuCommand>>,
    report: LoadReport,
}

/// Instantiate a handler; configuration errors abort, anything else skips it
pub(crate) fn instantiate<T: ?Sized>(
    name: &str,
    factory: &super::handler::Factory<T>,
    context: &Arc<CommandContext>,
) -> Result<Option<Arc<T>>> {
    match factory(context.clone()) {
        Ok(command) => Ok(Some(command)),
        Err(e) if e.downcast_ref::<ConfigError>().is_some() => {
            Err(e.context(format!("Invalid command definition in {name}")))
        }
        Err(e) => {
            error!("❌ Failed to instantiate {name}: {e:#}");
            Ok(None)
        }
    }
}

/// Insert unless the key is taken; the first registration wins
fn insert_unique<V>(table: &mut HashMap<String, V>, key: String, value: V, owner: &str) -> bool {
    match table.entry(key) {
        Entry::Occupied(entry) => {
            warn!("⚠️ Duplicate command key '{}' from {owner} ignored", entry.key());
            false
        }
        Entry::Vacant(entry) => {
            entry.insert(value);
            true
        }
    }
}

impl CommandManager {
    pub fn load(registry: &CommandRegistry, context: Arc<CommandContext>) -> Result<Self> {
        let mut manager = Self {
            context: context.clone(),
            slash_commands: HashMap::new(),
            prefix_commands: HashMap::new(),
            context_menu_commands: HashMap::new(),
            report: LoadReport::default(),
        };
        let mut report = LoadReport::default();

        report.prefix.total = registry.prefix_commands().len();
        for record in registry.prefix_commands() {
            let Some(command) = instantiate(record.name, &record.factory, &context)? else {
                continue;
            };
            let guild_ids: Arc<[u64]> = record.guild_ids.as_slice().into();
            let mut any = false;
            for trigger in &record.triggers {
                any |= insert_unique(
                    &mut manager.prefix_commands,
                    trigger.to_lowercase(),
                    PrefixRoute {
                        entry: PrefixEntry::Prefix(command.clone()),
                        guild_ids: guild_ids.clone(),
                    },
                    record.name,
                );
            }
            report.prefix.registered += usize::from(any);
        }
        info!("✅ Registered {}/{} prefix commands", report.prefix.registered, report.prefix.total);

        report.slash.total = registry.slash_commands().len();
        for record in registry.slash_commands() {
            let Some(command) = instantiate(record.name, &record.factory, &context)? else {
                continue;
            };
            let key = schema_name(&record.data)
                .ok_or_else(|| ConfigError::MissingSchemaName(record.name.to_string()))?;
            if insert_unique(
                &mut manager.slash_commands,
                key.to_string(),
                SlashEntry::Slash(command),
                record.name,
            ) {
                report.slash.registered += 1;
            }
        }
        info!("✅ Registered {}/{} slash commands", report.slash.registered, report.slash.total);

        report.context_menu.total = registry.context_menu_commands().len();
        for record in registry.context_menu_commands() {
            let Some(command) = instantiate(record.name, &record.factory, &context)? else {
                continue;
            };
            let key = schema_name(&record.data)
                .ok_or_else(|| ConfigError::MissingSchemaName(record.name.to_string()))?;
            if insert_unique(
                &mut manager.context_menu_commands,
                key.to_string(),
                command,
                record.name,
            ) {
                report.context_menu.registered += 1;
            }
        }
        info!(
            "✅ Registered {}/{} context menu commands",
            report.context_menu.registered, report.context_menu.total
        );

        report.hybrid.total = registry.hybrid_commands().len();
        for record in registry.hybrid_commands() {
            let Some(command) = instantiate(record.name, &record.factory, &context)? else {
                continue;
            };
            let key = schema_name(&record.application_command)
                .ok_or_else(|| ConfigError::MissingSchemaName(record.name.to_string()))?;

            let slash = insert_unique(
                &mut manager.slash_commands,
                key.to_string(),
                SlashEntry::Hybrid(command.clone()),
                record.name,
            );
            let guild_ids: Arc<[u64]> = record.guild_ids.as_slice().into();
            let mut triggers = 0;
            for trigger in &record.prefix_triggers {
                if insert_unique(
                    &mut manager.prefix_commands,
                    trigger.to_lowercase(),
                    PrefixRoute {
                        entry: PrefixEntry::Hybrid(command.clone()),
                        guild_ids: guild_ids.clone(),
                    },
                    record.name,
                ) {
                    triggers += 1;
                }
            }

            let complete = slash && triggers == record.prefix_triggers.len();
            if !complete && (slash || triggers > 0) {
                warn!(
                    "⚠️ Hybrid command {} only partially registered (slash: {slash}, prefix triggers: {triggers}/{})",
                    record.name,
                    record.prefix_triggers.len()
                );
                report.partial_hybrids.push(record.name);
            }
            if slash || triggers > 0 {
                report.hybrid.registered += 1;
            }
        }
        info!("✅ Registered {}/{} hybrid commands", report.hybrid.registered, report.hybrid.total);

        manager.report = report;
        Ok(manager)
    }

    /// Default prefix, used where no guild overrides it
    pub fn prefix(&self) -> &str {
        self.context.prefix()
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn slash_command(&self, name: &str) -> Option<&SlashEntry> {
        self.slash_commands.get(name)
    }

    /// Prefix command by trigger, case-insensitive, regardless of guild scope
    pub fn prefix_command(&self, trigger: &str) -> Option<&PrefixEntry> {
        self.prefix_commands
            .get(&trigger.to_lowercase())
            .map(|route| &route.entry)
    }

    /// Prefix command by trigger, if it is available where the message was sent
    pub fn prefix_command_in(&self, trigger: &str, guild_id: Option<u64>) -> Option<&PrefixEntry> {
        self.prefix_commands
            .get(&trigger.to_lowercase())
            .filter(|route| route.available_in(guild_id))
            .map(|route| &route.entry)
    }

    pub fn context_menu_command(&self, name: &str) -> Option<&Arc<dyn ContextMenuCommand>> {
        self.context_menu_commands.get(name)
    }

    /// Whether `content` starts with `prefix`, ignoring case
    pub fn is_prefixed(content: &str, prefix: &str) -> bool {
        !prefix.is_empty()
            && content
                .get(..prefix.len())
                .is_some_and(|head| head.to_lowercase() == prefix.to_lowercase())
    }

    pub async fn handle_slash(&self, ctx: &Context, interaction: &ApplicationCommandInteraction) {
        let request_id = Uuid::new_v4();
        info!(
            "[{request_id}] Slash command /{} from {}",
            interaction.data.name, interaction.user.name
        );

        if let Err(e) = self.dispatch_slash(ctx, interaction).await {
            error!("[{request_id}] Command /{} failed: {e:#}", interaction.data.name);
            report_failure(ctx, FailedInteraction::Command(interaction), &e).await;
        }
    }

    async fn dispatch_slash(
        &self,
        ctx: &Context,
        interaction: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let Some(entry) = self.slash_commands.get(&interaction.data.name) else {
            warn!("Unknown slash command: {}", interaction.data.name);
            return Ok(());
        };
        let (path, options) = subcommand_path(&interaction.data.options);

        match entry {
            SlashEntry::Slash(command) => {
                command.execute(ctx, interaction).await?;

                let subcommand = path
                    .as_deref()
                    .zip(command.subcommands())
                    .and_then(|(path, subcommands)| subcommands.from_chat_input(path));
                if let Some(subcommand) = subcommand {
                    let args = ArgumentResolver::from_options(subcommand.arguments.as_ref(), options)?;
                    command
                        .run_subcommand(subcommand.key, ctx, interaction, &args)
                        .await?;
                }
            }
            SlashEntry::Hybrid(command) => {
                let context = HybridContext::interaction(ctx, interaction);
                let args = ArgumentResolver::from_options(command.arguments(), options)?;
                command.execute(&context, &args).await?;

                let subcommand = path
                    .as_deref()
                    .zip(command.subcommands())
                    .and_then(|(path, subcommands)| subcommands.from_chat_input(path));
                if let Some(subcommand) = subcommand {
                    let args = ArgumentResolver::from_options(subcommand.arguments.as_ref(), options)?;
                    command.run_subcommand(subcommand.key, &context, &args).await?;
                }
            }
        }

        Ok(())
    }

    pub async fn handle_autocomplete(&self, ctx: &Context, interaction: &AutocompleteInteraction) {
        let result = match self.slash_commands.get(&interaction.data.name) {
            Some(SlashEntry::Slash(command)) => command.autocomplete(ctx, interaction).await,
            Some(SlashEntry::Hybrid(command)) => command.autocomplete(ctx, interaction).await,
            None => {
                warn!("Autocomplete for unknown command: {}", interaction.data.name);
                return;
            }
        };

        if let Err(e) = result {
            error!("Autocomplete for /{} failed: {e:#}", interaction.data.name);
        }
    }

    pub async fn handle_context_menu(&self, ctx: &Context, interaction: &ApplicationCommandInteraction) {
        let request_id = Uuid::new_v4();
        let Some(command) = self.context_menu_commands.get(&interaction.data.name) else {
            warn!("Unknown context menu command: {}", interaction.data.name);
            return;
        };
        info!(
            "[{request_id}] Context menu '{}' from {}",
            interaction.data.name, interaction.user.name
        );

        if let Err(e) = command.execute(ctx, interaction).await {
            error!("[{request_id}] Context menu '{}' failed: {e:#}", interaction.data.name);
            report_failure(ctx, FailedInteraction::Command(interaction), &e).await;
        }
    }

    /// Route a prefixed text message; other messages are ignored
    pub async fn handle_message(&self, ctx: &Context, message: &Message) {
        if message.author.bot {
            return;
        }
        let prefix = self.context.prefix_in(message.guild_id).await;
        if !Self::is_prefixed(&message.content, &prefix) {
            return;
        }

        let root = ArgumentResolver::from_content(&message.content, &prefix);
        let Some(trigger) = root.trigger() else {
            return;
        };
        let Some(entry) = self.prefix_command_in(trigger, message.guild_id.map(|id| id.0)) else {
            debug!("No prefix command for trigger '{trigger}'");
            return;
        };
        let invocation = Invocation {
            ctx,
            message,
            root: &root,
            prefix: &prefix,
        };

        let request_id = Uuid::new_v4();
        info!("[{request_id}] Prefix command '{trigger}' from {}", message.author.name);

        let result = match entry {
            PrefixEntry::Prefix(command) => run_prefix(&invocation, command.as_ref()).await,
            PrefixEntry::Hybrid(command) => run_hybrid(&invocation, command.as_ref()).await,
        };

        if let Err(e) = result {
            error!("[{request_id}] Prefix command '{trigger}' failed: {e:#}");
        }
    }
}

/// A prefixed message being dispatched
#[derive(Clone, Copy)]
struct Invocation<'a> {
    ctx: &'a Context,
    message: &'a Message,
    root: &'a ArgumentResolver,
    /// Prefix in effect where the message was sent
    prefix: &'a str,
}

async fn run_prefix(invocation: &Invocation<'_>, command: &dyn PrefixCommand) -> Result<()> {
    let Invocation { ctx, message, root, .. } = *invocation;
    let Some(args) = resolve_or_explain(invocation, command.arguments(), false).await? else {
        return Ok(());
    };
    command.execute(ctx, message, &args).await?;

    let Some(subcommand) = command
        .subcommands()
        .and_then(|subcommands| subcommands.from_tokens(root.tokens()))
    else {
        return Ok(());
    };
    let Some(args) = resolve_or_explain(invocation, subcommand.arguments.as_ref(), true).await? else {
        return Ok(());
    };
    command.run_subcommand(subcommand.key, ctx, message, &args).await
}

async fn run_hybrid(invocation: &Invocation<'_>, command: &dyn HybridCommand) -> Result<()> {
    let Invocation { ctx, message, root, .. } = *invocation;
    let Some(args) = resolve_or_explain(invocation, command.arguments(), false).await? else {
        return Ok(());
    };
    let context = HybridContext::message(ctx, message);
    command.execute(&context, &args).await?;

    let Some(subcommand) = command
        .subcommands()
        .and_then(|subcommands| subcommands.from_tokens(root.tokens()))
    else {
        return Ok(());
    };
    let Some(args) = resolve_or_explain(invocation, subcommand.arguments.as_ref(), true).await? else {
        return Ok(());
    };
    command.run_subcommand(subcommand.key, &context, &args).await
}

/// Resolve declared arguments, or reply with the reason and a usage line
///
/// Undeclared arguments get the root resolver.
async fn resolve_or_explain(
    invocation: &Invocation<'_>,
    arguments: Option<&ArgumentList>,
    increase_start: bool,
) -> Result<Option<ArgumentResolver>> {
    let Invocation { ctx, message, root, prefix } = *invocation;
    let Some(arguments) = arguments else {
        return Ok(Some(root.clone()));
    };

    match root.resolve(arguments, increase_start, ctx).await {
        Ok(args) => Ok(Some(args)),
        Err(reason) => {
            let usage = root.usage(prefix, arguments, increase_start);
            message
                .channel_id
                .say(
                    &ctx.http,
                    truncate_for_message(&format!("❌ Invalid usage: {reason}\nUsage: `{usage}`")),
                )
                .await
                .context("Failed to send usage hint")?;
            Ok(None)
        }
    }
}
