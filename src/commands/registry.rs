//! Command registration registry
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 2.0.0: Registration records per command surface with a one-shot load
//! - 1.0.0: Initial implementation for handler dispatch

use anyhow::Result;
use log::{error, info};

use super::handler::{
    schema_name, ContextMenuCommandRecord, HybridCommandRecord, PrefixCommandRecord,
    SlashCommandRecord,
};
use crate::core::error::ConfigError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistryState {
    #[default]
    Unloaded,
    Loading,
    Frozen,
}

/// A named registration function, run once by [`CommandRegistry::load`]
#[derive(Clone, Copy)]
pub struct CommandModule {
    pub name: &'static str,
    pub register: fn(&mut CommandRegistry) -> Result<()>,
}

impl CommandModule {
    pub const fn new(name: &'static str, register: fn(&mut CommandRegistry) -> Result<()>) -> Self {
        Self { name, register }
    }
}

/// Collects command registrations at startup
///
/// Records can be added until [`load`](Self::load) completes; afterwards the
/// registry is frozen and read by the command manager.
///
/// # Example
///
/// ```ignore
/// fn register(registry: &mut CommandRegistry) -> anyhow::Result<()> {
///     registry.add_hybrid_command(HybridCommandRecord::new(data, &["ping"], |_| Ok(PingCommand)))?;
///     Ok(())
/// }
///
/// let mut registry = CommandRegistry::new();
/// registry.load(&[CommandModule::new("ping", register)])?;
/// ```
#[derive(Default)]
pub struct CommandRegistry {
    state: RegistryState,
    prefix_commands: Vec<PrefixCommandRecord>,
    slash_commands: Vec<SlashCommandRecord>,
    context_menu_commands: Vec<ContextMenuCommandRecord>,
    hybrid_commands: Vec<HybridCommandRecord>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    pub fn is_frozen(&self) -> bool {
        self.state == RegistryState::Frozen
    }

    fn ensure_open(&self, name: &str) -> Result<(), ConfigError> {
        if self.is_frozen() {
            return Err(ConfigError::RegistryFrozen(name.to_string()));
        }
        Ok(())
    }

    pub fn add_prefix_command(&mut self, record: PrefixCommandRecord) -> Result<(), ConfigError> {
        self.ensure_open(record.name)?;
        if record.triggers.is_empty() {
            return Err(ConfigError::MissingTriggers(record.name.to_string()));
        }
        self.prefix_commands.push(record);
        Ok(())
    }

    pub fn add_slash_command(&mut self, record: SlashCommandRecord) -> Result<(), ConfigError> {
        self.ensure_open(record.name)?;
        if schema_name(&record.data).is_none() {
            return Err(ConfigError::MissingSchemaName(record.name.to_string()));
        }
        self.slash_commands.push(record);
        Ok(())
    }

    pub fn add_context_menu_command(
        &mut self,
        record: ContextMenuCommandRecord,
    ) -> Result<(), ConfigError> {
        self.ensure_open(record.name)?;
        if schema_name(&record.data).is_none() {
            return Err(ConfigError::MissingSchemaName(record.name.to_string()));
        }
        self.context_menu_commands.push(record);
        Ok(())
    }

    pub fn add_hybrid_command(&mut self, record: HybridCommandRecord) -> Result<(), ConfigError> {
        self.ensure_open(record.name)?;
        if schema_name(&record.application_command).is_none() {
            return Err(ConfigError::MissingSchemaName(record.name.to_string()));
        }
        self.hybrid_commands.push(record);
        Ok(())
    }

    pub fn prefix_commands(&self) -> &[PrefixCommandRecord] {
        &self.prefix_commands
    }

    pub fn slash_commands(&self) -> &[SlashCommandRecord] {
        &self.slash_commands
    }

    pub fn context_menu_commands(&self) -> &[ContextMenuCommandRecord] {
        &self.context_menu_commands
    }

    pub fn hybrid_commands(&self) -> &[HybridCommandRecord] {
        &self.hybrid_commands
    }

    /// Total number of records across all surfaces
    pub fn len(&self) -> usize {
        self.prefix_commands.len()
            + self.slash_commands.len()
            + self.context_menu_commands.len()
            + self.hybrid_commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every module's registration function, then freeze
    ///
    /// A failing module is logged and its partial registrations discarded.
    /// Only the first call succeeds.
    pub fn load(&mut self, modules: &[CommandModule]) -> Result<(), ConfigError> {
        if self.state != RegistryState::Unloaded {
            return Err(ConfigError::AlreadyLoaded);
        }
        self.state = RegistryState::Loading;

        for CommandModule { name, register } in modules {
            let marks = self.marks();
            match register(self) {
                Ok(()) => info!("📝 Registered command module {name}"),
                Err(e) => {
                    self.rollback(marks);
                    error!("❌ Failed to register command module {name}: {e:#}");
                }
            }
        }

        self.state = RegistryState::Frozen;
        info!(
            "🔒 Command registry frozen: {} prefix, {} slash, {} context menu, {} hybrid",
            self.prefix_commands.len(),
            self.slash_commands.len(),
            self.context_menu_commands.len(),
            self.hybrid_commands.len()
        );
        Ok(())
    }

    fn marks(&self) -> [usize; 4] {
        [
            self.prefix_commands.len(),
            self.slash_commands.len(),
            self.context_menu_commands.len(),
            self.hybrid_commands.len(),
        ]
    }

    fn rollback(&mut self, [prefix, slash, context_menu, hybrid]: [usize; 4]) {
        self.prefix_commands.truncate(prefix);
        self.slash_commands.truncate(slash);
        self.context_menu_commands.truncate(context_menu);
        self.hybrid_commands.truncate(hybrid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::argument::ArgumentResolver;
    use crate::commands::handler::{PrefixCommand, SlashCommand};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use serenity::builder::CreateApplicationCommand;
    use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
    use serenity::model::channel::Message;
    use serenity::prelude::Context;

    // Mock commands for testing
    struct MockPrefix;

    #[async_trait]
    impl PrefixCommand for MockPrefix {
        async fn execute(&self, _: &Context, _: &Message, _: &ArgumentResolver) -> Result<()> {
            Ok(())
        }
    }

    struct MockSlash;

    #[async_trait]
    impl SlashCommand for MockSlash {
        async fn execute(&self, _: &Context, _: &ApplicationCommandInteraction) -> Result<()> {
            Ok(())
        }
    }

    fn schema(name: &str) -> CreateApplicationCommand {
        CreateApplicationCommand::default()
            .name(name)
            .description("test")
            .to_owned()
    }

    fn register_ping(registry: &mut CommandRegistry) -> Result<()> {
        registry.add_prefix_command(PrefixCommandRecord::new(&["ping"], |_| Ok(MockPrefix)))?;
        registry.add_slash_command(SlashCommandRecord::new(schema("ping"), |_| Ok(MockSlash)))?;
        Ok(())
    }

    fn register_broken(registry: &mut CommandRegistry) -> Result<()> {
        registry.add_prefix_command(PrefixCommandRecord::new(&["broken"], |_| Ok(MockPrefix)))?;
        Err(anyhow!("module failed halfway"))
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.state(), RegistryState::Unloaded);
    }

    #[test]
    fn test_load_runs_modules_and_freezes() {
        let mut registry = CommandRegistry::new();
        registry.load(&[CommandModule::new("ping", register_ping)]).unwrap();

        assert!(registry.is_frozen());
        assert_eq!(registry.prefix_commands().len(), 1);
        assert_eq!(registry.slash_commands().len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_frozen_registry_rejects_additions() {
        let mut registry = CommandRegistry::new();
        registry.load(&[]).unwrap();

        let result = registry.add_prefix_command(PrefixCommandRecord::new(&["late"], |_| Ok(MockPrefix)));
        assert!(matches!(result, Err(ConfigError::RegistryFrozen(_))));
    }

    #[test]
    fn test_second_load_is_rejected() {
        let mut registry = CommandRegistry::new();
        registry.load(&[CommandModule::new("ping", register_ping)]).unwrap();

        assert_eq!(
            registry.load(&[CommandModule::new("ping", register_ping)]),
            Err(ConfigError::AlreadyLoaded)
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_failing_module_is_skipped() {
        let mut registry = CommandRegistry::new();
        registry
            .load(&[
                CommandModule::new("broken", register_broken),
                CommandModule::new("ping", register_ping),
            ])
            .unwrap();

        let triggers: Vec<_> = registry
            .prefix_commands()
            .iter()
            .flat_map(|record| record.triggers.clone())
            .collect();
        assert_eq!(triggers, vec!["ping"]);
    }

    #[test]
    fn test_schema_without_name_is_rejected() {
        let mut registry = CommandRegistry::new();
        let result = registry.add_slash_command(SlashCommandRecord::new(
            CreateApplicationCommand::default(),
            |_| Ok(MockSlash),
        ));
        assert!(matches!(result, Err(ConfigError::MissingSchemaName(_))));
    }

    #[test]
    fn test_additions_before_load_are_kept() {
        let mut registry = CommandRegistry::new();
        registry
            .add_prefix_command(PrefixCommandRecord::new(&["early"], |_| Ok(MockPrefix)))
            .unwrap();
        registry.load(&[]).unwrap();

        assert_eq!(registry.prefix_commands().len(), 1);
    }
}
