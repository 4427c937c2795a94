//! Application command export and deployment
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0
//!
//! ## Changelog
//! - 1.0.0: Export registry schemas partitioned by guild scope

use anyhow::{Context as _, Result};
use log::info;
use serde::Serialize;
use serde_json::{Map, Value};
use serenity::builder::CreateApplicationCommand;
use serenity::http::Http;
use std::collections::BTreeMap;

use super::registry::CommandRegistry;

/// Application command payloads grouped by where they are deployed
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct DeploymentPlan {
    pub global: Vec<Value>,
    pub guilds: BTreeMap<u64, Vec<Value>>,
}

impl DeploymentPlan {
    fn push(&mut self, payload: Value, guild_ids: &[u64]) {
        if guild_ids.is_empty() {
            self.global.push(payload);
            return;
        }
        for guild_id in guild_ids {
            self.guilds.entry(*guild_id).or_default().push(payload.clone());
        }
    }

    /// Every command, deduplicated by name, scoped to a single guild
    pub fn into_guild(self, guild_id: u64) -> Self {
        let mut commands: Vec<Value> = Vec::new();
        let all = self
            .global
            .into_iter()
            .chain(self.guilds.into_values().flatten());

        for payload in all {
            let duplicate = commands
                .iter()
                .any(|existing| existing.get("name") == payload.get("name")
                    && existing.get("type") == payload.get("type"));
            if !duplicate {
                commands.push(payload);
            }
        }

        Self {
            global: Vec::new(),
            guilds: BTreeMap::from([(guild_id, commands)]),
        }
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.guilds.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// JSON payload of an application command builder
pub fn to_payload(data: &CreateApplicationCommand) -> Value {
    let map: Map<String, Value> = data
        .0
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    Value::Object(map)
}

/// Collect the application command schemas of every slash, context-menu and
/// hybrid registration
pub fn export(registry: &CommandRegistry) -> DeploymentPlan {
    let mut plan = DeploymentPlan::default();

    for record in registry.slash_commands() {
        plan.push(to_payload(&record.data), &record.guild_ids);
    }
    for record in registry.context_menu_commands() {
        plan.push(to_payload(&record.data), &record.guild_ids);
    }
    for record in registry.hybrid_commands() {
        plan.push(to_payload(&record.application_command), &record.guild_ids);
    }

    plan
}

/// Overwrite the deployed commands with the plan
pub async fn apply(http: &Http, plan: &DeploymentPlan) -> Result<()> {
    let global = http
        .create_global_application_commands(&Value::Array(plan.global.clone()))
        .await
        .context("Failed to deploy global commands")?;
    info!("🌍 Deployed {} global commands", global.len());

    for (guild_id, commands) in &plan.guilds {
        let deployed = http
            .create_guild_application_commands(*guild_id, &Value::Array(commands.clone()))
            .await
            .with_context(|| format!("Failed to deploy commands to guild {guild_id}"))?;
        info!("🔧 Deployed {} commands to guild {guild_id}", deployed.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::argument::ArgumentResolver;
    use crate::commands::handler::{
        ContextMenuCommand, HybridCommand, HybridCommandRecord, SlashCommand, SlashCommandRecord,
        ContextMenuCommandRecord,
    };
    use crate::commands::hybrid::HybridContext;
    use crate::commands::registry::CommandModule;
    use async_trait::async_trait;
    use serde_json::json;
    use serenity::model::application::command::CommandType;
    use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
    use serenity::prelude::Context;

    struct Mock;

    #[async_trait]
    impl SlashCommand for Mock {
        async fn execute(&self, _: &Context, _: &ApplicationCommandInteraction) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl ContextMenuCommand for Mock {
        async fn execute(&self, _: &Context, _: &ApplicationCommandInteraction) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl HybridCommand for Mock {
        async fn execute(&self, _: &HybridContext<'_>, _: &ArgumentResolver) -> Result<()> {
            Ok(())
        }
    }

    fn schema(name: &str) -> CreateApplicationCommand {
        CreateApplicationCommand::default()
            .name(name)
            .description("test")
            .to_owned()
    }

    fn register(registry: &mut CommandRegistry) -> Result<()> {
        registry.add_slash_command(SlashCommandRecord::new(schema("about"), |_| Ok(Mock)))?;
        registry.add_context_menu_command(
            ContextMenuCommandRecord::new(
                CreateApplicationCommand::default()
                    .name("Delete character's message")
                    .kind(CommandType::Message)
                    .to_owned(),
                |_| Ok(Mock),
            )
            .guild_ids(&[1, 2]),
        )?;
        registry.add_hybrid_command(
            HybridCommandRecord::new(schema("character"), &["char"], |_| Ok(Mock)).guild_ids(&[2]),
        )?;
        Ok(())
    }

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry.load(&[CommandModule::new("test", register)]).unwrap();
        registry
    }

    #[test]
    fn test_export_partitions_by_guild() {
        let plan = export(&registry());

        assert_eq!(plan.global.len(), 1);
        assert_eq!(plan.global[0]["name"], json!("about"));
        assert_eq!(plan.guilds[&1].len(), 1);
        assert_eq!(plan.guilds[&2].len(), 2);
        assert_eq!(plan.guilds[&2][1]["name"], json!("character"));
        assert_eq!(plan.len(), 4);
    }

    #[test]
    fn test_payload_keeps_command_type() {
        let plan = export(&registry());
        assert_eq!(plan.guilds[&1][0]["type"], json!(3));
    }

    #[test]
    fn test_into_guild_deduplicates() {
        let plan = export(&registry()).into_guild(9);

        assert!(plan.global.is_empty());
        let names: Vec<_> = plan.guilds[&9]
            .iter()
            .map(|payload| payload["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["about", "Delete character's message", "character"]);
    }

    #[test]
    fn test_empty_registry_exports_nothing() {
        let mut registry = CommandRegistry::new();
        registry.load(&[]).unwrap();
        assert!(export(&registry).is_empty());
    }
}
