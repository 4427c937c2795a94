//! Per-command handler implementations
//!
//! - **Version**: 3.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 3.1.0: Server prefix and bot information commands
//! - 3.0.0: Character commands, message edit/delete and context menus as registry modules
//! - 2.0.0: Hybrid ping and help
//! - 1.0.0: Initial extraction from the monolithic handler

pub mod character;
pub mod delete;
pub mod edit;
pub mod help;
pub mod information;
pub mod message_menu;
pub mod ping;
pub mod prefix;

use anyhow::{Context as _, Result};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::commands::registry::CommandModule;

/// Every command module known to the bot, registered in this order
pub fn modules() -> Vec<CommandModule> {
    vec![
        CommandModule::new("ping", ping::register),
        CommandModule::new("help", help::register),
        CommandModule::new("information", information::register),
        CommandModule::new("prefix", prefix::register),
        CommandModule::new("character", character::register),
        CommandModule::new("edit", edit::register),
        CommandModule::new("delete", delete::register),
        CommandModule::new("message_menu", message_menu::register),
    ]
}

/// Message a prefix command acts on: the one named by `id`, otherwise the
/// replied message
///
/// Explains in the channel and returns `None` when neither can be fetched.
pub(crate) async fn target_message(
    ctx: &Context,
    message: &Message,
    id: Option<u64>,
    action: &str,
) -> Result<Option<Message>> {
    let (target_id, missing) = match id {
        Some(id) => (id, "Couldn't find that message in this channel."),
        None => match message.message_reference.as_ref().and_then(|r| r.message_id) {
            Some(replied) => (replied.0, "Couldn't find replied message in this channel."),
            None => {
                message
                    .channel_id
                    .say(&ctx.http, format!("You must specific your character's message to {action}."))
                    .await
                    .context("Failed to send reply")?;
                return Ok(None);
            }
        },
    };

    match message.channel_id.message(&ctx.http, target_id).await {
        Ok(target) => Ok(Some(target)),
        Err(_) => {
            message
                .channel_id
                .say(&ctx.http, missing)
                .await
                .context("Failed to send reply")?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::testing::test_context;
    use crate::commands::manager::CommandManager;
    use crate::commands::registry::CommandRegistry;

    #[test]
    fn test_all_modules_register() {
        let mut registry = CommandRegistry::new();
        registry.load(&modules()).unwrap();

        assert_eq!(registry.hybrid_commands().len(), 5);
        assert_eq!(registry.prefix_commands().len(), 2);
        assert_eq!(registry.context_menu_commands().len(), 3);
    }

    #[test]
    fn test_all_handlers_instantiate() {
        let mut registry = CommandRegistry::new();
        registry.load(&modules()).unwrap();
        let manager = CommandManager::load(&registry, test_context()).unwrap();

        let triggers = [
            "ping", "help", "h", "info", "infor", "prefix", "character", "char", "edit", "delete", "del",
        ];
        for trigger in triggers {
            assert!(manager.prefix_command(trigger).is_some(), "missing trigger {trigger}");
        }
        for name in ["ping", "help", "information", "prefix", "character"] {
            assert!(manager.slash_command(name).is_some(), "missing slash command {name}");
        }
        assert!(manager.context_menu_command("Edit character's message").is_some());

        let report = manager.report();
        assert_eq!(report.hybrid.registered, report.hybrid.total);
        assert!(report.partial_hybrids.is_empty());
    }
}
