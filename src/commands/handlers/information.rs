//! Information command
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.6.0
//!
//! ## Changelog
//! - 1.0.0: About text, runtime stats and project links

use anyhow::Result;
use async_trait::async_trait;
use serenity::builder::{CreateApplicationCommand, CreateComponents, CreateEmbed};
use serenity::model::application::component::ButtonStyle;
use serenity::model::Timestamp;
use std::sync::Arc;
use std::time::Duration;

use super::ping::format_uptime;
use crate::commands::argument::ArgumentResolver;
use crate::commands::context::CommandContext;
use crate::commands::handler::{HybridCommand, HybridCommandRecord};
use crate::commands::hybrid::{HybridContext, ReplyPayload};
use crate::commands::registry::CommandRegistry;

const INFORMATION_COLOR: u32 = 0x4752c4;
const SERVER_URL: &str = "https://discord.gg/pGnKbMfXke";
const REPOSITORY_URL: &str = "https://github.com/louiszn/zent-bot";

const ABOUT: &str = "Hi, I'm Zent, your handy Discord server assistant! I can help with moderation, \
fun commands, and server utilities, especially about role-playing!\n\n\
To start using my features, you can use `/help` for the list of commands and information about them.";

pub fn register(registry: &mut CommandRegistry) -> Result<()> {
    let data = CreateApplicationCommand::default()
        .name("information")
        .description("Display all information about me :3")
        .dm_permission(false)
        .to_owned();

    registry.add_hybrid_command(HybridCommandRecord::new(data, &["info", "infor"], |context| {
        Ok(InformationCommand { context })
    }))?;
    Ok(())
}

/// Stats block shown under the about text
pub fn stats_text(uptime: Duration, servers: usize, version: &str) -> String {
    format!(
        "```\n- Uptime:  {}\n- Servers: {servers}\n- Version: {version}\n```",
        format_uptime(uptime)
    )
}

fn links() -> CreateComponents {
    let mut components = CreateComponents::default();
    components.create_action_row(|row| {
        row.create_button(|button| button.label("Server").style(ButtonStyle::Link).url(SERVER_URL))
            .create_button(|button| {
                button
                    .label("Repository")
                    .style(ButtonStyle::Link)
                    .url(REPOSITORY_URL)
            })
    });
    components
}

pub struct InformationCommand {
    context: Arc<CommandContext>,
}

#[async_trait]
impl HybridCommand for InformationCommand {
    async fn execute(&self, context: &HybridContext<'_>, _args: &ArgumentResolver) -> Result<()> {
        let cache = &context.serenity().cache;
        let stats = stats_text(
            self.context.start_time.elapsed(),
            cache.guild_count(),
            env!("CARGO_PKG_VERSION"),
        );

        let mut embed = CreateEmbed::default();
        embed
            .title("About me")
            .description(ABOUT)
            .thumbnail(cache.current_user().face())
            .field("Stats", stats, false)
            .footer(|footer| footer.text("Made with ❤️ by louiszn"))
            .color(INFORMATION_COLOR)
            .timestamp(Timestamp::now());

        context
            .send(ReplyPayload::new().embed(embed).components(links()))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_text() {
        let stats = stats_text(Duration::from_secs(125), 3, "0.6.0");

        assert!(stats.starts_with("```"));
        assert!(stats.contains("- Uptime:  2m 5s"));
        assert!(stats.contains("- Servers: 3"));
        assert!(stats.contains("- Version: 0.6.0"));
    }

    #[test]
    fn test_links_are_buttons() {
        let components = links();
        let row = &components.0[0];

        let buttons = row["components"].as_array().unwrap();
        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0]["url"], SERVER_URL);
        assert_eq!(buttons[1]["url"], REPOSITORY_URL);
    }
}
