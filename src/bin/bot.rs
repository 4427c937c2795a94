use anyhow::Result;
use dotenvy::dotenv;
use log::{debug, error, info};
use serenity::async_trait;
use serenity::model::application::command::CommandType;
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::guild::Guild;
use serenity::model::id::{ChannelId, GuildId};
use serenity::prelude::*;
use std::sync::Arc;

use zentbot::commands::{handlers, CommandContext, CommandManager, CommandRegistry};
use zentbot::components::{self, ComponentManager, ComponentRegistry};
use zentbot::core::Config;
use zentbot::database::Database;
use zentbot::features::characters::{relay_message, CharacterManager};
use zentbot::features::guilds::GuildManager;

struct Handler {
    commands: Arc<CommandManager>,
    components: Arc<ComponentManager>,
    characters: CharacterManager,
    guilds: GuildManager,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        match relay_message(&ctx, &self.characters, &msg).await {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => error!("Error relaying message {}: {e:#}", msg.id),
        }

        self.commands.handle_message(&ctx, &msg).await;
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);
        info!("⌨️ Default prefix: {}", self.commands.prefix());

        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, is_new: bool) {
        if is_new {
            info!("🏠 Joined guild {} ({})", guild.name, guild.id);
        }
        if let Err(e) = self.guilds.ensure(guild.id.0).await {
            error!("Failed to load settings for guild {}: {e:#}", guild.id);
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::ApplicationCommand(command) => match command.data.kind {
                CommandType::ChatInput => self.commands.handle_slash(&ctx, &command).await,
                CommandType::User | CommandType::Message => {
                    self.commands.handle_context_menu(&ctx, &command).await
                }
                other => debug!("Ignoring application command of type {other:?}"),
            },
            Interaction::Autocomplete(autocomplete) => {
                self.commands.handle_autocomplete(&ctx, &autocomplete).await
            }
            Interaction::MessageComponent(component) => {
                self.components.handle_component(&ctx, &component).await
            }
            Interaction::ModalSubmit(modal) => self.components.handle_modal(&ctx, &modal).await,
            Interaction::Ping(_) => {
                info!("Ping interaction received - Discord health check");
            }
        }
    }

    async fn webhook_update(&self, _ctx: Context, _guild_id: GuildId, channel_id: ChannelId) {
        // the cached webhook may have been deleted or replaced
        self.characters.forget_webhook(channel_id);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Zent...");

    let database = Database::new(&config.database_path).await?;
    let context = Arc::new(CommandContext::new(config.clone(), database));

    let mut command_registry = CommandRegistry::new();
    command_registry.load(&handlers::modules())?;
    let commands = CommandManager::load(&command_registry, context.clone())?;

    let mut component_registry = ComponentRegistry::new();
    component_registry.load(&components::modules())?;
    let components = ComponentManager::load(&component_registry, context.clone())?;

    let handler = Handler {
        commands: Arc::new(commands),
        components: Arc::new(components),
        characters: context.characters.clone(),
        guilds: context.guilds.clone(),
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_WEBHOOKS
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            error!("This could indicate:");
            error!("  - Invalid bot token format");
            error!("  - Network issues reaching Discord API");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Establishing WebSocket connection to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        error!("This could be due to:");
        error!("  - Invalid bot token");
        error!("  - Network connectivity issues");
        error!("  - Missing privileged intents (message content)");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
