use anyhow::Result;
use dotenvy::dotenv;
use log::info;
use serenity::http::Http;

use zentbot::commands::deploy::{apply, export};
use zentbot::commands::{handlers, CommandRegistry};
use zentbot::core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let dry_run = std::env::args().skip(1).any(|arg| arg == "--dry-run");

    let mut registry = CommandRegistry::new();
    registry.load(&handlers::modules())?;

    let mut plan = export(&registry);
    if let Some(guild_id) = config.dev_guild_id {
        info!("🔧 Development mode: deploying every command to guild {guild_id}");
        plan = plan.into_guild(guild_id);
    }

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let application_id = config.require_application_id()?;
    let http = Http::new_with_application_id(&config.discord_token, application_id);

    info!("🚀 Deploying {} application commands...", plan.len());
    apply(&http, &plan).await?;
    info!("✅ Deployment finished");

    Ok(())
}
