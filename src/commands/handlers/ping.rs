//! Ping command
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Hybrid command reporting round-trip latency and uptime
//! - 1.0.0: Slash-only pong

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serenity::builder::CreateApplicationCommand;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::commands::argument::ArgumentResolver;
use crate::commands::context::CommandContext;
use crate::commands::handler::{HybridCommand, HybridCommandRecord};
use crate::commands::hybrid::HybridContext;
use crate::commands::registry::CommandRegistry;

pub fn register(registry: &mut CommandRegistry) -> Result<()> {
    let data = CreateApplicationCommand::default()
        .name("ping")
        .description("Displays bot latency.")
        .dm_permission(false)
        .to_owned();

    registry.add_hybrid_command(HybridCommandRecord::new(data, &["ping"], |context| {
        Ok(PingCommand { context })
    }))?;
    Ok(())
}

/// `2h 5m 3s`, leading zero units omitted
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    let (days, hours, minutes, seconds) = (secs / 86_400, secs / 3_600 % 24, secs / 60 % 60, secs % 60);

    match (days, hours, minutes) {
        (0, 0, 0) => format!("{seconds}s"),
        (0, 0, _) => format!("{minutes}m {seconds}s"),
        (0, _, _) => format!("{hours}h {minutes}m {seconds}s"),
        _ => format!("{days}d {hours}h {minutes}m {seconds}s"),
    }
}

pub struct PingCommand {
    context: Arc<CommandContext>,
}

#[async_trait]
impl HybridCommand for PingCommand {
    async fn execute(&self, context: &HybridContext<'_>, _args: &ArgumentResolver) -> Result<()> {
        let started = Instant::now();
        let mut message = context.send("Pinging...").await?;
        let latency = started.elapsed().as_millis();

        let uptime = format_uptime(self.context.start_time.elapsed());
        context
            .edit(&mut message, format!("Pong! {latency}ms!\nUptime: {uptime}"))
            .await?;

        info!("🏓 Ping from {}: {latency}ms", context.user().name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(42)), "42s");
        assert_eq!(format_uptime(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_uptime(Duration::from_secs(7_503)), "2h 5m 3s");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 1h 1m 1s");
    }
}
