//! # Components
//!
//! Button, select-menu and modal callbacks routed by the first segment of
//! their colon-delimited custom id (`character:edit-message:<id>`).
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.4.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Button paginator
//! - 1.0.0: Component registry and router

pub mod character;
pub mod manager;
pub mod paginator;
pub mod registry;

use anyhow::Result;
use async_trait::async_trait;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::prelude::Context;

pub use manager::ComponentManager;
pub use paginator::Paginator;
pub use registry::{ComponentModule, ComponentRecord, ComponentRegistry};

/// Callbacks for components whose custom id starts with a registered prefix
///
/// `args` are the custom id segments after the prefix. Every callback does
/// nothing unless overridden.
#[async_trait]
pub trait Component: Send + Sync {
    async fn execute_button(
        &self,
        _ctx: &Context,
        _interaction: &MessageComponentInteraction,
        _args: &[&str],
    ) -> Result<()> {
        Ok(())
    }

    async fn execute_select_menu(
        &self,
        _ctx: &Context,
        _interaction: &MessageComponentInteraction,
        _args: &[&str],
    ) -> Result<()> {
        Ok(())
    }

    async fn execute_modal_submit(
        &self,
        _ctx: &Context,
        _interaction: &ModalSubmitInteraction,
        _args: &[&str],
    ) -> Result<()> {
        Ok(())
    }
}

/// Every component module known to the bot
pub fn modules() -> Vec<ComponentModule> {
    vec![ComponentModule::new("character", character::register)]
}
