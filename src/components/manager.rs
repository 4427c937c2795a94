//! Component router
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0
//!
//! ## Changelog
//! - 1.0.0: Route buttons, select menus and modals by custom id prefix

use anyhow::Result;
use log::{debug, error, info};
use serenity::model::application::component::ComponentType;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::prelude::Context;
use std::collections::HashMap;
use std::sync::Arc;

use super::registry::ComponentRegistry;
use super::Component;
use crate::commands::context::CommandContext;
use crate::commands::failure::{report_failure, FailedInteraction};
use crate::commands::manager::instantiate;

/// Split a custom id into its routing prefix and remaining segments
pub fn split_custom_id(custom_id: &str) -> (&str, Vec<&str>) {
    let mut segments = custom_id.split(':');
    let prefix = segments.next().unwrap_or_default();
    (prefix, segments.collect())
}

pub struct ComponentManager {
    components: HashMap<String, Arc<dyn Component>>,
}

impl ComponentManager {
    pub fn load(registry: &ComponentRegistry, context: Arc<CommandContext>) -> Result<Self> {
        let mut components = HashMap::new();

        for record in registry.components() {
            if let Some(component) = instantiate(record.name, &record.factory, &context)? {
                components.insert(record.prefix.clone(), component);
            }
        }
        info!(
            "✅ Registered {}/{} components",
            components.len(),
            registry.components().len()
        );

        Ok(Self { components })
    }

    pub fn component(&self, prefix: &str) -> Option<&Arc<dyn Component>> {
        self.components.get(prefix)
    }

    pub async fn handle_component(&self, ctx: &Context, interaction: &MessageComponentInteraction) {
        let (prefix, args) = split_custom_id(&interaction.data.custom_id);
        let Some(component) = self.components.get(prefix) else {
            debug!("No component for custom id '{}'", interaction.data.custom_id);
            return;
        };

        let result = match interaction.data.component_type {
            ComponentType::Button => component.execute_button(ctx, interaction, &args).await,
            ComponentType::SelectMenu => component.execute_select_menu(ctx, interaction, &args).await,
            other => {
                debug!("Ignoring {other:?} interaction '{}'", interaction.data.custom_id);
                return;
            }
        };

        if let Err(e) = result {
            error!("Component '{}' failed: {e:#}", interaction.data.custom_id);
            report_failure(ctx, FailedInteraction::Component(interaction), &e).await;
        }
    }

    pub async fn handle_modal(&self, ctx: &Context, interaction: &ModalSubmitInteraction) {
        let (prefix, args) = split_custom_id(&interaction.data.custom_id);
        let Some(component) = self.components.get(prefix) else {
            debug!("No component for modal '{}'", interaction.data.custom_id);
            return;
        };

        if let Err(e) = component.execute_modal_submit(ctx, interaction, &args).await {
            error!("Modal '{}' failed: {e:#}", interaction.data.custom_id);
            report_failure(ctx, FailedInteraction::Modal(interaction), &e).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::testing::test_context;
    use crate::components::registry::{ComponentModule, ComponentRecord};
    use anyhow::anyhow;

    struct Noop;

    impl Component for Noop {}

    fn register(registry: &mut ComponentRegistry) -> Result<()> {
        registry.add_component(ComponentRecord::new("noop", |_| Ok(Noop)))?;
        registry.add_component(ComponentRecord::new("broken", |_| {
            Err::<Noop, _>(anyhow!("not today"))
        }))?;
        Ok(())
    }

    #[test]
    fn test_split_custom_id() {
        assert_eq!(
            split_custom_id("character:edit-message:42"),
            ("character", vec!["edit-message", "42"])
        );
        assert_eq!(split_custom_id("paginator"), ("paginator", vec![]));
        assert_eq!(split_custom_id(""), ("", vec![]));
    }

    #[test]
    fn test_load_skips_failing_factories() {
        let mut registry = ComponentRegistry::new();
        registry.load(&[ComponentModule::new("test", register)]).unwrap();

        let manager = ComponentManager::load(&registry, test_context()).unwrap();
        assert!(manager.component("noop").is_some());
        assert!(manager.component("broken").is_none());
    }
}
