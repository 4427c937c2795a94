//! Component registration registry
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0
//!
//! ## Changelog
//! - 1.0.0: Initial implementation with the command registry lifecycle

use anyhow::Result;
use log::{error, info};
use std::any::type_name;
use std::sync::Arc;

use super::Component;
use crate::commands::context::CommandContext;
use crate::commands::handler::Factory;
use crate::commands::registry::RegistryState;
use crate::core::error::ConfigError;

pub struct ComponentRecord {
    /// First custom id segment routed to this component
    pub prefix: String,
    /// Registering type, for logs
    pub name: &'static str,
    pub factory: Factory<dyn Component>,
}

impl ComponentRecord {
    pub fn new<C, F>(prefix: &str, build: F) -> Self
    where
        C: Component + 'static,
        F: Fn(Arc<CommandContext>) -> Result<C> + Send + Sync + 'static,
    {
        Self {
            prefix: prefix.to_string(),
            name: type_name::<C>(),
            factory: Arc::new(move |ctx| Ok(Arc::new(build(ctx)?) as Arc<dyn Component>)),
        }
    }
}

#[derive(Clone, Copy)]
pub struct ComponentModule {
    pub name: &'static str,
    pub register: fn(&mut ComponentRegistry) -> Result<()>,
}

impl ComponentModule {
    pub const fn new(name: &'static str, register: fn(&mut ComponentRegistry) -> Result<()>) -> Self {
        Self { name, register }
    }
}

#[derive(Default)]
pub struct ComponentRegistry {
    state: RegistryState,
    components: Vec<ComponentRecord>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    /// Add a component; a prefix can only be claimed once
    pub fn add_component(&mut self, record: ComponentRecord) -> Result<(), ConfigError> {
        if self.state == RegistryState::Frozen {
            return Err(ConfigError::RegistryFrozen(record.name.to_string()));
        }
        if self.components.iter().any(|c| c.prefix == record.prefix) {
            return Err(ConfigError::DuplicateComponentPrefix(record.prefix));
        }
        self.components.push(record);
        Ok(())
    }

    pub fn components(&self) -> &[ComponentRecord] {
        &self.components
    }

    /// Run every module's registration function, then freeze
    pub fn load(&mut self, modules: &[ComponentModule]) -> Result<(), ConfigError> {
        if self.state != RegistryState::Unloaded {
            return Err(ConfigError::AlreadyLoaded);
        }
        self.state = RegistryState::Loading;

        for ComponentModule { name, register } in modules {
            let mark = self.components.len();
            if let Err(e) = register(self) {
                self.components.truncate(mark);
                error!("❌ Failed to register component module {name}: {e:#}");
            }
        }

        self.state = RegistryState::Frozen;
        info!("🔒 Component registry frozen with {} components", self.components.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl Component for Noop {}

    fn register_twice(registry: &mut ComponentRegistry) -> Result<()> {
        registry.add_component(ComponentRecord::new("dup", |_| Ok(Noop)))?;
        registry.add_component(ComponentRecord::new("dup", |_| Ok(Noop)))?;
        Ok(())
    }

    fn register_one(registry: &mut ComponentRegistry) -> Result<()> {
        registry.add_component(ComponentRecord::new("one", |_| Ok(Noop)))?;
        Ok(())
    }

    #[test]
    fn test_duplicate_prefix_is_rejected() {
        let mut registry = ComponentRegistry::new();
        registry
            .add_component(ComponentRecord::new("character", |_| Ok(Noop)))
            .unwrap();

        let result = registry.add_component(ComponentRecord::new("character", |_| Ok(Noop)));
        assert_eq!(
            result.err(),
            Some(ConfigError::DuplicateComponentPrefix("character".to_string()))
        );
        assert_eq!(registry.components().len(), 1);
    }

    #[test]
    fn test_load_discards_failed_module() {
        let mut registry = ComponentRegistry::new();
        registry
            .load(&[
                ComponentModule::new("twice", register_twice),
                ComponentModule::new("one", register_one),
            ])
            .unwrap();

        let prefixes: Vec<_> = registry.components().iter().map(|c| c.prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["one"]);
        assert_eq!(registry.state(), RegistryState::Frozen);
    }

    #[test]
    fn test_load_once() {
        let mut registry = ComponentRegistry::new();
        registry.load(&[]).unwrap();

        assert_eq!(registry.load(&[]), Err(ConfigError::AlreadyLoaded));
        assert!(matches!(
            registry.add_component(ComponentRecord::new("late", |_| Ok(Noop))),
            Err(ConfigError::RegistryFrozen(_))
        ));
    }
}
