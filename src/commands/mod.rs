//! # Command System
//!
//! Prefix, slash, context-menu and hybrid command handling with typed
//! argument resolution.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Registry, dispatcher and argument resolver for hybrid commands
//! - 2.1.0: Add modular handler infrastructure (handler trait, context, registry)
//! - 2.0.0: Remove bang commands, slash-only command system
//! - 1.0.0: Initial reorganization with modular command structure

pub mod argument;
pub mod context;
pub mod deploy;
pub mod failure;
pub mod handler;
pub mod handlers;
pub mod hybrid;
pub mod manager;
pub mod options;
pub mod registry;
pub mod subcommand;

pub use argument::{Argument, ArgumentList, ArgumentResolver, UserDirectory};
pub use context::CommandContext;
pub use handler::{
    ContextMenuCommand, ContextMenuCommandRecord, HybridCommand, HybridCommandRecord,
    PrefixCommand, PrefixCommandRecord, SlashCommand, SlashCommandRecord,
};
pub use hybrid::{HybridContext, ReplyPayload};
pub use manager::CommandManager;
pub use registry::{CommandModule, CommandRegistry};
pub use subcommand::{Subcommand, SubcommandIdentifier, SubcommandManager};
