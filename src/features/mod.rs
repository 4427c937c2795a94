//! # Features
//!
//! Domain features served by the command layer.
//!
//! - **Version**: 2.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.1.0: Guild settings
//! - 2.0.0: Roleplay characters
//! - 1.0.0: Initial feature layout

pub mod characters;
pub mod guilds;

pub use characters::{Character, CharacterManager, CharacterMessage};
pub use guilds::{GuildManager, GuildSettings};
