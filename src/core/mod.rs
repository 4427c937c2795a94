//! # Core Module
//!
//! Configuration, error taxonomy and text helpers shared by every layer.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Add framework error taxonomy, replace response chunking with text helpers
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod error;
pub mod text;

// Re-export commonly used items
pub use config::Config;
pub use error::{AccessError, ConfigError, ResolutionError};
pub use text::{
    extract_id, extract_last_id, neutralize_mass_mentions, sanitize, truncate_chars,
    truncate_for_message, MESSAGE_LIMIT,
};
