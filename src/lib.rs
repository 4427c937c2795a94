// Core layer - shared types and configuration
pub mod core;

// Persistence
pub mod database;

// Features layer - roleplay characters
pub mod features;

// Application layer - commands and message components
pub mod commands;
pub mod components;

pub use core::Config;
pub use database::Database;
