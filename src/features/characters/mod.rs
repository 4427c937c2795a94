//! # Feature: Roleplay Characters
//!
//! Users register characters and post as them through channel webhooks.
//! A message starting with a character's prefix is deleted and re-sent with
//! the character's name and avatar.
//!
//! - **Version**: 1.3.0
//! - **Since**: 0.5.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.3.0: Reply previews for relayed replies
//! - 1.2.0: Per-channel webhook cache
//! - 1.1.0: Character avatars
//! - 1.0.0: Initial release with tags, names and prefixes

pub mod manager;
pub mod relay;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serenity::builder::CreateEmbed;
use serenity::model::Timestamp;
use uuid::Uuid;

use crate::core::truncate_chars;

pub use manager::CharacterManager;
pub use relay::{edit_relayed_message, relay_message};

/// Longest content a relayed message may carry, leaving room for the reply preview
pub const MAX_MESSAGE_CONTENT_LENGTH: usize = 1_700;

/// Characters of the replied message shown in a reply preview
pub const MAX_PREVIEW_CONTENT_LENGTH: usize = 50;

pub const MAX_TAG_LENGTH: u64 = 20;
pub const MAX_NAME_LENGTH: u64 = 50;
pub const MAX_PREFIX_LENGTH: u64 = 10;

/// Embed accent color for character embeds
pub const CHARACTER_COLOR: u32 = 0xFEE75C;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub user_id: u64,
    pub tag: String,
    pub name: Option<String>,
    pub prefix: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Character {
    pub fn new(user_id: u64, tag: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            tag: tag.into(),
            name: None,
            prefix: None,
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    /// Name if set, tag otherwise
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.tag)
    }

    /// `Name (tag)`, or just the tag for unnamed characters
    pub fn display_name_with_tag(&self) -> String {
        match &self.name {
            Some(name) => format!("{name} ({})", self.tag),
            None => self.tag.clone(),
        }
    }

    /// Content after this character's prefix, matched case-insensitively
    pub fn strip_prefix<'a>(&self, content: &'a str) -> Option<&'a str> {
        let prefix = self.prefix.as_deref().filter(|p| !p.is_empty())?;
        let head = content.get(..prefix.len())?;

        if head.to_lowercase() == prefix.to_lowercase() {
            content.get(prefix.len()..)
        } else {
            None
        }
    }

    pub fn information_embed(&self) -> CreateEmbed {
        let description = [
            format!("> **Tag:** `{}`", self.tag),
            format!("> **Prefix:** `{}`", self.prefix.as_deref().unwrap_or("none")),
            format!("> **Owner:** <@{}>", self.user_id),
            format!("> **Created at:** <t:{}:R>", self.created_at.timestamp()),
        ]
        .join("\n");

        let mut embed = CreateEmbed::default();
        embed
            .title(self.display_name())
            .color(CHARACTER_COLOR)
            .description(description)
            .timestamp(Timestamp::now());

        if let Some(avatar_url) = &self.avatar_url {
            embed.thumbnail(avatar_url);
        }

        embed
    }
}

/// A message sent through a webhook on behalf of a character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterMessage {
    /// Discord id of the webhook message
    pub id: u64,
    /// Content without the reply preview line
    pub content: String,
    pub replied_message_id: Option<u64>,
    /// Unset once the character is deleted
    pub character_id: Option<String>,
}

/// Small quoted line pointing at the replied message
pub fn reply_preview(author: &str, content: &str, url: &str) -> String {
    let content = truncate_chars(content, MAX_PREVIEW_CONTENT_LENGTH);
    format!("-# ╭ **{author}** - {content} [Jump To Message]({url})")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero() -> Character {
        let mut character = Character::new(123456789012345678, "hero");
        character.prefix = Some("H:".to_string());
        character
    }

    #[test]
    fn test_display_name_falls_back_to_tag() {
        let mut character = hero();
        assert_eq!(character.display_name(), "hero");
        assert_eq!(character.display_name_with_tag(), "hero");

        character.name = Some("Sir Hero".to_string());
        assert_eq!(character.display_name(), "Sir Hero");
        assert_eq!(character.display_name_with_tag(), "Sir Hero (hero)");
    }

    #[test]
    fn test_strip_prefix_is_case_insensitive() {
        let character = hero();
        assert_eq!(character.strip_prefix("h: hello"), Some(" hello"));
        assert_eq!(character.strip_prefix("H:hello"), Some("hello"));
        assert_eq!(character.strip_prefix("hello"), None);
        assert_eq!(character.strip_prefix("h"), None);
    }

    #[test]
    fn test_strip_prefix_without_prefix() {
        let mut character = hero();
        character.prefix = None;
        assert_eq!(character.strip_prefix("h: hello"), None);

        character.prefix = Some(String::new());
        assert_eq!(character.strip_prefix("anything"), None);
    }

    #[test]
    fn test_strip_prefix_respects_char_boundaries() {
        let mut character = hero();
        character.prefix = Some("ab".to_string());
        assert_eq!(character.strip_prefix("aé rest"), None);
    }

    #[test]
    fn test_new_characters_get_unique_ids() {
        let a = Character::new(1, "a");
        let b = Character::new(1, "b");
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_reply_preview_truncates_content() {
        let long = "x".repeat(80);
        let preview = reply_preview("Hero", &long, "https://discord.com/channels/1/2/3");

        assert!(preview.starts_with("-# ╭ **Hero** - "));
        assert!(preview.contains(&format!("{}...", "x".repeat(50))));
        assert!(preview.ends_with("[Jump To Message](https://discord.com/channels/1/2/3)"));
    }

    #[test]
    fn test_information_embed_fields() {
        let embed = hero().information_embed();
        let description = embed.0.get("description").and_then(|v| v.as_str()).unwrap();

        assert!(description.contains("> **Tag:** `hero`"));
        assert!(description.contains("> **Prefix:** `H:`"));
        assert!(description.contains("<@123456789012345678>"));
        assert_eq!(embed.0.get("title").and_then(|v| v.as_str()), Some("hero"));
    }
}
