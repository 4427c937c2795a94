//! SQLite persistence for guild settings, characters and relayed character messages
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.5.0
//!
//! ## Changelog
//! - 1.2.0: Guilds table with per-guild command prefix
//! - 1.1.0: Character messages keep their replied message id
//! - 1.0.0: Characters table

use anyhow::{anyhow, Context as _, Result};
use chrono::{DateTime, Utc};
use log::info;
use sqlite::{ConnectionThreadSafe, State, Statement};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::features::characters::{Character, CharacterMessage};
use crate::features::guilds::GuildSettings;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS guilds (
        id TEXT PRIMARY KEY,
        prefix TEXT
    );
    CREATE TABLE IF NOT EXISTS characters (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        tag TEXT NOT NULL,
        name TEXT,
        prefix TEXT,
        avatar_url TEXT,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_characters_user ON characters (user_id);
    CREATE TABLE IF NOT EXISTS character_messages (
        id TEXT PRIMARY KEY,
        content TEXT NOT NULL,
        replied_message_id TEXT,
        character_id TEXT
    );
";

const CHARACTER_COLUMNS: &str = "id, user_id, tag, name, prefix, avatar_url, created_at";

#[derive(Clone)]
pub struct Database {
    connection: Arc<Mutex<ConnectionThreadSafe>>,
}

impl Database {
    pub async fn new(path: &str) -> Result<Self> {
        let database = Self::open(path)?;
        info!("📦 Database ready at {path}");
        Ok(database)
    }

    /// Throwaway database, used by tests
    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    fn open(path: &str) -> Result<Self> {
        let connection = sqlite::Connection::open_thread_safe(path)
            .with_context(|| format!("Failed to open database at {path}"))?;
        connection
            .execute(SCHEMA)
            .context("Failed to create database schema")?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, ConnectionThreadSafe>> {
        self.connection
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))
    }

    /// Settings of a guild, if it has a row
    pub async fn get_guild(&self, id: u64) -> Result<Option<GuildSettings>> {
        let connection = self.lock()?;
        let mut statement = connection.prepare("SELECT id, prefix FROM guilds WHERE id = ?")?;
        statement.bind((1, id.to_string().as_str()))?;

        if statement.next()? != State::Row {
            return Ok(None);
        }
        Ok(Some(GuildSettings {
            id: parse_snowflake(&statement.read::<String, _>("id")?)?,
            prefix: statement.read::<Option<String>, _>("prefix")?,
        }))
    }

    /// Add a guild with default settings; false when it already had a row
    pub async fn insert_guild(&self, id: u64) -> Result<bool> {
        let connection = self.lock()?;
        {
            let mut statement = connection.prepare("INSERT OR IGNORE INTO guilds (id) VALUES (?)")?;
            statement.bind((1, id.to_string().as_str()))?;
            statement.next()?;
        }
        Ok(connection.change_count() > 0)
    }

    /// Set or clear a guild's prefix; false when the guild has no row
    pub async fn update_guild_prefix(&self, id: u64, prefix: Option<&str>) -> Result<bool> {
        let connection = self.lock()?;
        {
            let mut statement = connection.prepare("UPDATE guilds SET prefix = ? WHERE id = ?")?;
            statement.bind((1, prefix))?;
            statement.bind((2, id.to_string().as_str()))?;
            statement.next()?;
        }
        Ok(connection.change_count() > 0)
    }

    pub async fn get_characters(&self, user_id: u64) -> Result<Vec<Character>> {
        let connection = self.lock()?;
        let mut statement = connection.prepare(format!(
            "SELECT {CHARACTER_COLUMNS} FROM characters WHERE user_id = ? ORDER BY created_at"
        ))?;
        statement.bind((1, user_id.to_string().as_str()))?;

        let mut characters = Vec::new();
        while statement.next()? == State::Row {
            characters.push(read_character(&statement)?);
        }
        Ok(characters)
    }

    pub async fn insert_character(&self, character: &Character) -> Result<()> {
        let connection = self.lock()?;
        let mut statement = connection.prepare(format!(
            "INSERT INTO characters ({CHARACTER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"
        ))?;
        statement.bind((1, character.id.as_str()))?;
        statement.bind((2, character.user_id.to_string().as_str()))?;
        statement.bind((3, character.tag.as_str()))?;
        statement.bind((4, character.name.as_deref()))?;
        statement.bind((5, character.prefix.as_deref()))?;
        statement.bind((6, character.avatar_url.as_deref()))?;
        statement.bind((7, character.created_at.to_rfc3339().as_str()))?;
        statement.next()?;
        Ok(())
    }

    /// Overwrite the mutable fields of a character owned by `character.user_id`
    pub async fn update_character(&self, character: &Character) -> Result<bool> {
        let connection = self.lock()?;
        {
            let mut statement = connection.prepare(
                "UPDATE characters SET tag = ?, name = ?, prefix = ?, avatar_url = ?
                 WHERE id = ? AND user_id = ?",
            )?;
            statement.bind((1, character.tag.as_str()))?;
            statement.bind((2, character.name.as_deref()))?;
            statement.bind((3, character.prefix.as_deref()))?;
            statement.bind((4, character.avatar_url.as_deref()))?;
            statement.bind((5, character.id.as_str()))?;
            statement.bind((6, character.user_id.to_string().as_str()))?;
            statement.next()?;
        }
        Ok(connection.change_count() > 0)
    }

    /// Delete a character; its relayed messages stay but lose their owner
    pub async fn delete_character(&self, user_id: u64, id: &str) -> Result<bool> {
        let connection = self.lock()?;
        {
            let mut statement =
                connection.prepare("DELETE FROM characters WHERE id = ? AND user_id = ?")?;
            statement.bind((1, id))?;
            statement.bind((2, user_id.to_string().as_str()))?;
            statement.next()?;
        }
        if connection.change_count() == 0 {
            return Ok(false);
        }

        let mut statement = connection
            .prepare("UPDATE character_messages SET character_id = NULL WHERE character_id = ?")?;
        statement.bind((1, id))?;
        statement.next()?;
        Ok(true)
    }

    pub async fn insert_character_message(&self, message: &CharacterMessage) -> Result<()> {
        let connection = self.lock()?;
        let mut statement = connection.prepare(
            "INSERT INTO character_messages (id, content, replied_message_id, character_id)
             VALUES (?, ?, ?, ?)",
        )?;
        statement.bind((1, message.id.to_string().as_str()))?;
        statement.bind((2, message.content.as_str()))?;
        statement.bind((3, message.replied_message_id.map(|id| id.to_string()).as_deref()))?;
        statement.bind((4, message.character_id.as_deref()))?;
        statement.next()?;
        Ok(())
    }

    /// A relayed message and the character that sent it, if it still exists
    pub async fn get_character_message(
        &self,
        id: u64,
    ) -> Result<Option<(CharacterMessage, Option<Character>)>> {
        let connection = self.lock()?;
        let message = {
            let mut statement = connection.prepare(
                "SELECT id, content, replied_message_id, character_id
                 FROM character_messages WHERE id = ?",
            )?;
            statement.bind((1, id.to_string().as_str()))?;
            if statement.next()? != State::Row {
                return Ok(None);
            }
            CharacterMessage {
                id: parse_snowflake(&statement.read::<String, _>("id")?)?,
                content: statement.read::<String, _>("content")?,
                replied_message_id: statement
                    .read::<Option<String>, _>("replied_message_id")?
                    .map(|raw| parse_snowflake(&raw))
                    .transpose()?,
                character_id: statement.read::<Option<String>, _>("character_id")?,
            }
        };

        let character = match &message.character_id {
            Some(character_id) => {
                let mut statement = connection.prepare(format!(
                    "SELECT {CHARACTER_COLUMNS} FROM characters WHERE id = ?"
                ))?;
                statement.bind((1, character_id.as_str()))?;
                if statement.next()? == State::Row {
                    Some(read_character(&statement)?)
                } else {
                    None
                }
            }
            None => None,
        };

        Ok(Some((message, character)))
    }

    pub async fn update_character_message_content(&self, id: u64, content: &str) -> Result<()> {
        let connection = self.lock()?;
        let mut statement =
            connection.prepare("UPDATE character_messages SET content = ? WHERE id = ?")?;
        statement.bind((1, content))?;
        statement.bind((2, id.to_string().as_str()))?;
        statement.next()?;
        Ok(())
    }

    pub async fn delete_character_message(&self, id: u64) -> Result<bool> {
        let connection = self.lock()?;
        {
            let mut statement = connection.prepare("DELETE FROM character_messages WHERE id = ?")?;
            statement.bind((1, id.to_string().as_str()))?;
            statement.next()?;
        }
        Ok(connection.change_count() > 0)
    }
}

fn parse_snowflake(raw: &str) -> Result<u64> {
    raw.parse()
        .with_context(|| format!("Invalid snowflake stored in database: {raw}"))
}

fn read_character(statement: &Statement<'_>) -> Result<Character> {
    let created_at = statement.read::<String, _>("created_at")?;
    Ok(Character {
        id: statement.read::<String, _>("id")?,
        user_id: parse_snowflake(&statement.read::<String, _>("user_id")?)?,
        tag: statement.read::<String, _>("tag")?,
        name: statement.read::<Option<String>, _>("name")?,
        prefix: statement.read::<Option<String>, _>("prefix")?,
        avatar_url: statement.read::<Option<String>, _>("avatar_url")?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .with_context(|| format!("Invalid timestamp stored in database: {created_at}"))?
            .with_timezone(&Utc),
    })
}
