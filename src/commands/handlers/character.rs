//! Character management command
//!
//! Handles: character create, list, info, delete, edit name/tag/prefix/avatar
//!
//! Slash invocations pick characters by id through autocomplete; prefix
//! invocations pick them by tag.
//!
//! - **Version**: 1.2.1
//! - **Since**: 0.5.0
//!
//! ## Changelog
//! - 1.2.1: Usage hints use the server's prefix
//! - 1.2.0: Avatar from image links, validated with a HEAD request
//! - 1.1.0: Paginated character list
//! - 1.0.0: Initial character CRUD

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use log::{debug, info};
use serenity::builder::{
    CreateApplicationCommand, CreateApplicationCommandOption, CreateComponents, CreateEmbed,
};
use serenity::model::application::command::CommandOptionType;
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::autocomplete::AutocompleteInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::{Attachment, AttachmentType};
use serenity::prelude::Context;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use crate::commands::argument::{Argument, ArgumentList, ArgumentResolver, ResolvedUser};
use crate::commands::context::CommandContext;
use crate::commands::handler::{HybridCommand, HybridCommandRecord};
use crate::commands::hybrid::{HybridContext, ReplyPayload};
use crate::commands::options::{focused_option, get_attachment_option, get_string_option, subcommand_path};
use crate::commands::registry::CommandRegistry;
use crate::commands::subcommand::{Subcommand, SubcommandIdentifier, SubcommandManager};
use crate::components::Paginator;
use crate::core::error::ConfigError;
use crate::core::sanitize;
use crate::features::characters::{
    Character, CHARACTER_COLOR, MAX_NAME_LENGTH, MAX_PREFIX_LENGTH, MAX_TAG_LENGTH,
};

const CHARACTERS_PER_PAGE: usize = 5;
const MAX_AUTOCOMPLETE_CHOICES: usize = 25;
const DELETE_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(30);
const DELETE_YES: &str = "character:delete:yes";
const DELETE_NO: &str = "character:delete:no";

pub fn register(registry: &mut CommandRegistry) -> Result<()> {
    registry.add_hybrid_command(HybridCommandRecord::new(
        schema(),
        &["character", "char"],
        CharacterCommand::new,
    ))?;
    Ok(())
}

fn character_option(option: &mut CreateApplicationCommandOption) -> &mut CreateApplicationCommandOption {
    option
        .name("character")
        .description("Specific a character.")
        .kind(CommandOptionType::String)
        .set_autocomplete(true)
        .required(true)
}

fn user_option(option: &mut CreateApplicationCommandOption) -> &mut CreateApplicationCommandOption {
    option
        .name("user")
        .description("Choose a user to show their characters.")
        .kind(CommandOptionType::User)
}

fn schema() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("character")
        .description("Character management command.")
        .dm_permission(false)
        .create_option(|sub| {
            sub.name("create")
                .description("Create a new character.")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|option| {
                    option
                        .name("tag")
                        .description("Specific character tag.")
                        .kind(CommandOptionType::String)
                        .min_length(1)
                        .max_length(MAX_TAG_LENGTH as u16)
                        .required(true)
                })
        })
        .create_option(|group| {
            group
                .name("edit")
                .description("Edit character information.")
                .kind(CommandOptionType::SubCommandGroup)
                .create_sub_option(|sub| {
                    sub.name("name")
                        .description("Update display name for a character.")
                        .kind(CommandOptionType::SubCommand)
                        .create_sub_option(character_option)
                        .create_sub_option(|option| {
                            option
                                .name("name")
                                .description("Specific a new name for the character.")
                                .kind(CommandOptionType::String)
                                .min_length(1)
                                .max_length(MAX_NAME_LENGTH as u16)
                                .required(true)
                        })
                })
                .create_sub_option(|sub| {
                    sub.name("tag")
                        .description("Update tag for a character.")
                        .kind(CommandOptionType::SubCommand)
                        .create_sub_option(character_option)
                        .create_sub_option(|option| {
                            option
                                .name("tag")
                                .description("Specific a new tag for the character.")
                                .kind(CommandOptionType::String)
                                .min_length(1)
                                .max_length(MAX_TAG_LENGTH as u16)
                                .required(true)
                        })
                })
                .create_sub_option(|sub| {
                    sub.name("prefix")
                        .description("Set prefix for a character.")
                        .kind(CommandOptionType::SubCommand)
                        .create_sub_option(character_option)
                        .create_sub_option(|option| {
                            option
                                .name("prefix")
                                .description("Specific a new prefix for the character.")
                                .kind(CommandOptionType::String)
                                .min_length(1)
                                .max_length(MAX_PREFIX_LENGTH as u16)
                                .required(true)
                        })
                })
                .create_sub_option(|sub| {
                    sub.name("avatar")
                        .description("Set avatar for a character.")
                        .kind(CommandOptionType::SubCommand)
                        .create_sub_option(character_option)
                        .create_sub_option(|option| {
                            option
                                .name("avatar")
                                .description("Upload a file attachment.")
                                .kind(CommandOptionType::Attachment)
                                .required(true)
                        })
                })
        })
        .create_option(|sub| {
            sub.name("list")
                .description("Shows a list of your characters.")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(user_option)
        })
        .create_option(|sub| {
            sub.name("info")
                .description("Show character information.")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(character_option)
                .create_sub_option(user_option)
        })
        .create_option(|sub| {
            sub.name("delete")
                .description("Delete a character.")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(character_option)
        })
        .to_owned()
}

fn character_argument() -> Result<Argument, ConfigError> {
    Argument::string("character")
        .description("Character tag")
        .required()
        .build()
}

fn subcommands() -> Result<SubcommandManager, ConfigError> {
    SubcommandManager::new()
        .with(Subcommand::new("create", "create").arguments(ArgumentList::of(vec![
            Argument::string("tag")
                .description("Character tag")
                .min_length(1)
                .max_length(MAX_TAG_LENGTH as usize)
                .required()
                .build()?,
        ])?))?
        .with(Subcommand::new("list", "list").arguments(ArgumentList::of(vec![
            Argument::user("user").description("Owner of the characters").build()?,
        ])?))?
        .with(Subcommand::new("info", "info").arguments(ArgumentList::of(vec![
            Argument::user("user").description("Owner of the character").build()?,
            character_argument()?,
        ])?))?
        .with(
            Subcommand::new("delete", "delete")
                .arguments(ArgumentList::of(vec![character_argument()?])?),
        )?
        .with(
            Subcommand::new("edit_name", SubcommandIdentifier::new("edit.name", &["edit.*.name"]))
                .arguments(ArgumentList::new(vec![
                    Some(character_argument()?),
                    None,
                    Some(
                        Argument::string("name")
                            .description("New display name")
                            .required()
                            .tuple()
                            .build()?,
                    ),
                ])?),
        )?
        .with(
            Subcommand::new("edit_tag", SubcommandIdentifier::new("edit.tag", &["edit.*.tag"]))
                .arguments(ArgumentList::new(vec![
                    Some(character_argument()?),
                    None,
                    Some(
                        Argument::string("tag")
                            .description("New tag")
                            .min_length(1)
                            .max_length(MAX_TAG_LENGTH as usize)
                            .required()
                            .build()?,
                    ),
                ])?),
        )?
        .with(
            Subcommand::new("edit_prefix", SubcommandIdentifier::new("edit.prefix", &["edit.*.prefix"]))
                .arguments(ArgumentList::new(vec![
                    Some(character_argument()?),
                    None,
                    Some(
                        Argument::string("prefix")
                            .description("Text typed before a message to speak as the character")
                            .min_length(1)
                            .max_length(MAX_PREFIX_LENGTH as usize)
                            .required()
                            .build()?,
                    ),
                ])?),
        )?
        .with(
            Subcommand::new("edit_avatar", SubcommandIdentifier::new("edit.avatar", &["edit.*.avatar"]))
                .arguments(ArgumentList::new(vec![
                    Some(character_argument()?),
                    None,
                    Some(Argument::string("avatar").description("Image link").build()?),
                ])?),
        )
}

/// Whether `url` is an http(s) link
pub fn is_http_url(url: &str) -> bool {
    reqwest::Url::parse(url).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Whether `url` answers a HEAD request with an image content type
async fn is_image_url(url: &str) -> bool {
    if !is_http_url(url) {
        return false;
    }

    match reqwest::Client::new().head(url).send().await {
        Ok(response) => response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("image/")),
        Err(e) => {
            debug!("HEAD {url} failed: {e}");
            false
        }
    }
}

fn is_image_attachment(attachment: &Attachment) -> bool {
    attachment
        .content_type
        .as_deref()
        .is_some_and(|content_type| content_type.starts_with("image/"))
}

/// Upload name for an avatar of the given content type
pub fn avatar_filename(content_type: Option<&str>) -> String {
    let extension = content_type
        .and_then(|content_type| content_type.strip_prefix("image/"))
        .map(|subtype| subtype.split(';').next().unwrap_or(subtype).trim())
        .filter(|subtype| !subtype.is_empty() && subtype.chars().all(char::is_alphanumeric))
        .unwrap_or("png");
    format!("avatar.{extension}")
}

/// Character list pages for `owner`, five characters per page
pub fn list_pages(owner: &ResolvedUser, characters: &[Character]) -> Vec<CreateEmbed> {
    characters
        .chunks(CHARACTERS_PER_PAGE)
        .map(|chunk| {
            let mut embed = CreateEmbed::default();
            embed
                .author(|a| {
                    a.name(&owner.name);
                    if let Some(avatar_url) = &owner.avatar_url {
                        a.icon_url(avatar_url);
                    }
                    a
                })
                .color(CHARACTER_COLOR);

            for character in chunk {
                let prefix = match &character.prefix {
                    Some(prefix) => format!("`{prefix}`"),
                    None => "None".to_string(),
                };
                embed.field(
                    character.display_name(),
                    format!("> **Prefix:** {prefix}\n> **Tag:** {}", character.tag),
                    false,
                );
            }
            embed
        })
        .collect()
}

/// Autocomplete choices as `(label, character id)` matching `input`
pub fn autocomplete_choices(characters: &[Character], input: &str) -> Vec<(String, String)> {
    let input = input.trim().to_lowercase();
    characters
        .iter()
        .filter(|character| character.display_name().to_lowercase().contains(&input))
        .take(MAX_AUTOCOMPLETE_CHOICES)
        .map(|character| (character.display_name_with_tag(), character.id.clone()))
        .collect()
}

fn delete_buttons() -> CreateComponents {
    CreateComponents::default()
        .create_action_row(|row| {
            row.create_button(|button| {
                button
                    .custom_id(DELETE_YES)
                    .label("Yes")
                    .emoji('🗑')
                    .style(ButtonStyle::Danger)
            })
            .create_button(|button| {
                button
                    .custom_id(DELETE_NO)
                    .label("No")
                    .emoji('❌')
                    .style(ButtonStyle::Secondary)
            })
        })
        .to_owned()
}

enum AvatarSource<'a> {
    Attachment(&'a Attachment),
    Url(&'a str),
}

pub struct CharacterCommand {
    context: Arc<CommandContext>,
    subcommands: SubcommandManager,
}

impl CharacterCommand {
    pub fn new(context: Arc<CommandContext>) -> Result<Self> {
        Ok(Self {
            context,
            subcommands: subcommands()?,
        })
    }

    async fn usage(&self, context: &HybridContext<'_>, syntax: &str) -> String {
        let prefix = self.context.prefix_in(context.guild_id()).await;
        format!("Invalid syntax used: {prefix}char {syntax}")
    }

    /// Character named by the `character` argument, replying when none matches
    async fn find_character(
        &self,
        context: &HybridContext<'_>,
        user_id: u64,
        args: &ArgumentResolver,
    ) -> Result<Option<Character>> {
        let key = args.string("character")?;
        let characters = &self.context.characters;

        let character = if context.is_interaction() {
            characters.get_by_id(user_id, key).await?
        } else {
            let tag = sanitize(key).to_lowercase();
            if tag.is_empty() {
                None
            } else {
                characters.get_by_tag(user_id, &tag).await?
            }
        };

        if character.is_none() {
            context
                .send(ReplyPayload::from("Couldn't find any character.").ephemeral())
                .await?;
        }
        Ok(character)
    }

    /// The `user` argument, or the invoking user
    fn target_user(context: &HybridContext<'_>, args: &ArgumentResolver) -> Result<ResolvedUser> {
        Ok(match args.get_user("user")? {
            Some(user) => user.clone(),
            None => ResolvedUser::from(context.user()),
        })
    }

    async fn on_create(&self, context: &HybridContext<'_>, args: &ArgumentResolver) -> Result<()> {
        let tag = sanitize(args.string("tag")?).to_lowercase();
        if tag.is_empty() {
            context.send(self.usage(context, "create [tag]").await).await?;
            return Ok(());
        }

        let user_id = context.user().id.0;
        let characters = &self.context.characters;

        if characters.get_by_tag(user_id, &tag).await?.is_some() {
            context
                .send(ReplyPayload::from(format!("Character with name `{tag}` already exists.")).ephemeral())
                .await?;
            return Ok(());
        }

        characters.create(user_id, &tag).await?;
        context
            .send(format!(
                "Created new character with tag `{tag}`. You can also change character tag and name later."
            ))
            .await?;
        Ok(())
    }

    async fn on_list(&self, context: &HybridContext<'_>, args: &ArgumentResolver) -> Result<()> {
        let owner = Self::target_user(context, args)?;
        let characters = self.context.characters.get_all(owner.id).await?;

        if characters.is_empty() {
            let subject = if owner.id == context.user().id.0 {
                "You don't"
            } else {
                "This user doesn't"
            };
            context.send(format!("{subject} have any characters.")).await?;
            return Ok(());
        }

        Paginator::new(list_pages(&owner, &characters)).start(context).await
    }

    async fn on_info(&self, context: &HybridContext<'_>, args: &ArgumentResolver) -> Result<()> {
        let owner = Self::target_user(context, args)?;
        let Some(character) = self.find_character(context, owner.id, args).await? else {
            return Ok(());
        };

        context
            .send(ReplyPayload::new().embed(character.information_embed()))
            .await?;
        Ok(())
    }

    async fn on_delete(&self, context: &HybridContext<'_>, args: &ArgumentResolver) -> Result<()> {
        let user_id = context.user().id;
        let Some(character) = self.find_character(context, user_id.0, args).await? else {
            return Ok(());
        };
        let display_name = character.display_name().to_string();

        let message = context
            .send(
                ReplyPayload::new()
                    .content(format!("Are you sure you want to delete character {display_name}?"))
                    .embed(character.information_embed())
                    .components(delete_buttons()),
            )
            .await?;

        let ctx = context.serenity();
        while let Some(interaction) = message
            .await_component_interaction(ctx)
            .timeout(DELETE_CONFIRMATION_TIMEOUT)
            .await
        {
            if interaction.user.id != user_id {
                interaction
                    .create_interaction_response(&ctx.http, |r| {
                        r.kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|d| {
                                d.content("You can't use this button!").ephemeral(true)
                            })
                    })
                    .await
                    .context("Failed to reject confirmation button")?;
                continue;
            }

            match interaction.data.custom_id.as_str() {
                DELETE_YES => {
                    self.context.characters.delete(user_id.0, &character.id).await?;
                    interaction
                        .create_interaction_response(&ctx.http, |r| {
                            r.kind(InteractionResponseType::UpdateMessage)
                                .interaction_response_data(|d| {
                                    d.content(format!("Successfully deleted character {display_name}"))
                                        .set_components(CreateComponents::default())
                                })
                        })
                        .await
                        .context("Failed to confirm deletion")?;
                    info!("🗑️ {} deleted character {}", context.user().name, character.tag);
                    return Ok(());
                }
                DELETE_NO => return context.delete(&message).await,
                _ => {}
            }
        }

        // nobody answered
        context.delete(&message).await
    }

    async fn on_edit_name(&self, context: &HybridContext<'_>, args: &ArgumentResolver) -> Result<()> {
        let Some(mut character) = self.find_character(context, context.user().id.0, args).await? else {
            return Ok(());
        };

        let name = args.get_strings("name")?.join(" ");
        if name.is_empty() {
            context.send(self.usage(context, "edit [tag] name [...name]").await).await?;
            return Ok(());
        }
        if name.chars().count() > MAX_NAME_LENGTH as usize {
            context
                .send(format!("Character names can be at most {MAX_NAME_LENGTH} characters long."))
                .await?;
            return Ok(());
        }

        let old_name = character.display_name().to_string();
        character.name = Some(name.clone());
        self.context.characters.update(&character).await?;

        context
            .send(format!("Successfully changed character name from `{old_name}` to `{name}`."))
            .await?;
        Ok(())
    }

    async fn on_edit_tag(&self, context: &HybridContext<'_>, args: &ArgumentResolver) -> Result<()> {
        let user_id = context.user().id.0;
        let Some(mut character) = self.find_character(context, user_id, args).await? else {
            return Ok(());
        };

        let new_tag = sanitize(args.string("tag")?).to_lowercase();
        if new_tag.is_empty() {
            context.send(self.usage(context, "edit [tag] tag [new tag]").await).await?;
            return Ok(());
        }

        if let Some(existing) = self.context.characters.get_by_tag(user_id, &new_tag).await? {
            context
                .send(format!("{} already owned this tag.", existing.display_name()))
                .await?;
            return Ok(());
        }

        let old_tag = std::mem::replace(&mut character.tag, new_tag.clone());
        self.context.characters.update(&character).await?;

        context
            .send(format!("Successfully changed character tag from `{old_tag}` to `{new_tag}`."))
            .await?;
        Ok(())
    }

    async fn on_edit_prefix(&self, context: &HybridContext<'_>, args: &ArgumentResolver) -> Result<()> {
        let user_id = context.user().id.0;
        let Some(mut character) = self.find_character(context, user_id, args).await? else {
            return Ok(());
        };

        let prefix = args
            .string("prefix")?
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        if prefix.is_empty() {
            context.send(self.usage(context, "edit [tag] prefix [prefix]").await).await?;
            return Ok(());
        }

        if let Some(existing) = self.context.characters.get_by_prefix(user_id, &prefix).await? {
            context
                .send(format!("{} already owned prefix `{prefix}`.", existing.display_name()))
                .await?;
            return Ok(());
        }

        let old_prefix = character.prefix.replace(prefix.clone());
        self.context.characters.update(&character).await?;

        let reply = match old_prefix {
            Some(old_prefix) => {
                format!("Successfully changed character prefix from `{old_prefix}` to `{prefix}`.")
            }
            None => format!("Successfully set character prefix to `{prefix}`."),
        };
        context.send(reply).await?;
        Ok(())
    }

    async fn on_edit_avatar(&self, context: &HybridContext<'_>, args: &ArgumentResolver) -> Result<()> {
        let Some(mut character) = self.find_character(context, context.user().id.0, args).await? else {
            return Ok(());
        };

        let source = match context {
            HybridContext::Interaction { interaction, .. } => {
                let (_, options) = subcommand_path(&interaction.data.options);
                get_attachment_option(options, "avatar")
                    .filter(|attachment| is_image_attachment(attachment))
                    .map(AvatarSource::Attachment)
            }
            HybridContext::Message { message, .. } => {
                match message.attachments.first() {
                    Some(attachment) if is_image_attachment(attachment) => {
                        Some(AvatarSource::Attachment(attachment))
                    }
                    _ => {
                        let url = match args.get_string("avatar")? {
                            Some(url) => is_image_url(url).await.then_some(url),
                            None => None,
                        };
                        let Some(url) = url else {
                            context.send("You must specific an image to set.").await?;
                            return Ok(());
                        };
                        Some(AvatarSource::Url(url))
                    }
                }
            }
        };

        let Some(source) = source else {
            context
                .send(
                    ReplyPayload::from(
                        "Invalid attachment uploaded! Please use a valid image file (PNG, JPG, etc).",
                    )
                    .ephemeral(),
                )
                .await?;
            return Ok(());
        };

        let (data, filename) = match source {
            AvatarSource::Attachment(attachment) => (
                attachment.download().await.context("Failed to download avatar")?,
                avatar_filename(attachment.content_type.as_deref()),
            ),
            AvatarSource::Url(url) => {
                let response = reqwest::get(url).await.context("Failed to download avatar")?;
                let filename = avatar_filename(
                    response
                        .headers()
                        .get(reqwest::header::CONTENT_TYPE)
                        .and_then(|value| value.to_str().ok()),
                );
                let bytes = response.bytes().await.context("Failed to read avatar")?;
                (bytes.to_vec(), filename)
            }
        };

        // the uploaded copy keeps the avatar alive as long as this message exists
        let mut message = context
            .send(ReplyPayload::from("Updating avatar...").file(AttachmentType::Bytes {
                data: Cow::Owned(data),
                filename,
            }))
            .await?;

        let Some(uploaded) = message.attachments.first().map(|a| a.url.clone()) else {
            context.edit(&mut message, "Failed to get message attachment.").await?;
            return Ok(());
        };

        character.avatar_url = Some(uploaded);
        self.context.characters.update(&character).await?;

        context
            .edit(
                &mut message,
                format!(
                    "Successfully updated avatar for {}!\n*Keep this message and channel safe! Otherwise your character will lose its avatar.*",
                    character.display_name()
                ),
            )
            .await
    }
}

#[async_trait]
impl HybridCommand for CharacterCommand {
    async fn execute(&self, _context: &HybridContext<'_>, _args: &ArgumentResolver) -> Result<()> {
        Ok(())
    }

    fn subcommands(&self) -> Option<&SubcommandManager> {
        Some(&self.subcommands)
    }

    async fn run_subcommand(
        &self,
        key: &str,
        context: &HybridContext<'_>,
        args: &ArgumentResolver,
    ) -> Result<()> {
        match key {
            "create" => self.on_create(context, args).await,
            "list" => self.on_list(context, args).await,
            "info" => self.on_info(context, args).await,
            "delete" => self.on_delete(context, args).await,
            "edit_name" => self.on_edit_name(context, args).await,
            "edit_tag" => self.on_edit_tag(context, args).await,
            "edit_prefix" => self.on_edit_prefix(context, args).await,
            "edit_avatar" => self.on_edit_avatar(context, args).await,
            _ => Ok(()),
        }
    }

    async fn autocomplete(&self, ctx: &Context, interaction: &AutocompleteInteraction) -> Result<()> {
        let (_, options) = subcommand_path(&interaction.data.options);
        let Some(focused) = focused_option(options) else {
            return Ok(());
        };
        if focused.name != "character" {
            return Ok(());
        }

        let user_id = get_string_option(options, "user")
            .and_then(|id| id.parse().ok())
            .unwrap_or(interaction.user.id.0);
        let input = focused
            .value
            .as_ref()
            .and_then(|value| value.as_str())
            .unwrap_or_default();

        let characters = self.context.characters.get_all(user_id).await?;
        let choices = autocomplete_choices(&characters, input);

        interaction
            .create_autocomplete_response(&ctx.http, |response| {
                for (name, value) in choices {
                    response.add_string_choice(name, value);
                }
                response
            })
            .await
            .context("Failed to send autocomplete choices")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::testing::test_context;

    fn owner() -> ResolvedUser {
        ResolvedUser {
            id: 1,
            name: "alice".to_string(),
            bot: false,
            avatar_url: None,
        }
    }

    fn named(tag: &str, name: Option<&str>) -> Character {
        let mut character = Character::new(1, tag);
        character.name = name.map(str::to_string);
        character
    }

    #[test]
    fn test_subcommand_arguments_are_valid() {
        let command = CharacterCommand::new(test_context()).unwrap();
        let subcommands = command.subcommands().unwrap();

        assert_eq!(subcommands.len(), 8);
        assert_eq!(subcommands.from_chat_input("edit.name").unwrap().key, "edit_name");
    }

    #[test]
    fn test_prefix_tokens_route_to_subcommands() {
        let command = CharacterCommand::new(test_context()).unwrap();
        let subcommands = command.subcommands().unwrap();
        let tokens = |content: &str| -> Vec<String> {
            content.split_whitespace().map(str::to_string).collect()
        };

        let edit = subcommands.from_tokens(&tokens("char edit hero name Brave Hero")).unwrap();
        assert_eq!(edit.key, "edit_name");

        let avatar = subcommands.from_tokens(&tokens("char edit hero avatar")).unwrap();
        assert_eq!(avatar.key, "edit_avatar");

        assert_eq!(subcommands.from_tokens(&tokens("char info hero")).unwrap().key, "info");
        assert!(subcommands.from_tokens(&tokens("char rename hero")).is_none());
    }

    #[test]
    fn test_schema_declares_subcommands() {
        let schema = schema();
        let options = schema.0["options"].as_array().unwrap();
        let names: Vec<_> = options.iter().map(|o| o["name"].as_str().unwrap()).collect();

        assert_eq!(names, vec!["create", "edit", "list", "info", "delete"]);
        assert_eq!(options[1]["options"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_list_pages_hold_five_characters() {
        let characters: Vec<_> = (0..7).map(|i| named(&format!("c{i}"), None)).collect();
        let pages = list_pages(&owner(), &characters);

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].0["fields"].as_array().unwrap().len(), 5);
        assert_eq!(pages[1].0["fields"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_autocomplete_filters_by_display_name() {
        let characters = vec![named("hero", Some("Brave Hero")), named("villain", None)];

        let choices = autocomplete_choices(&characters, " HERO");
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].0, "Brave Hero (hero)");
        assert_eq!(choices[0].1, characters[0].id);

        assert_eq!(autocomplete_choices(&characters, "").len(), 2);
    }

    #[test]
    fn test_autocomplete_caps_choices() {
        let characters: Vec<_> = (0..30).map(|i| named(&format!("c{i}"), None)).collect();
        assert_eq!(autocomplete_choices(&characters, "c").len(), MAX_AUTOCOMPLETE_CHOICES);
    }

    #[test]
    fn test_avatar_filename() {
        assert_eq!(avatar_filename(Some("image/jpeg")), "avatar.jpeg");
        assert_eq!(avatar_filename(Some("image/png; charset=binary")), "avatar.png");
        assert_eq!(avatar_filename(Some("text/html")), "avatar.png");
        assert_eq!(avatar_filename(None), "avatar.png");
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://cdn.example.com/a.png"));
        assert!(!is_http_url("ftp://example.com/a.png"));
        assert!(!is_http_url("hero"));
    }
}
