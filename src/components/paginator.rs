//! Button paginator for embed lists
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.5.0
//!
//! ## Changelog
//! - 1.0.0: First/previous/next/last buttons with an inactivity timeout

use anyhow::{Context as _, Result};
use serenity::builder::{CreateComponents, CreateEmbed};
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::InteractionResponseType;
use std::time::Duration;

use super::manager::split_custom_id;
use crate::commands::hybrid::{HybridContext, ReplyPayload};

pub const PAGINATOR_PREFIX: &str = "paginator";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    First,
    Previous,
    Next,
    Last,
}

impl PageAction {
    const ALL: [PageAction; 4] = [
        PageAction::First,
        PageAction::Previous,
        PageAction::Next,
        PageAction::Last,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PageAction::First => "first",
            PageAction::Previous => "previous",
            PageAction::Next => "next",
            PageAction::Last => "last",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PageAction::First => "⏮",
            PageAction::Previous => "◀",
            PageAction::Next => "▶",
            PageAction::Last => "⏭",
        }
    }

    pub fn from_custom_id(custom_id: &str) -> Option<Self> {
        let (prefix, args) = split_custom_id(custom_id);
        if prefix != PAGINATOR_PREFIX {
            return None;
        }
        let key = args.first()?;
        Self::ALL.into_iter().find(|action| action.key() == *key)
    }
}

/// Page shown after `action` on page `index` of `len`
pub fn next_index(action: PageAction, index: usize, len: usize) -> usize {
    let last = len.saturating_sub(1);
    match action {
        PageAction::First => 0,
        PageAction::Previous => index.saturating_sub(1),
        PageAction::Next => (index + 1).min(last),
        PageAction::Last => last,
    }
}

/// Navigation row for page `index` of `len`
pub fn buttons(index: usize, len: usize, disabled: bool) -> CreateComponents {
    let last = len.saturating_sub(1);
    CreateComponents::default()
        .create_action_row(|row| {
            for action in PageAction::ALL {
                let unavailable = match action {
                    PageAction::First | PageAction::Previous => index == 0,
                    PageAction::Next | PageAction::Last => index >= last,
                };
                row.create_button(|button| {
                    button
                        .custom_id(format!("{PAGINATOR_PREFIX}:{}", action.key()))
                        .label(action.label())
                        .style(ButtonStyle::Secondary)
                        .disabled(disabled || unavailable)
                });
            }
            row
        })
        .to_owned()
}

/// Embeds browsed one page at a time by the invoking user
pub struct Paginator {
    pages: Vec<CreateEmbed>,
    timeout: Duration,
}

impl Paginator {
    pub fn new(pages: Vec<CreateEmbed>) -> Self {
        Self {
            pages,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn page(&self, index: usize) -> CreateEmbed {
        let mut embed = self.pages[index].clone();
        if self.pages.len() > 1 {
            embed.footer(|f| f.text(format!("Page {}/{}", index + 1, self.pages.len())));
        }
        embed
    }

    /// Send the first page and follow button presses until the timeout
    ///
    /// A single page is sent without buttons. When the timeout expires the
    /// buttons stay visible but disabled.
    pub async fn start(self, context: &HybridContext<'_>) -> Result<()> {
        if self.pages.is_empty() {
            return Ok(());
        }
        if self.pages.len() == 1 {
            context.send(ReplyPayload::new().embed(self.page(0))).await?;
            return Ok(());
        }

        let len = self.pages.len();
        let mut index = 0;
        let mut message = context
            .send(
                ReplyPayload::new()
                    .embed(self.page(index))
                    .components(buttons(index, len, false)),
            )
            .await?;

        let ctx = context.serenity();
        let author = context.user().id;

        while let Some(interaction) = message
            .await_component_interaction(ctx)
            .timeout(self.timeout)
            .await
        {
            if interaction.user.id != author {
                interaction
                    .create_interaction_response(&ctx.http, |r| {
                        r.kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|d| {
                                d.content("You can't use this button!").ephemeral(true)
                            })
                    })
                    .await
                    .context("Failed to reject paginator button")?;
                continue;
            }

            let Some(action) = PageAction::from_custom_id(&interaction.data.custom_id) else {
                continue;
            };
            index = next_index(action, index, len);

            interaction
                .create_interaction_response(&ctx.http, |r| {
                    r.kind(InteractionResponseType::UpdateMessage)
                        .interaction_response_data(|d| {
                            d.set_embeds(vec![self.page(index)])
                                .set_components(buttons(index, len, false))
                        })
                })
                .await
                .context("Failed to turn page")?;
        }

        context
            .edit(
                &mut message,
                ReplyPayload::new()
                    .embed(self.page(index))
                    .components(buttons(index, len, true)),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn disabled_flags(components: &CreateComponents) -> Vec<bool> {
        components.0[0]["components"]
            .as_array()
            .unwrap()
            .iter()
            .map(|button| button["disabled"] == Value::Bool(true))
            .collect()
    }

    #[test]
    fn test_next_index_stays_in_bounds() {
        assert_eq!(next_index(PageAction::Previous, 0, 3), 0);
        assert_eq!(next_index(PageAction::Next, 1, 3), 2);
        assert_eq!(next_index(PageAction::Next, 2, 3), 2);
        assert_eq!(next_index(PageAction::First, 2, 3), 0);
        assert_eq!(next_index(PageAction::Last, 0, 3), 2);
    }

    #[test]
    fn test_action_from_custom_id() {
        assert_eq!(PageAction::from_custom_id("paginator:next"), Some(PageAction::Next));
        assert_eq!(PageAction::from_custom_id("paginator:sideways"), None);
        assert_eq!(PageAction::from_custom_id("character:next"), None);
    }

    #[test]
    fn test_buttons_disable_at_edges() {
        assert_eq!(disabled_flags(&buttons(0, 3, false)), vec![true, true, false, false]);
        assert_eq!(disabled_flags(&buttons(1, 3, false)), vec![false, false, false, false]);
        assert_eq!(disabled_flags(&buttons(2, 3, false)), vec![false, false, true, true]);
        assert_eq!(disabled_flags(&buttons(1, 3, true)), vec![true, true, true, true]);
    }

    #[test]
    fn test_paginator_defaults() {
        let paginator = Paginator::new(vec![CreateEmbed::default(), CreateEmbed::default()]);
        assert_eq!(paginator.len(), 2);
        assert_eq!(paginator.timeout, DEFAULT_TIMEOUT);
    }
}
