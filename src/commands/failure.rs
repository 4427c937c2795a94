//! Error notices for failed interactions
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.2.0: One notice path for every interaction kind
//! - 1.1.0: Skip notices for unknown or expired interactions
//! - 1.0.0: Ephemeral notice with follow-up fallback

use anyhow::Error;
use log::{debug, error};
use serenity::builder::{CreateInteractionResponse, CreateInteractionResponseFollowup};
use serenity::http::error::Error as HttpError;
use serenity::http::Http;
use serenity::json::{self, Value};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;

pub const ERROR_NOTICE: &str = "An error occurred while executing this command.";

/// Discord's "Unknown interaction" error code
const UNKNOWN_INTERACTION: isize = 10062;

/// The interaction a failed handler was serving
#[derive(Clone, Copy)]
pub enum FailedInteraction<'a> {
    Command(&'a ApplicationCommandInteraction),
    Component(&'a MessageComponentInteraction),
    Modal(&'a ModalSubmitInteraction),
}

impl FailedInteraction<'_> {
    /// Command name or custom id, for logs
    pub fn label(&self) -> &str {
        match self {
            FailedInteraction::Command(interaction) => &interaction.data.name,
            FailedInteraction::Component(interaction) => &interaction.data.custom_id,
            FailedInteraction::Modal(interaction) => &interaction.data.custom_id,
        }
    }

    /// Interaction id and token, all a response needs
    fn credentials(&self) -> (u64, &str) {
        match self {
            FailedInteraction::Command(interaction) => (interaction.id.0, &interaction.token),
            FailedInteraction::Component(interaction) => (interaction.id.0, &interaction.token),
            FailedInteraction::Modal(interaction) => (interaction.id.0, &interaction.token),
        }
    }
}

/// Whether the failure came from Discord rejecting an unknown or expired interaction
pub fn is_unknown_interaction(error: &Error) -> bool {
    error.chain().any(|cause| {
        let Some(serenity::Error::Http(http)) = cause.downcast_ref::<serenity::Error>() else {
            return false;
        };
        matches!(
            http.as_ref(),
            HttpError::UnsuccessfulRequest(response) if response.error.code == UNKNOWN_INTERACTION
        )
    })
}

/// Tell the user their interaction failed
///
/// Replies ephemerally, falling back to a follow-up when the interaction was
/// already acknowledged. Failing to notify is only logged.
pub async fn report_failure(ctx: &Context, interaction: FailedInteraction<'_>, failure: &Error) {
    if is_unknown_interaction(failure) {
        debug!("Interaction {} expired, skipping error notice", interaction.label());
        return;
    }

    let (id, token) = interaction.credentials();
    if let Err(e) = send_notice(&ctx.http, id, token).await {
        error!("Failed to send error notice for {}: {e}", interaction.label());
    }
}

/// Ephemeral interaction response carrying [`ERROR_NOTICE`]
fn notice_response() -> Value {
    let mut response = CreateInteractionResponse::default();
    response
        .kind(InteractionResponseType::ChannelMessageWithSource)
        .interaction_response_data(|data| data.content(ERROR_NOTICE).ephemeral(true));
    Value::from(json::hashmap_to_json_map(response.0))
}

/// Ephemeral follow-up carrying [`ERROR_NOTICE`]
fn notice_followup() -> Value {
    let mut followup = CreateInteractionResponseFollowup::default();
    followup.content(ERROR_NOTICE).ephemeral(true);
    Value::from(json::hashmap_to_json_map(followup.0))
}

async fn send_notice(http: &Http, id: u64, token: &str) -> serenity::Result<()> {
    if http
        .create_interaction_response(id, token, &notice_response())
        .await
        .is_ok()
    {
        return Ok(());
    }

    // already acknowledged
    http.create_followup_message(token, &notice_followup())
        .await
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_plain_failures_are_reported() {
        assert!(!is_unknown_interaction(&anyhow!("database unavailable")));

        let wrapped = anyhow!("timed out").context("Failed to send interaction response");
        assert!(!is_unknown_interaction(&wrapped));
    }

    #[test]
    fn test_notice_payloads_are_ephemeral() {
        let response = notice_response();
        assert_eq!(response["type"], 4);
        assert_eq!(response["data"]["content"], ERROR_NOTICE);
        assert_eq!(response["data"]["flags"], 64);

        let followup = notice_followup();
        assert_eq!(followup["content"], ERROR_NOTICE);
        assert_eq!(followup["flags"], 64);
    }

    #[test]
    fn test_other_serenity_errors_are_reported() {
        let error = Error::from(serenity::Error::Other("gateway closed"));
        assert!(!is_unknown_interaction(&error));
    }
}
