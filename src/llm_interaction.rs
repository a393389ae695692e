use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::config::RelayConfig;
use crate::constants;
use crate::error::RelayError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Role and content of one turn, as exchanged with the relay and the provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

// Structures matching the provider's /v1/chat/completions endpoint
#[derive(Serialize, Debug)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Puts the StudyChef instruction in front of the caller's turns.
pub fn with_system_prompt(messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let mut augmented = Vec::with_capacity(messages.len() + 1);
    augmented.push(ChatMessage::new(Role::System, constants::SYSTEM_PROMPT));
    augmented.extend(messages);
    augmented
}

/// Sends the conversation to the completion provider once and returns the whole answer.
#[instrument(skip(client, config, messages), fields(turns = messages.len()))]
pub async fn complete_chat(
    client: &Client,
    config: &RelayConfig,
    messages: Vec<ChatMessage>,
) -> Result<String, RelayError> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .ok_or(RelayError::MissingApiKey)?;

    let url = config.completions_url();
    let request_payload = CompletionRequest {
        model: &config.model,
        messages: with_system_prompt(messages),
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    };

    debug!(%url, model = %config.model, "Sending completion request");

    let response = client
        .post(&url)
        .bearer_auth(api_key)
        .json(&request_payload)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        error!(%status, %error_body, "Completion request failed");
        return Err(RelayError::Upstream {
            status: status.as_u16(),
            body: error_body,
        });
    }

    let completion = response
        .json::<CompletionResponse>()
        .await
        .map_err(|e| RelayError::MalformedResponse(e.to_string()))?;

    let answer = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| RelayError::MalformedResponse("response has no message content".to_string()))?;

    debug!(chars = answer.len(), "Received completion");
    Ok(answer)
}
