/*
Copyright 2024, Zep Software, Inc.

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use super::protocol::{ErrorCode, RelayResponse, WireMessage};
use crate::errors::{RelayError, RelayResult};
use crate::llm_client::{clean_input, CompletionParams, LlmClient, Message};
use crate::prompts::PersonaPrompt;

/// Model used for every relayed conversation
pub const CHAT_MODEL: &str = "gpt-4o-mini";
/// Sampling temperature used for every relayed conversation
pub const CHAT_TEMPERATURE: f32 = 0.7;
/// Upper bound on generated tokens per reply
pub const CHAT_MAX_TOKENS: u32 = 500;

impl RelayError {
    /// HTTP status the relay endpoint answers with
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::NotConfigured => 503,
            RelayError::InvalidBody { .. } => 400,
            RelayError::EmptyResponse
            | RelayError::InvalidCredentials(_)
            | RelayError::Provider(_) => 500,
        }
    }

    /// Wire error string; never carries provider detail
    pub fn code(&self) -> ErrorCode {
        match self {
            RelayError::NotConfigured => ErrorCode::ApiKeyNotConfigured,
            RelayError::InvalidBody { .. } => ErrorCode::InvalidRequestBody,
            RelayError::EmptyResponse => ErrorCode::NoResponse,
            RelayError::InvalidCredentials(_) => ErrorCode::ApiKeyInvalid,
            RelayError::Provider(_) => ErrorCode::ServerError,
        }
    }
}

/// Stateless forwarder from widget transcripts to the completion service.
///
/// Holds only immutable configuration, so one instance can serve any number
/// of concurrent requests.
pub struct ChatRelay {
    client: Arc<dyn LlmClient>,
    persona: PersonaPrompt,
}

impl ChatRelay {
    pub fn new(client: Arc<dyn LlmClient>, persona: PersonaPrompt) -> Self {
        Self { client, persona }
    }

    /// Fixed sampling policy; clients cannot tune it
    pub fn completion_params() -> CompletionParams {
        CompletionParams {
            model: CHAT_MODEL.to_string(),
            temperature: CHAT_TEMPERATURE,
            max_tokens: CHAT_MAX_TOKENS,
        }
    }

    /// Validate a raw request body into the client transcript.
    ///
    /// The body must be a JSON object whose `messages` field is an array of
    /// `{role: user|assistant, content}` entries with non-blank content.
    pub fn parse_transcript(body: &[u8]) -> RelayResult<Vec<Message>> {
        let invalid = |reason: String| RelayError::InvalidBody { reason };

        let value: Value =
            serde_json::from_slice(body).map_err(|e| invalid(format!("not JSON: {}", e)))?;

        let messages = value
            .get("messages")
            .filter(|messages| messages.is_array())
            .cloned()
            .ok_or_else(|| invalid("`messages` must be an array".to_string()))?;

        let wire: Vec<WireMessage> = serde_json::from_value(messages)
            .map_err(|e| invalid(format!("malformed message: {}", e)))?;

        wire.into_iter()
            .enumerate()
            .map(|(index, mut message)| {
                message.content = clean_input(&message.content).trim().to_string();
                if message.content.is_empty() {
                    return Err(invalid(format!("message {} is blank", index)));
                }
                Ok(message.into_message())
            })
            .collect()
    }

    /// Prefix the transcript with the persona instruction
    pub fn build_messages(&self, transcript: Vec<Message>) -> Vec<Message> {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(self.persona.to_message());
        messages.extend(transcript);
        messages
    }

    /// Run one relay cycle over a raw request body and return the reply text
    pub async fn relay(&self, body: &[u8]) -> RelayResult<String> {
        if !self.client.has_credentials() {
            error!("Completion API key is not configured");
            return Err(RelayError::NotConfigured);
        }

        let transcript = Self::parse_transcript(body)?;
        let turns = transcript.len();
        let messages = self.build_messages(transcript);

        let completion = self
            .client
            .chat_completion(&messages, &Self::completion_params())
            .await
            .map_err(|e| {
                error!("Chat completion failed: {}", e);
                if e.is_credential_failure() {
                    RelayError::InvalidCredentials(e)
                } else {
                    RelayError::Provider(e)
                }
            })?;

        if let Some(usage) = completion.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion usage"
            );
        }

        match completion.content {
            Some(text) if !text.trim().is_empty() => {
                info!(turns, "Relayed chat transcript");
                Ok(text)
            }
            _ => {
                error!("Completion service returned no text");
                Err(RelayError::EmptyResponse)
            }
        }
    }

    /// Like [`ChatRelay::relay`], folded into the status and body to send back
    pub async fn respond(&self, body: &[u8]) -> (u16, RelayResponse) {
        match self.relay(body).await {
            Ok(text) => (200, RelayResponse::message(text)),
            Err(e) => (e.status_code(), RelayResponse::error(e.code())),
        }
    }
}
