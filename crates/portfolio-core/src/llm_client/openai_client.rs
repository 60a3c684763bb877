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

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::{clean_input, execute_with_retry, LlmClient};
use super::config::{LlmConfig, DEFAULT_BASE_URL};
use super::models::{Completion, CompletionParams, Message, Role, TokenUsage};
use crate::errors::{LlmError, LlmResult};

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: Role,
    content: String,
}

#[derive(Debug, Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    #[serde(default)]
    error: Option<OpenAiError>,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    message: String,
}

/// Chat-completions client for OpenAI-compatible APIs
pub struct OpenAiClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
    max_retries: usize,
}

impl OpenAiClient {
    /// Build a client. A missing key is not an error here; see
    /// [`LlmClient::has_credentials`].
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        let api_key = config.usable_api_key().map(str::to_string);

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::InvalidConfig {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            base_url,
            api_key,
            max_retries: config.max_retries,
        })
    }

    async fn chat_completion_once(
        &self,
        api_key: &str,
        messages: &[Message],
        params: &CompletionParams,
    ) -> LlmResult<Completion> {
        let request = OpenAiChatRequest {
            model: &params.model,
            messages: messages
                .iter()
                .map(|m| OpenAiMessage {
                    role: m.role,
                    content: clean_input(&m.content),
                })
                .collect(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        message: e.to_string(),
                    }
                } else {
                    LlmError::Http(e)
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimit);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Authentication {
                message: format!("HTTP {} - {}", status.as_u16(), error_text),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: OpenAiChatResponse =
            response.json().await.map_err(|e| LlmError::NetworkError {
                message: format!("Failed to parse JSON response: {}", e),
            })?;

        if let Some(error) = chat_response.error {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: error.message,
            });
        }

        let usage = chat_response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);

        Ok(Completion { content, usage })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn chat_completion(
        &self,
        messages: &[Message],
        params: &CompletionParams,
    ) -> LlmResult<Completion> {
        let api_key = self.api_key.as_deref().ok_or_else(|| LlmError::Authentication {
            message: "OpenAI API key is required".to_string(),
        })?;

        debug!(
            model = %params.model,
            messages = messages.len(),
            "Sending chat completion request"
        );

        execute_with_retry(self.max_retries, || {
            self.chat_completion_once(api_key, messages, params)
        })
        .await
    }
}
