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

//! JSON shapes exchanged between the chat widget and the relay endpoint.

use serde::{Deserialize, Serialize};

use crate::llm_client::{Message, Role};

/// Roles a client may put on the wire. `system` is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientRole {
    User,
    Assistant,
}

impl From<ClientRole> for Role {
    fn from(role: ClientRole) -> Self {
        match role {
            ClientRole::User => Role::User,
            ClientRole::Assistant => Role::Assistant,
        }
    }
}

/// One transcript entry as sent by the widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: ClientRole,
    pub content: String,
}

impl WireMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ClientRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ClientRole::Assistant,
            content: content.into(),
        }
    }

    pub fn into_message(self) -> Message {
        Message::new(self.role.into(), self.content)
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRequest {
    pub messages: Vec<WireMessage>,
}

/// Body of every relay reply. Exactly one of the two shapes is ever sent.
///
/// `Error` is listed first so that a body carrying an `error` field is never
/// read as a success, even if it also has a stray `message` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayResponse {
    Error { error: String },
    Message { message: String },
}

impl RelayResponse {
    pub fn message(message: impl Into<String>) -> Self {
        RelayResponse::Message {
            message: message.into(),
        }
    }

    pub fn error(code: ErrorCode) -> Self {
        RelayResponse::Error {
            error: code.as_str().to_string(),
        }
    }
}

/// Closed set of error strings the relay emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ApiKeyNotConfigured,
    ApiKeyInvalid,
    ServerError,
    InvalidRequestBody,
    NoResponse,
    MethodNotAllowed,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ApiKeyNotConfigured => "API_KEY_NOT_CONFIGURED",
            ErrorCode::ApiKeyInvalid => "API_KEY_INVALID",
            ErrorCode::ServerError => "SERVER_ERROR",
            ErrorCode::InvalidRequestBody => "Invalid request body",
            ErrorCode::NoResponse => "No response from AI",
            ErrorCode::MethodNotAllowed => "Method not allowed",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        [
            ErrorCode::ApiKeyNotConfigured,
            ErrorCode::ApiKeyInvalid,
            ErrorCode::ServerError,
            ErrorCode::InvalidRequestBody,
            ErrorCode::NoResponse,
            ErrorCode::MethodNotAllowed,
        ]
        .into_iter()
        .find(|candidate| candidate.as_str() == code)
    }

    /// Codes that only an operator can fix; retrying will not help.
    pub fn is_configuration_problem(self) -> bool {
        matches!(self, ErrorCode::ApiKeyNotConfigured | ErrorCode::ApiKeyInvalid)
    }
}
