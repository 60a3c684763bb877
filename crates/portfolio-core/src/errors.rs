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

use thiserror::Error;

/// LLM-specific error types
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimit,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid model configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Timeout error: {message}")]
    Timeout { message: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },
}

impl LlmError {
    /// Whether the provider rejected the credential.
    ///
    /// Only the provider's own status and error text count. Transport errors
    /// render the request URL, which says nothing about the key.
    pub fn is_credential_failure(&self) -> bool {
        match self {
            LlmError::Authentication { .. } => true,
            LlmError::Status {
                status: 401 | 403, ..
            } => true,
            LlmError::Status { body, .. } => body.contains("API key"),
            _ => false,
        }
    }

    /// Whether a retry has any chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::RateLimit | LlmError::Timeout { .. } => true,
            LlmError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Errors produced while relaying a chat transcript
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("completion credential is not configured")]
    NotConfigured,

    #[error("invalid request body: {reason}")]
    InvalidBody { reason: String },

    #[error("completion service returned no text")]
    EmptyResponse,

    #[error("completion service rejected the credential: {0}")]
    InvalidCredentials(#[source] LlmError),

    #[error("completion service failed: {0}")]
    Provider(#[source] LlmError),
}

/// Errors produced by the contact-form relay
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("All required fields must be filled in")]
    MissingFields,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Message must be at least {min} characters")]
    MessageTooShort { min: u64 },

    #[error("Mail service is not configured")]
    NotConfigured,

    #[error("Failed to send message. Please try again later.")]
    Delivery(#[source] MailError),
}

/// Mail delivery errors
#[derive(Debug, Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail provider returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Mail provider response missing id")]
    MissingId,
}

/// Errors raised by the widget's relay transport
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("malformed relay response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            TransportError::Malformed(e.to_string())
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

/// Result type alias for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

/// Result type alias for relay operations
pub type RelayResult<T> = Result<T, RelayError>;
