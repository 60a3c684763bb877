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

//! # Portfolio Core
//!
//! Backend pieces of a personal portfolio site.
//!
//! * [`relay`] forwards a chat transcript to a completion service behind a
//!   fixed persona and folds every failure into a small set of error codes.
//! * [`widget`] is the client-side chat state machine that talks to the relay.
//! * [`contact`] validates contact-form submissions and sends the mails.

pub mod contact;
pub mod errors;
pub mod llm_client;
pub mod prompts;
pub mod relay;
pub mod widget;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use errors::{ContactError, LlmError, MailError, RelayError, TransportError};

// Re-export traits
pub use contact::Mailer;
pub use llm_client::LlmClient;
pub use widget::RelayTransport;

// Re-export concrete types
pub use contact::{ContactForm, ContactRelay, ContactSettings, ResendMailer};
pub use llm_client::{LlmConfig, Message, OpenAiClient};
pub use prompts::PersonaPrompt;
pub use relay::{ChatRelay, ErrorCode, RelayRequest, RelayResponse};
pub use widget::{ChatWidget, HttpRelayTransport, WidgetState};
