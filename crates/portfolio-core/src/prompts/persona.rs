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

//! The fixed persona instruction injected in front of every relayed transcript.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::llm_client::Message;

const DEFAULT_PERSONA: &str = include_str!("../../assets/persona.md");

/// Opaque system instruction.
///
/// Cloning is cheap; the text is shared.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonaPrompt {
    text: Arc<str>,
}

impl PersonaPrompt {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self { text: text.into() }
    }

    /// Load a persona from a UTF-8 text file
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(text.trim().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The persona as the leading system message of a transcript
    pub fn to_message(&self) -> Message {
        Message::system(self.as_str())
    }
}

impl Default for PersonaPrompt {
    fn default() -> Self {
        Self::new(DEFAULT_PERSONA.trim())
    }
}

// The prompt is long; keep it out of debug logs.
impl fmt::Debug for PersonaPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersonaPrompt")
            .field("len", &self.text.len())
            .finish()
    }
}
