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

//! Pure widget state and its transitions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::fallback::{error_message, GREETING, QUICK_REPLIES};
use super::transport::RelayReply;
use crate::errors::TransportError;
use crate::relay::{RelayRequest, RelayResponse, WireMessage};

/// Quick replies are offered while the transcript has at most this many entries
pub const QUICK_REPLY_MAX_TRANSCRIPT: usize = 3;

/// Who authored a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// A single visible message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub id: Uuid,
    pub content: String,
    pub speaker: Speaker,
    /// Display only; insertion order is authoritative
    pub created_at: DateTime<Utc>,
}

impl TranscriptEntry {
    fn new(speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            speaker,
            created_at: Utc::now(),
        }
    }

    fn to_wire(&self) -> WireMessage {
        match self.speaker {
            Speaker::User => WireMessage::user(self.content.clone()),
            Speaker::Assistant => WireMessage::assistant(self.content.clone()),
        }
    }
}

/// The widget's complete state record
#[derive(Debug, Clone, Serialize)]
pub struct WidgetState {
    pub open: bool,
    pub transcript: Vec<TranscriptEntry>,
    pub pending_input: String,
    pub awaiting_response: bool,
    #[serde(skip)]
    greeting_id: Uuid,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetState {
    pub fn new() -> Self {
        let greeting = TranscriptEntry::new(Speaker::Assistant, GREETING);
        Self {
            open: false,
            greeting_id: greeting.id,
            transcript: vec![greeting],
            pending_input: String::new(),
            awaiting_response: false,
        }
    }

    pub fn toggle_open(&mut self) {
        self.open = !self.open;
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.pending_input = text.into();
    }

    /// Fill the input from a suggestion; never submits
    pub fn select_quick_reply(&mut self, text: impl Into<String>) {
        self.set_input(text);
    }

    /// Suggestions currently on offer
    pub fn quick_replies(&self) -> &'static [&'static str] {
        if self.transcript.len() <= QUICK_REPLY_MAX_TRANSCRIPT && !self.awaiting_response {
            &QUICK_REPLIES
        } else {
            &[]
        }
    }

    /// Start a turn. Returns `None`, changing nothing, when the input is
    /// blank or a call is already outstanding.
    pub fn begin_submit(&mut self) -> Option<RelayRequest> {
        let text = self.pending_input.trim();
        if text.is_empty() || self.awaiting_response {
            return None;
        }

        // The greeting only goes out as context on the very first turn.
        let send_greeting = self.transcript.len() == 1;

        let entry = TranscriptEntry::new(Speaker::User, text);
        self.transcript.push(entry);
        self.pending_input.clear();
        self.awaiting_response = true;

        let messages = self
            .transcript
            .iter()
            .filter(|entry| send_greeting || entry.id != self.greeting_id)
            .map(TranscriptEntry::to_wire)
            .collect();

        Some(RelayRequest { messages })
    }

    /// Finish a turn: append exactly one assistant entry and release the guard
    pub fn complete_submit(&mut self, outcome: Result<RelayReply, TransportError>) {
        let content = reply_text(outcome);
        self.transcript.push(TranscriptEntry::new(Speaker::Assistant, content));
        self.awaiting_response = false;
    }

    /// Clear the in-flight flag without appending anything
    pub(crate) fn abandon_submit(&mut self) {
        self.awaiting_response = false;
    }

    pub fn last_entry(&self) -> Option<&TranscriptEntry> {
        self.transcript.last()
    }
}

fn reply_text(outcome: Result<RelayReply, TransportError>) -> String {
    let reply = match outcome {
        Ok(reply) => reply,
        Err(_) => return error_message(None).to_string(),
    };

    let succeeded = reply.is_success();
    match reply.body {
        RelayResponse::Message { message } if succeeded && !message.trim().is_empty() => message,
        RelayResponse::Error { error } => error_message(Some(&error)).to_string(),
        RelayResponse::Message { .. } => error_message(None).to_string(),
    }
}
