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

//! Server side of the chat flow: validate a transcript, inject the persona,
//! forward to the completion service and normalise the outcome.

pub mod protocol;
pub mod service;

pub use protocol::{ClientRole, ErrorCode, RelayRequest, RelayResponse, WireMessage};
pub use service::{ChatRelay, CHAT_MAX_TOKENS, CHAT_MODEL, CHAT_TEMPERATURE};
