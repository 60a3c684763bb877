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

//! Canned assistant texts shown instead of raw failures.

use crate::relay::ErrorCode;

/// Opening message of every new transcript
pub const GREETING: &str = "Hello! I'm the virtual assistant for this portfolio. \
Feel free to ask about skills, experience or projects.";

/// Shown when the relay cannot work until an operator fixes its credential
pub const UNAVAILABLE_MESSAGE: &str = "Sorry, the chat assistant is currently unavailable. \
Please get in touch through the CONTACT form instead.";

/// Shown for every other failure
pub const RETRY_MESSAGE: &str = "Sorry, something went wrong. \
Please wait a moment and try again.";

/// Cold-start suggestions offered before the conversation gets going
pub const QUICK_REPLIES: [&str; 4] = [
    "What are your strengths?",
    "What projects have you worked on?",
    "Which technologies can you work with?",
    "Tell me about your AI skills",
];

/// Map a relay error string (if any) to the text appended to the transcript
pub fn error_message(code: Option<&str>) -> &'static str {
    match code.and_then(ErrorCode::parse) {
        Some(code) if code.is_configuration_problem() => UNAVAILABLE_MESSAGE,
        _ => RETRY_MESSAGE,
    }
}
