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
use std::future::Future;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::warn;

use super::models::{Completion, CompletionParams, Message};
use crate::errors::{LlmError, LlmResult};

const ZERO_WIDTH_CHARS: [char; 5] = ['\u{200b}', '\u{200c}', '\u{200d}', '\u{feff}', '\u{2060}'];

/// Trait for completion providers
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Whether a non-blank credential is available.
    ///
    /// Callers check this before `chat_completion` so a missing key is never
    /// reported as a provider-side failure.
    fn has_credentials(&self) -> bool;

    /// Run one chat completion over the given role-tagged messages
    async fn chat_completion(
        &self,
        messages: &[Message],
        params: &CompletionParams,
    ) -> LlmResult<Completion>;
}

/// Clean input string of invalid unicode and control characters
pub fn clean_input(input: &str) -> String {
    input
        .chars()
        .filter(|c| !ZERO_WIDTH_CHARS.contains(c))
        .filter(|&c| (c as u32) >= 32 || c == '\n' || c == '\r' || c == '\t')
        .collect()
}

/// Execute with retry logic, retrying only transient failures
pub async fn execute_with_retry<F, Fut, T>(max_retries: usize, operation: F) -> LlmResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = LlmResult<T>>,
{
    let retry_strategy = ExponentialBackoff::from_millis(2)
        .factor(250)
        .max_delay(Duration::from_secs(10))
        .take(max_retries);

    RetryIf::spawn(retry_strategy, operation, |error: &LlmError| {
        error.is_transient()
    })
    .await
    .map_err(|e| {
        warn!("All retry attempts exhausted: {}", e);
        e
    })
}
