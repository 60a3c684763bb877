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

//! Client side of the chat flow.
//!
//! [`WidgetState`] is a plain record with pure transitions. [`ChatWidget`]
//! wraps it for event-driven use: the state lock is never held across the
//! relay call, so the widget can still be toggled while a reply is pending,
//! and the `awaiting_response` flag turns any second submission into a no-op.

pub mod fallback;
pub mod state;
pub mod transport;

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::errors::TransportError;

pub use fallback::{error_message, GREETING, QUICK_REPLIES, RETRY_MESSAGE, UNAVAILABLE_MESSAGE};
pub use state::{Speaker, TranscriptEntry, WidgetState, QUICK_REPLY_MAX_TRANSCRIPT};
pub use transport::{HttpRelayTransport, RelayReply, RelayTransport};

/// A chat widget instance bound to a relay transport
pub struct ChatWidget<T> {
    transport: T,
    state: Mutex<WidgetState>,
}

/// Clears the in-flight flag however the submit future ends, including
/// when it is dropped before the relay answers. Once the turn is completed
/// the guard is disarmed and never touches the state again.
struct PendingGuard<'a> {
    state: &'a Mutex<WidgetState>,
    armed: bool,
}

impl<'a> PendingGuard<'a> {
    fn new(state: &'a Mutex<WidgetState>) -> Self {
        Self { state, armed: true }
    }

    /// Append the reply and disarm under the same lock
    fn complete(&mut self, outcome: Result<RelayReply, TransportError>) {
        let mut state = lock(self.state);
        state.complete_submit(outcome);
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            lock(self.state).abandon_submit();
        }
    }
}

fn lock(state: &Mutex<WidgetState>) -> MutexGuard<'_, WidgetState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: RelayTransport> ChatWidget<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: Mutex::new(WidgetState::new()),
        }
    }

    /// A copy of the current state, for rendering
    pub fn snapshot(&self) -> WidgetState {
        lock(&self.state).clone()
    }

    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        lock(&self.state).transcript.clone()
    }

    pub fn is_open(&self) -> bool {
        lock(&self.state).open
    }

    pub fn is_awaiting_response(&self) -> bool {
        lock(&self.state).awaiting_response
    }

    pub fn toggle_open(&self) {
        lock(&self.state).toggle_open();
    }

    pub fn set_input(&self, text: impl Into<String>) {
        lock(&self.state).set_input(text);
    }

    pub fn select_quick_reply(&self, text: impl Into<String>) {
        lock(&self.state).select_quick_reply(text);
    }

    pub fn quick_replies(&self) -> &'static [&'static str] {
        lock(&self.state).quick_replies()
    }

    /// Submit the pending input.
    ///
    /// Returns `false` without touching anything when the input is blank or
    /// another call is still outstanding.
    pub async fn submit(&self) -> bool {
        let request = match lock(&self.state).begin_submit() {
            Some(request) => request,
            None => {
                debug!("Submission ignored");
                return false;
            }
        };

        let mut pending = PendingGuard::new(&self.state);
        let outcome = self.transport.send(&request).await;
        if let Err(e) = &outcome {
            debug!("Relay call failed: {}", e);
        }
        pending.complete(outcome);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::{RelayRequest, RelayResponse, WireMessage};
    use async_trait::async_trait;
    use mockall::mock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    mock! {
        Transport {}

        #[async_trait]
        impl RelayTransport for Transport {
            async fn send(&self, request: &RelayRequest) -> Result<RelayReply, TransportError>;
        }
    }

    fn replying(status: u16, body: RelayResponse) -> MockTransport {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(move |_| {
                Ok(RelayReply {
                    status,
                    body: body.clone(),
                })
            });
        transport
    }

    /// Blocks inside `send` until released
    struct GatedTransport {
        called: Arc<Notify>,
        release: Arc<Notify>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RelayTransport for GatedTransport {
        async fn send(&self, _request: &RelayRequest) -> Result<RelayReply, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.called.notify_one();
            self.release.notified().await;
            Ok(RelayReply {
                status: 200,
                body: RelayResponse::message("late reply"),
            })
        }
    }

    #[test]
    fn test_completed_guard_leaves_next_turn_pending() {
        let state = Mutex::new(WidgetState::new());
        state.lock().unwrap().set_input("first");
        assert!(state.lock().unwrap().begin_submit().is_some());

        let mut pending = PendingGuard::new(&state);
        pending.complete(Ok(RelayReply {
            status: 200,
            body: RelayResponse::message("reply"),
        }));

        // Another turn starts before the first guard goes away.
        state.lock().unwrap().set_input("second");
        assert!(state.lock().unwrap().begin_submit().is_some());
        drop(pending);

        let state = state.lock().unwrap();
        assert!(state.awaiting_response);
        assert_eq!(state.transcript.len(), 4);
    }

    #[test]
    fn test_armed_guard_clears_flag_on_drop() {
        let state = Mutex::new(WidgetState::new());
        state.lock().unwrap().set_input("first");
        assert!(state.lock().unwrap().begin_submit().is_some());

        drop(PendingGuard::new(&state));

        let state = state.lock().unwrap();
        assert!(!state.awaiting_response);
        assert_eq!(state.transcript.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_submit_issues_no_call() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        let widget = ChatWidget::new(transport);

        widget.set_input("    ");
        assert!(!widget.submit().await);
        assert_eq!(widget.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_scenario_message_reply() {
        let widget = ChatWidget::new(replying(200, RelayResponse::message("Hello")));
        widget.set_input("Hi there");
        assert!(widget.submit().await);

        let transcript = widget.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].speaker, Speaker::User);
        assert_eq!(transcript[1].content, "Hi there");
        assert_eq!(transcript[2].speaker, Speaker::Assistant);
        assert_eq!(transcript[2].content, "Hello");
        assert!(!widget.is_awaiting_response());
    }

    #[tokio::test]
    async fn test_scenario_not_configured() {
        let widget = ChatWidget::new(replying(
            503,
            RelayResponse::Error {
                error: "API_KEY_NOT_CONFIGURED".to_string(),
            },
        ));
        widget.set_input("Hi");
        widget.submit().await;

        let transcript = widget.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[2].content, UNAVAILABLE_MESSAGE);
        assert!(!widget.is_awaiting_response());
    }

    #[tokio::test]
    async fn test_scenario_server_error() {
        let widget = ChatWidget::new(replying(
            500,
            RelayResponse::Error {
                error: "SERVER_ERROR".to_string(),
            },
        ));
        widget.set_input("Hi");
        widget.submit().await;

        assert_eq!(widget.transcript()[2].content, RETRY_MESSAGE);
        assert!(!widget.is_awaiting_response());
    }

    #[tokio::test]
    async fn test_scenario_transport_failure() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Err(TransportError::Network("connection reset".to_string())));
        let widget = ChatWidget::new(transport);

        widget.set_input("Hi");
        assert!(widget.submit().await);

        let transcript = widget.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[2].content, RETRY_MESSAGE);
        assert!(!widget.is_awaiting_response());
    }

    #[tokio::test]
    async fn test_first_request_carries_greeting_then_user() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|request| {
                request.messages
                    == vec![WireMessage::assistant(GREETING), WireMessage::user("question")]
            })
            .times(1)
            .returning(|_| {
                Ok(RelayReply {
                    status: 200,
                    body: RelayResponse::message("answer"),
                })
            });
        let widget = ChatWidget::new(transport);

        widget.set_input("question");
        widget.submit().await;
    }

    #[tokio::test]
    async fn test_second_submit_while_pending_is_dropped() {
        let called = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let widget = ChatWidget::new(GatedTransport {
            called: called.clone(),
            release: release.clone(),
            calls: calls.clone(),
        });

        widget.set_input("first");
        let (first, ()) = tokio::join!(widget.submit(), async {
            called.notified().await;
            assert!(widget.is_awaiting_response());

            widget.set_input("second");
            assert!(!widget.submit().await);
            assert_eq!(widget.transcript().len(), 2);

            widget.toggle_open();
            assert!(widget.is_open());

            release.notify_one();
        });

        assert!(first);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!widget.is_awaiting_response());

        let transcript = widget.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[2].content, "late reply");
        assert_eq!(widget.snapshot().pending_input, "second");
    }

    #[tokio::test]
    async fn test_dropped_submit_releases_guard() {
        let called = Arc::new(Notify::new());
        let widget = ChatWidget::new(GatedTransport {
            called: called.clone(),
            release: Arc::new(Notify::new()),
            calls: Arc::new(AtomicUsize::new(0)),
        });

        widget.set_input("never answered");
        tokio::select! {
            _ = widget.submit() => panic!("gated transport never resolves"),
            _ = called.notified() => {}
        }

        assert!(!widget.is_awaiting_response());
        assert_eq!(widget.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_independent_sessions_agree() {
        let first = ChatWidget::new(replying(200, RelayResponse::message("deterministic")));
        let second = ChatWidget::new(replying(200, RelayResponse::message("deterministic")));

        for widget in [&first, &second] {
            widget.set_input("same question");
            widget.submit().await;
        }

        let a: Vec<String> = first.transcript().into_iter().map(|e| e.content).collect();
        let b: Vec<String> = second.transcript().into_iter().map(|e| e.content).collect();
        assert_eq!(a, b);
    }
}
