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
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::MailError;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// A fully addressed mail ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

/// Mail delivery service. Returns the provider's message id.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, MailError>;
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: Option<String>,
}

/// Delivers mail through the Resend HTTP API
pub struct ResendMailer {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl ResendMailer {
    pub fn new(api_key: String) -> Result<Self, MailError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            api_key,
            endpoint: RESEND_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, MailError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ResendResponse = response.json().await?;
        parsed.id.ok_or(MailError::MissingId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_stub;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            from: "a@example.com".to_string(),
            to: vec!["b@example.com".to_string()],
            subject: "s".to_string(),
            html: String::new(),
            text: String::new(),
            reply_to: None,
        }
    }

    async fn mailer_for(app: Router) -> ResendMailer {
        let base = spawn_stub(app).await;
        ResendMailer::new("re_test".to_string())
            .unwrap()
            .with_endpoint(format!("{}/emails", base))
    }

    #[test]
    fn test_reply_to_omitted_when_absent() {
        let email = OutgoingEmail {
            from: "contact@example.com".to_string(),
            to: vec!["visitor@example.com".to_string()],
            subject: "Thanks".to_string(),
            html: "<p>hi</p>".to_string(),
            text: "hi".to_string(),
            reply_to: None,
        };
        let json = serde_json::to_value(&email).unwrap();
        assert!(json.get("reply_to").is_none());
        assert_eq!(json["to"][0], "visitor@example.com");
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_http_error() {
        let mailer = ResendMailer::new("re_test".to_string())
            .unwrap()
            .with_endpoint("http://127.0.0.1:9/emails".to_string());
        assert!(matches!(mailer.send(&email()).await, Err(MailError::Http(_))));
    }

    #[tokio::test]
    async fn test_accepted_mail_returns_id() {
        let app = Router::new().route(
            "/emails",
            post(|| async { Json(json!({"id": "msg_123"})) }),
        );

        let id = mailer_for(app).await.send(&email()).await.unwrap();
        assert_eq!(id, "msg_123");
    }

    #[tokio::test]
    async fn test_rejected_mail_keeps_status_and_body() {
        let app = Router::new().route(
            "/emails",
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "invalid from address") }),
        );

        match mailer_for(app).await.send(&email()).await {
            Err(MailError::Rejected { status, body }) => {
                assert_eq!(status, 422);
                assert_eq!(body, "invalid from address");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_response_without_id_is_error() {
        let app = Router::new().route("/emails", post(|| async { Json(json!({})) }));

        let result = mailer_for(app).await.send(&email()).await;
        assert!(matches!(result, Err(MailError::MissingId)));
    }
}
