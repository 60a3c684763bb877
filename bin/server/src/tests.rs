use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use mockall::mock;
use portfolio_core::{
    contact::{ContactRelay, ContactSettings, Mailer, OutgoingEmail},
    errors::{LlmError, LlmResult},
    llm_client::{Completion, CompletionParams, LlmClient, Message},
    prompts::PersonaPrompt,
    relay::ChatRelay,
    MailError,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{build_router, service::PortfolioService};

mock! {
    Llm {}

    #[async_trait]
    impl LlmClient for Llm {
        fn has_credentials(&self) -> bool;
        async fn chat_completion(
            &self,
            messages: &[Message],
            params: &CompletionParams,
        ) -> LlmResult<Completion>;
    }
}

mock! {
    Mail {}

    #[async_trait]
    impl Mailer for Mail {
        async fn send(&self, email: &OutgoingEmail) -> Result<String, MailError>;
    }
}

fn app(llm: MockLlm, mailer: Option<MockMail>) -> Router {
    let service = PortfolioService {
        chat: ChatRelay::new(Arc::new(llm), PersonaPrompt::new("persona")),
        contact: ContactRelay::new(
            mailer.map(|m| Arc::new(m) as Arc<dyn Mailer>),
            ContactSettings::default(),
        ),
    };
    build_router(Arc::new(service), None)
}

fn idle_llm() -> MockLlm {
    let mut llm = MockLlm::new();
    llm.expect_has_credentials().return_const(true);
    llm.expect_chat_completion().times(0);
    llm
}

async fn call(app: Router, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_healthcheck() {
    let (status, body) = call(app(idle_llm(), None), Method::GET, "/healthcheck", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_chat_success() {
    let mut llm = MockLlm::new();
    llm.expect_has_credentials().return_const(true);
    llm.expect_chat_completion()
        .times(1)
        .returning(|_, _| Ok(Completion::text("Hello")));

    let (status, body) = call(
        app(llm, None),
        Method::POST,
        "/api/chat",
        json!({"messages": [{"role": "user", "content": "Hi"}]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Hello"}));
}

#[tokio::test]
async fn test_chat_wrong_method() {
    let (status, body) = call(app(idle_llm(), None), Method::GET, "/api/chat", json!({})).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({"error": "Method not allowed"}));
}

#[tokio::test]
async fn test_chat_messages_not_array() {
    let (status, body) = call(
        app(idle_llm(), None),
        Method::POST,
        "/api/chat",
        json!({"messages": "not-an-array"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid request body"}));
}

#[tokio::test]
async fn test_chat_missing_credential() {
    let mut llm = MockLlm::new();
    llm.expect_has_credentials().return_const(false);
    llm.expect_chat_completion().times(0);

    let (status, body) = call(
        app(llm, None),
        Method::POST,
        "/api/chat",
        json!({"messages": [{"role": "user", "content": "Hi"}]}),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"error": "API_KEY_NOT_CONFIGURED"}));
}

#[tokio::test]
async fn test_chat_provider_failure_hides_detail() {
    let mut llm = MockLlm::new();
    llm.expect_has_credentials().return_const(true);
    llm.expect_chat_completion().times(1).returning(|_, _| {
        Err(LlmError::NetworkError {
            message: "socket closed by 10.0.0.7".to_string(),
        })
    });

    let (status, body) = call(
        app(llm, None),
        Method::POST,
        "/api/chat",
        json!({"messages": [{"role": "user", "content": "Hi"}]}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "SERVER_ERROR"}));
}

#[tokio::test]
async fn test_contact_wrong_method() {
    let (status, body) = call(app(idle_llm(), None), Method::PUT, "/api/contact", json!({})).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({"error": "Method not allowed"}));
}

#[tokio::test]
async fn test_contact_validation_error() {
    let mut mailer = MockMail::new();
    mailer.expect_send().times(0);

    let (status, body) = call(
        app(idle_llm(), Some(mailer)),
        Method::POST,
        "/api/contact",
        json!({"name": "Ada", "email": "nope", "subject": "Hi", "message": "Long enough message"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Please enter a valid email address"}));
}

#[tokio::test]
async fn test_contact_without_mailer() {
    let (status, body) = call(
        app(idle_llm(), None),
        Method::POST,
        "/api/contact",
        json!({"name": "Ada", "email": "ada@example.com", "subject": "Hi", "message": "Long enough message"}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Mail service is not configured"}));
}

#[tokio::test]
async fn test_contact_success() {
    let mut mailer = MockMail::new();
    mailer
        .expect_send()
        .times(2)
        .returning(|_| Ok("mail-42".to_string()));

    let (status, body) = call(
        app(idle_llm(), Some(mailer)),
        Method::POST,
        "/api/contact",
        json!({"name": "Ada", "email": "ada@example.com", "subject": "Hi", "message": "Long enough message"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "mail-42");
    assert!(body["message"].is_string());
}
