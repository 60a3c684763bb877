use std::sync::Arc;

use axum::{body::Bytes, extract::Extension, http::StatusCode, response::Json};
use portfolio_core::relay::RelayResponse;

use crate::service::PortfolioService;

/// Relay a chat transcript to the completion service.
///
/// The body is taken raw so the credential check runs before any parsing.
pub async fn relay_chat(
    Extension(service): Extension<Arc<PortfolioService>>,
    body: Bytes,
) -> (StatusCode, Json<RelayResponse>) {
    let (status, response) = service.chat.respond(&body).await;
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response))
}
