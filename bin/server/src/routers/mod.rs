use axum::{http::StatusCode, response::Json, routing::post, Router};
use portfolio_core::relay::ErrorCode;

use crate::dto::ErrorResponse;

pub mod chat;
pub mod contact;

/// Create the main API router
pub fn create_router() -> Router {
    Router::new()
        .route("/chat", post(chat::relay_chat).fallback(method_not_allowed))
        .route(
            "/contact",
            post(contact::submit_contact).fallback(method_not_allowed),
        )
}

/// Any method other than POST on an API route; the body is never read
async fn method_not_allowed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new(ErrorCode::MethodNotAllowed.as_str())),
    )
}
