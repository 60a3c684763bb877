use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use portfolio_core::{contact::ContactForm, ContactError};
use tracing::warn;

use crate::{dto::ErrorResponse, service::PortfolioService};

/// Validate a contact submission and send the mails
pub async fn submit_contact(
    Extension(service): Extension<Arc<PortfolioService>>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Response {
    let form = match payload {
        Ok(Json(form)) => form,
        Err(rejection) => {
            warn!("Rejected contact payload: {}", rejection);
            return error_response(ContactError::MissingFields);
        }
    };

    match service.contact.submit(form).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(error: ContactError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::new(error.to_string()))).into_response()
}
