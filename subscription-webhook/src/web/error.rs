//! Terminal outcomes of the webhook handler.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::order::PayloadError;
use crate::store::StoreError;

/// Every early exit of the webhook maps to one status and one plain-text body.
///
/// The `Display` text is exactly what the caller sees; sources are for logs only.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Only POST requests allowed")]
    MethodNotAllowed,

    #[error("Invalid signature")]
    SignatureMismatch,

    #[error("Invalid payload")]
    BodyRead(#[source] axum::Error),

    #[error("Invalid payload")]
    InvalidPayload(#[source] PayloadError),

    #[error("User not found")]
    UserNotFound,

    #[error("DB error")]
    Persistence(#[source] StoreError),
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            WebhookError::SignatureMismatch => StatusCode::UNAUTHORIZED,
            WebhookError::BodyRead(_) | WebhookError::InvalidPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::UserNotFound => StatusCode::NOT_FOUND,
            WebhookError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
