// HTTP routes
pub mod health;
pub mod jobs;
pub mod submit;

pub use health::*;
pub use jobs::*;
pub use submit::*;

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// `{ "error": "..." }` body used by every failing route
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn error_response(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}
