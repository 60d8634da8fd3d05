//! JSON error responses for the HTTP API.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use magic_core::MagicError;
use serde_json::json;

/// API error with status code, stable code and client-safe message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, code: "bad_request", message: msg.into() }
    }
    pub fn internal(code: &'static str, msg: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, code, message: msg.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.code,
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Missing preconditions are ordinary answers; everything else is a 500 whose
/// detail stays in the server log.
impl From<MagicError> for ApiError {
    fn from(err: MagicError) -> Self {
        let code = err.code();
        match err {
            MagicError::MissingPrecondition { code, message } => {
                ApiError { status: StatusCode::OK, code, message }
            }
            MagicError::MalformedModelOutput(_) => {
                tracing::error!(error = %err, code, "model reply could not be parsed");
                ApiError::internal(code, "The model returned an unreadable answer")
            }
            MagicError::UpstreamTimeout { .. } => {
                tracing::error!(error = %err, code, "upstream timed out");
                ApiError::internal(code, "The upstream provider did not answer in time")
            }
            MagicError::UpstreamAuthFailure(_) | MagicError::UpstreamProviderError(_) => {
                tracing::error!(error = %err, code, "upstream call failed");
                ApiError::internal(code, "The upstream provider is unavailable")
            }
            other => {
                tracing::error!(error = %other, code, "request failed");
                ApiError::internal(code, "Internal server error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}
