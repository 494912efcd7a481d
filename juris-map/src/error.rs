//! Error types for juris-map
//!
//! Every failure leaves the service as a JSON body
//! `{"error": {"code", "message", "redirect"?}}`. The optional redirect
//! names the screen a client should send the user to.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use juris_common::Error as CommonError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Redirect target when the user has to pick laws first
pub const LAW_SELECTION_PATH: &str = "/laws/select";

/// Redirect target for stale or locked phase links
pub const MAP_PATH: &str = "/map";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// juris-common error
    #[error(transparent)]
    Common(#[from] CommonError),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, Option<&'static str>) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", None),
            ApiError::Common(err) => match err {
                CommonError::NoLawsAvailable => {
                    (StatusCode::CONFLICT, "NO_LAWS_AVAILABLE", Some(LAW_SELECTION_PATH))
                }
                CommonError::EmptySelection => {
                    (StatusCode::CONFLICT, "EMPTY_SELECTION", Some(LAW_SELECTION_PATH))
                }
                CommonError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", Some(MAP_PATH)),
                CommonError::BlockedAccess { .. } => {
                    (StatusCode::FORBIDDEN, "PHASE_BLOCKED", Some(MAP_PATH))
                }
                CommonError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", None),
                CommonError::Database(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR", None)
                }
                CommonError::Io(_) | CommonError::Config(_) | CommonError::Internal(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", None)
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, redirect) = self.parts();

        // Server-side detail stays in the log
        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let Some(redirect) = redirect {
            error["redirect"] = json!(redirect);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
