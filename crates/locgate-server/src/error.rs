//! Error types for the server crate.

use crate::request::GateResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use locgate_store::StoreError;
use thiserror::Error;

/// Errors that abort a gate request.
///
/// Malformed requests are not errors: they are answered with an `error`
/// status document. These variants cover failures the caller cannot fix.
#[derive(Debug, Error)]
pub enum GateError {
    /// The access log could not be persisted.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Failed to start the HTTP server.
    #[error("failed to start server: {0}")]
    StartupFailed(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Gate request failed");

        let body = GateResponse::Error {
            message: "Internal error".to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
