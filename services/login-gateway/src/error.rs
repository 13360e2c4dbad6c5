//! Service-specific error types
//!
//! Config/Io/Toml variants occur at startup and end the process via
//! `main`'s anyhow context. `Exchange` is the one per-request error:
//! a token endpoint failure surfaced by the login handler. Provider
//! error text can carry sensitive debugging detail, so the HTTP
//! response is generic and the detail goes to the log only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("token exchange failed: {0}")]
    Exchange(#[from] twitter_oauth::Error),
}

/// Result alias using service Error
pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            Error::Exchange(cause) => {
                error!(error = %cause, "provider token exchange failed");
                crate::metrics::record_exchange_failure();
                (
                    StatusCode::BAD_GATEWAY,
                    "exchange_error",
                    "authentication provider request failed",
                )
            }
            other => {
                error!(error = %other, "unexpected error handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error",
                )
            }
        };
        let body = serde_json::json!({
            "error": {
                "type": kind,
                "message": message,
            }
        });
        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
