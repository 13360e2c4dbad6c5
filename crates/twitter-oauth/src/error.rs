//! Error types for token exchange operations

/// Errors from the OAuth 1.0a token endpoints.
///
/// Provider response bodies can carry sensitive debugging detail; they
/// belong in these errors (which are logged server-side), never in
/// anything rendered to a browser.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token exchange failed: {0}")]
    Exchange(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Result alias for token exchange operations.
pub type Result<T> = std::result::Result<T, Error>;
