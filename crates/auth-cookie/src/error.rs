//! Error types for cookie codec construction
//!
//! Only building a [`crate::Keyring`] can fail. Encode never fails and
//! decode deliberately returns `AuthCookie::Empty` instead of an error
//! (a bad cookie must look exactly like an absent one).

/// Errors from keyring construction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("keyring requires at least one signing key")]
    EmptyKeyring,

    #[error("signing key {index} is empty")]
    EmptyKey { index: usize },
}

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
