//! Twitter OAuth 1.0a token exchange
//!
//! The two network round trips of the three-legged handshake, behind a
//! dyn-compatible [`TokenExchange`] trait so the login handler can be
//! tested against a mock. This crate is a standalone library with no
//! dependency on the gateway binary.
//!
//! Handshake flow:
//! 1. Gateway calls [`TokenExchange::request_token`] with its callback URL
//! 2. Browser is sent to the returned authorize URL for user consent
//! 3. Provider redirects back with `oauth_token` + `oauth_verifier`
//! 4. Gateway calls [`TokenExchange::access_token`] with the verifier

pub mod client;
pub mod constants;
pub mod error;
pub mod exchange;
mod sign;

pub use client::OAuth1Client;
pub use constants::*;
pub use error::{Error, Result};
pub use exchange::{AccessToken, RequestToken, TokenExchange};
