//! Default Twitter OAuth 1.0a endpoints
//!
//! These identify the provider, not the application. Consumer key and
//! secret are configuration; endpoint overrides exist mainly so tests
//! can point the client at a local mock provider.

/// Endpoint issuing the short-lived request token that begins a handshake
pub const REQUEST_TOKEN_URL: &str = "https://api.twitter.com/oauth/request_token";

/// Endpoint exchanging a verifier for the long-lived access token
pub const ACCESS_TOKEN_URL: &str = "https://api.twitter.com/oauth/access_token";

/// User consent page the browser is redirected to mid-handshake
pub const AUTHORIZE_URL: &str = "https://api.twitter.com/oauth/authenticate";
