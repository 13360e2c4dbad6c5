//! Token exchange abstraction
//!
//! The login handler depends on these two operations and nothing else
//! about the provider. Uses `Pin<Box<dyn Future>>` return types for
//! dyn-compatibility (`Arc<dyn TokenExchange>` in the gateway state).

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::Result;

/// Result of the request-token leg: the short-lived token pair plus the
/// consent URL the browser is redirected to.
#[derive(Clone)]
pub struct RequestToken {
    pub token: String,
    pub secret: String,
    pub authorize_url: String,
}

/// Result of the verifier-exchange leg: long-lived credentials plus the
/// profile parameters the provider returns alongside them.
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub secret: String,
    pub user_id: String,
    pub screen_name: Option<String>,
}

// Token secrets stay out of Debug output and logs.
impl fmt::Debug for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestToken")
            .field("token", &self.token)
            .field("secret", &"[REDACTED]")
            .field("authorize_url", &self.authorize_url)
            .finish()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("secret", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("screen_name", &self.screen_name)
            .finish()
    }
}

/// The two network round trips of the handshake.
///
/// Both operations are network-bound and may fail; the caller surfaces
/// a failure once and never retries — the browser re-initiates by
/// navigating to the login path again.
pub trait TokenExchange: Send + Sync {
    /// Obtain a request token, registering `callback_url` as where the
    /// provider sends the browser after consent.
    fn request_token<'a>(
        &'a self,
        callback_url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<RequestToken>> + Send + 'a>>;

    /// Exchange the verifier from the provider callback for an access
    /// token, proving this gateway initiated the handshake via the
    /// request token secret.
    fn access_token<'a>(
        &'a self,
        token: &'a str,
        token_secret: &'a str,
        verifier: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<AccessToken>> + Send + 'a>>;
}
