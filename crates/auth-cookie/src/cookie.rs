//! Authentication cookie payload shapes
//!
//! The cookie is a sum over the three phases of the login handshake.
//! The phase is never stored explicitly — it is inferred from which
//! fields are present, and any field combination outside the two
//! permitted shapes is discarded rather than partially trusted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-held state of the OAuth handshake.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthCookie {
    /// No handshake in progress (also the decode result for any
    /// malformed or tampered cookie).
    Empty,
    /// Handshake started: the request token pair is the continuation
    /// between the two legs of the protocol.
    Pending {
        request_token: String,
        request_token_secret: String,
    },
    /// Handshake complete: long-lived credentials for API calls on
    /// behalf of the user.
    Authenticated {
        user_id: String,
        screen_name: Option<String>,
        access_token: String,
        access_token_secret: String,
    },
}

impl AuthCookie {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Serialize to the wire payload. `Empty` has no payload.
    pub(crate) fn to_payload(&self) -> Option<Payload> {
        match self {
            Self::Empty => None,
            Self::Pending {
                request_token,
                request_token_secret,
            } => Some(Payload {
                oauth_token: Some(request_token.clone()),
                oauth_token_secret: Some(request_token_secret.clone()),
                ..Payload::default()
            }),
            Self::Authenticated {
                user_id,
                screen_name,
                access_token,
                access_token_secret,
            } => Some(Payload {
                user_id: Some(user_id.clone()),
                screen_name: screen_name.clone(),
                access_token_key: Some(access_token.clone()),
                access_token_secret: Some(access_token_secret.clone()),
                ..Payload::default()
            }),
        }
    }
}

// Token secrets are credentials; keep them out of Debug output and
// therefore out of structured logs.
impl fmt::Debug for AuthCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "AuthCookie::Empty"),
            Self::Pending { request_token, .. } => f
                .debug_struct("AuthCookie::Pending")
                .field("request_token", request_token)
                .field("request_token_secret", &"[REDACTED]")
                .finish(),
            Self::Authenticated {
                user_id,
                screen_name,
                ..
            } => f
                .debug_struct("AuthCookie::Authenticated")
                .field("user_id", user_id)
                .field("screen_name", screen_name)
                .field("access_token", &"[REDACTED]")
                .field("access_token_secret", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Raw wire payload: a bag of optional fields validated into an
/// [`AuthCookie`] after signature verification. Field names match the
/// historical cookie format.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_token_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_secret: Option<String>,
}

impl Payload {
    /// Structural validation into one of the permitted shapes.
    ///
    /// Exactly the pending fields → `Pending`. Exactly the
    /// authenticated fields (screen name optional) → `Authenticated`.
    /// Anything else — including mixes of the two shapes — is
    /// malformed and collapses to `Empty`.
    pub(crate) fn into_cookie(self) -> AuthCookie {
        match self {
            Payload {
                oauth_token: Some(request_token),
                oauth_token_secret: Some(request_token_secret),
                user_id: None,
                screen_name: None,
                access_token_key: None,
                access_token_secret: None,
            } => AuthCookie::Pending {
                request_token,
                request_token_secret,
            },
            Payload {
                oauth_token: None,
                oauth_token_secret: None,
                user_id: Some(user_id),
                screen_name,
                access_token_key: Some(access_token),
                access_token_secret: Some(access_token_secret),
            } => AuthCookie::Authenticated {
                user_id,
                screen_name,
                access_token,
                access_token_secret,
            },
            _ => AuthCookie::Empty,
        }
    }
}
