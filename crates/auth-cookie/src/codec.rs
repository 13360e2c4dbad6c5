//! Cookie value encoding and verification
//!
//! Wire format: `base64url(JSON payload) . base64url(tag)` with no
//! padding. The tag covers the encoded payload bytes, so verification
//! happens before any parsing — unverified bytes are never fed to the
//! JSON parser.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::cookie::{AuthCookie, Payload};
use crate::keyring::Keyring;

/// Encode a cookie payload into a signed cookie value.
///
/// Returns `None` for [`AuthCookie::Empty`] — an empty phase is
/// represented by clearing the cookie, not by writing one.
pub fn encode(cookie: &AuthCookie, keys: &Keyring) -> Option<String> {
    let payload = cookie.to_payload()?;
    // Payload is a plain struct of strings; serialization cannot fail.
    let json = serde_json::to_vec(&payload).expect("payload serialization is infallible");
    let body = URL_SAFE_NO_PAD.encode(json);
    let tag = keys.sign(body.as_bytes());
    Some(format!("{body}.{}", URL_SAFE_NO_PAD.encode(tag)))
}

/// Decode and verify a cookie value.
///
/// Security boundary: every failure — missing separator, bad base64,
/// a tag no accepted key produces, unparseable JSON, or a payload
/// outside the permitted shapes — returns [`AuthCookie::Empty`].
/// Malformed input degrades to anonymous, never to an error.
pub fn decode(value: &str, keys: &Keyring) -> AuthCookie {
    let Some((body, tag_part)) = value.split_once('.') else {
        return AuthCookie::Empty;
    };
    let Ok(tag) = URL_SAFE_NO_PAD.decode(tag_part) else {
        return AuthCookie::Empty;
    };
    if !keys.verify(body.as_bytes(), &tag) {
        return AuthCookie::Empty;
    }
    let Ok(json) = URL_SAFE_NO_PAD.decode(body) else {
        return AuthCookie::Empty;
    };
    match serde_json::from_slice::<Payload>(&json) {
        Ok(payload) => payload.into_cookie(),
        Err(_) => AuthCookie::Empty,
    }
}
