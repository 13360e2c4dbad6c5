//! OAuth 1.0a request signing per RFC 5849
//!
//! Builds the signature base string and computes the HMAC-SHA1
//! signature the token endpoints require. SHA-1 is what the protocol
//! mandates; it authenticates the request to the provider and protects
//! nothing beyond that.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::RngExt;
use ring::hmac;
use std::time::{SystemTime, UNIX_EPOCH};

/// RFC 5849 section 3.6: everything except ALPHA / DIGIT / "-" / "." /
/// "_" / "~" is percent-encoded.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a string with the OAuth parameter encoding set.
pub(crate) fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

/// Generate a random nonce for a single signed request.
pub(crate) fn nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Current unix timestamp in seconds, as the protocol's string form.
pub(crate) fn timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .to_string()
}

/// Build the signature base string: method, URL, and the
/// encoded-and-sorted parameter list, each percent-encoded and joined
/// with `&`.
pub(crate) fn base_string(method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    // Sort by encoded key, then encoded value (keys can repeat)
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(url),
        percent_encode(&normalized)
    )
}

/// HMAC-SHA1 signature over the base string, base64-encoded.
///
/// The signing key is `encode(consumer_secret) & encode(token_secret)`;
/// the token secret is empty for the request-token leg.
pub(crate) fn signature(
    base: &str,
    consumer_secret: &str,
    token_secret: Option<&str>,
) -> String {
    let key_material = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret.unwrap_or(""))
    );
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, key_material.as_bytes());
    let tag = hmac::sign(&key, base.as_bytes());
    STANDARD.encode(tag.as_ref())
}

/// Assemble the `Authorization: OAuth ...` header from signed parameters.
pub(crate) fn authorization_header(params: &[(String, String)]) -> String {
    let fields = params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("OAuth {fields}")
}
