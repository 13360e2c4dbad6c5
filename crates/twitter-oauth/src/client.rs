//! OAuth 1.0a HTTP client for the token endpoints
//!
//! Performs the two signed POSTs of the handshake and parses the
//! form-urlencoded responses. Endpoint URLs are overridable so tests
//! can run against a local mock provider.

use percent_encoding::percent_decode_str;
use tracing::debug;

use common::Secret;

use crate::constants::{ACCESS_TOKEN_URL, AUTHORIZE_URL, REQUEST_TOKEN_URL};
use crate::error::{Error, Result};
use crate::exchange::{AccessToken, RequestToken, TokenExchange};
use crate::sign;

/// Reqwest-backed implementation of [`TokenExchange`].
pub struct OAuth1Client {
    http: reqwest::Client,
    consumer_key: String,
    consumer_secret: Secret<String>,
    request_token_url: String,
    access_token_url: String,
    authorize_url: String,
}

impl OAuth1Client {
    /// Client against the default Twitter endpoints.
    pub fn new(http: reqwest::Client, consumer_key: String, consumer_secret: Secret<String>) -> Self {
        Self::with_endpoints(
            http,
            consumer_key,
            consumer_secret,
            REQUEST_TOKEN_URL.into(),
            ACCESS_TOKEN_URL.into(),
            AUTHORIZE_URL.into(),
        )
    }

    /// Client against explicit endpoints (configuration override, tests).
    pub fn with_endpoints(
        http: reqwest::Client,
        consumer_key: String,
        consumer_secret: Secret<String>,
        request_token_url: String,
        access_token_url: String,
        authorize_url: String,
    ) -> Self {
        Self {
            http,
            consumer_key,
            consumer_secret,
            request_token_url,
            access_token_url,
            authorize_url,
        }
    }

    /// POST to `url` with a signed `Authorization: OAuth` header and
    /// return the response body on success.
    async fn signed_post(
        &self,
        url: &str,
        extra_params: &[(&str, &str)],
        token_secret: Option<&str>,
    ) -> Result<String> {
        let mut params: Vec<(String, String)> = vec![
            ("oauth_consumer_key".into(), self.consumer_key.clone()),
            ("oauth_nonce".into(), sign::nonce()),
            ("oauth_signature_method".into(), "HMAC-SHA1".into()),
            ("oauth_timestamp".into(), sign::timestamp()),
            ("oauth_version".into(), "1.0".into()),
        ];
        for (k, v) in extra_params {
            params.push(((*k).into(), (*v).into()));
        }

        let base = sign::base_string("POST", url, &params);
        let signature = sign::signature(&base, self.consumer_secret.expose(), token_secret);
        params.push(("oauth_signature".into(), signature));

        let response = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, sign::authorization_header(&params))
            .send()
            .await
            .map_err(|e| Error::Http(format!("token endpoint request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("reading token endpoint response: {e}")))?;

        if !status.is_success() {
            return Err(Error::Exchange(format!(
                "token endpoint returned {status}: {body}"
            )));
        }
        Ok(body)
    }
}

impl TokenExchange for OAuth1Client {
    fn request_token<'a>(
        &'a self,
        callback_url: &'a str,
    ) -> std::pin::Pin<Box<dyn Future<Output = Result<RequestToken>> + Send + 'a>> {
        Box::pin(async move {
            let body = self
                .signed_post(
                    &self.request_token_url,
                    &[("oauth_callback", callback_url)],
                    None,
                )
                .await?;
            let fields = parse_form(&body);

            // The provider must confirm it accepted our callback URL
            if lookup(&fields, "oauth_callback_confirmed") != Some("true") {
                return Err(Error::Exchange(
                    "provider did not confirm the oauth callback".into(),
                ));
            }
            let token = require(&fields, "oauth_token")?;
            let secret = require(&fields, "oauth_token_secret")?;

            debug!(token, "obtained request token");
            let authorize_url = format!(
                "{}?oauth_token={}",
                self.authorize_url,
                sign::percent_encode(&token)
            );
            Ok(RequestToken {
                token,
                secret,
                authorize_url,
            })
        })
    }

    fn access_token<'a>(
        &'a self,
        token: &'a str,
        token_secret: &'a str,
        verifier: &'a str,
    ) -> std::pin::Pin<Box<dyn Future<Output = Result<AccessToken>> + Send + 'a>> {
        Box::pin(async move {
            let body = self
                .signed_post(
                    &self.access_token_url,
                    &[("oauth_token", token), ("oauth_verifier", verifier)],
                    Some(token_secret),
                )
                .await?;
            let fields = parse_form(&body);

            let access = require(&fields, "oauth_token")?;
            let secret = require(&fields, "oauth_token_secret")?;
            // The authenticated cookie shape requires a user id; a
            // response without one is unusable.
            let user_id = require(&fields, "user_id")?;
            let screen_name = lookup(&fields, "screen_name").map(str::to_string);

            debug!(user_id, ?screen_name, "exchanged verifier for access token");
            Ok(AccessToken {
                token: access,
                secret,
                user_id,
                screen_name,
            })
        })
    }
}

/// Parse a form-urlencoded response body into decoded key/value pairs.
fn parse_form(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (
                percent_decode_str(k).decode_utf8_lossy().into_owned(),
                percent_decode_str(v).decode_utf8_lossy().into_owned(),
            )
        })
        .collect()
}

fn lookup<'a>(fields: &'a [(String, String)], key: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn require(fields: &[(String, String)], key: &str) -> Result<String> {
    lookup(fields, key)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidResponse(format!("missing {key} in provider response")))
}
