//! Login handler: the whole handshake behind a single route
//!
//! Every visit to the mount path lands here, and the signed cookie is
//! the only state. Branch order is what makes the handler safe to hit
//! at any point in the handshake:
//!
//! 1. authenticated cookie: already logged in, go to the success page
//! 2. pending cookie + matching callback: finish the exchange
//! 3. pending cookie, anything else: clear and restart
//! 4. no cookie + callback params: stale or cross-device link, restart
//! 5. no cookie: begin a fresh handshake
//!
//! "Restart" always means clear the cookie and redirect back to the
//! mount path with no query string, so a broken handshake self-heals on
//! the next request instead of looping.

use std::sync::atomic::Ordering;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tracing::{debug, info, warn};

use auth_cookie::AuthCookie;

use crate::error::Result;
use crate::state::AppState;

/// Provider callback parameters. Both absent on a plain visit.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    oauth_token: Option<String>,
    oauth_verifier: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Response> {
    let cookie = read_cookie(&state, &jar);

    match cookie {
        AuthCookie::Authenticated { .. } => {
            debug!("already authenticated, redirecting to success page");
            Ok(Redirect::to(&state.settings.success_redirect).into_response())
        }

        AuthCookie::Pending {
            request_token,
            request_token_secret,
        } => match (query.oauth_token.as_deref(), query.oauth_verifier.as_deref()) {
            (Some(token), Some(verifier)) if token == request_token => {
                complete_login(&state, jar, token, &request_token_secret, verifier).await
            }
            (Some(_), Some(_)) => {
                warn!("callback token does not match pending handshake, restarting");
                crate::metrics::record_state_mismatch();
                Ok(restart(&state, jar))
            }
            _ => {
                debug!("pending cookie without a usable callback, restarting");
                Ok(restart(&state, jar))
            }
        },

        AuthCookie::Empty => {
            if query.oauth_verifier.is_some() {
                warn!("callback arrived with no pending handshake, restarting");
                crate::metrics::record_state_mismatch();
                Ok(restart(&state, jar))
            } else {
                begin_handshake(&state, jar, &headers).await
            }
        }
    }
}

/// Leg one: obtain a request token and park its secret in the pending
/// cookie, then send the browser to the provider's consent page.
async fn begin_handshake(state: &AppState, jar: CookieJar, headers: &HeaderMap) -> Result<Response> {
    let callback = callback_url(state, headers);
    let request = state.exchange.request_token(&callback).await?;

    let pending = AuthCookie::Pending {
        request_token: request.token,
        request_token_secret: request.secret,
    };
    let value = auth_cookie::encode(&pending, &state.keyring)
        .expect("pending cookie always has a payload");

    info!("handshake started, redirecting to provider consent page");
    crate::metrics::record_handshake_started();

    let jar = jar.add(state.settings.cookie.build(value));
    Ok((jar, Redirect::to(&request.authorize_url)).into_response())
}

/// Leg two: trade the verifier for an access token and replace the
/// pending cookie with the authenticated one.
async fn complete_login(
    state: &AppState,
    jar: CookieJar,
    token: &str,
    token_secret: &str,
    verifier: &str,
) -> Result<Response> {
    let access = state.exchange.access_token(token, token_secret, verifier).await?;

    info!(user_id = %access.user_id, "login complete");
    state.stats.logins_completed.fetch_add(1, Ordering::Relaxed);
    crate::metrics::record_login_completed();

    let authenticated = AuthCookie::Authenticated {
        user_id: access.user_id,
        screen_name: access.screen_name,
        access_token: access.token,
        access_token_secret: access.secret,
    };
    let value = auth_cookie::encode(&authenticated, &state.keyring)
        .expect("authenticated cookie always has a payload");

    let jar = jar.add(state.settings.cookie.build(value));
    Ok((jar, Redirect::to(&state.settings.success_redirect)).into_response())
}

/// Clear the cookie and bounce back to the mount path. The redirect
/// carries no query string, so the next request starts branch 5.
fn restart(state: &AppState, jar: CookieJar) -> Response {
    let jar = jar.add(state.settings.cookie.removal());
    (jar, Redirect::to(&state.settings.mount_path)).into_response()
}

fn read_cookie(state: &AppState, jar: &CookieJar) -> AuthCookie {
    jar.get(&state.settings.cookie.name)
        .map(|cookie| auth_cookie::decode(cookie.value(), &state.keyring))
        .unwrap_or(AuthCookie::Empty)
}

/// Derive the callback URL registered with the provider from the first
/// login request, then reuse it for the lifetime of the process.
fn callback_url(state: &AppState, headers: &HeaderMap) -> String {
    state
        .callback_url
        .get_or_init(|| {
            let forwarded_https = headers
                .get("x-forwarded-proto")
                .and_then(|value| value.to_str().ok())
                == Some("https");
            let scheme = if state.settings.force_https || forwarded_https {
                "https"
            } else {
                "http"
            };
            let host = headers
                .get(header::HOST)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("localhost");
            format!("{scheme}://{host}{}", state.settings.mount_path)
        })
        .clone()
}
