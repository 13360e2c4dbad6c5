//! Gatekeeper middleware for protected routes
//!
//! Sits in front of any route that requires a logged-in visitor. A
//! request passes only if it carries a cookie that verifies and decodes
//! to the authenticated shape; everything else is turned away without
//! touching the provider. Denial is either a redirect to the configured
//! failure page or, when none is set, a 401 page that bounces the
//! browser to the login path after a second.

use std::sync::atomic::Ordering;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use std::fmt;
use tracing::debug;

use auth_cookie::AuthCookie;

use crate::state::AppState;

/// Access credentials of the logged-in visitor, inserted as a request
/// extension by the gatekeeper and available to handlers behind it.
#[derive(Clone)]
pub struct Credentials {
    pub user_id: String,
    pub screen_name: Option<String>,
    pub access_token: String,
    pub access_token_secret: String,
}

// The token pair signs provider API calls; keep it out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("screen_name", &self.screen_name)
            .field("access_token", &"[REDACTED]")
            .field("access_token_secret", &"[REDACTED]")
            .finish()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Credentials {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only reachable on routes the gatekeeper wraps; absence means
        // a route was wired up without it.
        parts
            .extensions
            .get::<Credentials>()
            .cloned()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

pub async fn gatekeeper(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie = jar
        .get(&state.settings.cookie.name)
        .map(|cookie| auth_cookie::decode(cookie.value(), &state.keyring))
        .unwrap_or(AuthCookie::Empty);

    match cookie {
        AuthCookie::Authenticated {
            user_id,
            screen_name,
            access_token,
            access_token_secret,
        } => {
            request.extensions_mut().insert(Credentials {
                user_id,
                screen_name,
                access_token,
                access_token_secret,
            });
            next.run(request).await
        }
        _ => {
            debug!(path = %request.uri().path(), "unauthenticated request turned away");
            state.stats.guard_denials.fetch_add(1, Ordering::Relaxed);
            crate::metrics::record_guard_denied();
            deny(&state)
        }
    }
}

fn deny(state: &AppState) -> Response {
    if let Some(ref target) = state.settings.failure_redirect {
        return Redirect::to(target).into_response();
    }
    let mount = &state.settings.mount_path;
    let page = format!(
        "<html><head><meta http-equiv=\"refresh\" content=\"1;url={mount}\"></head>\
         <body><h1>Twitter authentication required.</h1></body></html>"
    );
    (StatusCode::UNAUTHORIZED, Html(page)).into_response()
}
