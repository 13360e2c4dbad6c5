//! Shared test fixtures: a scripted token exchange and router builders.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use axum::http::header;
use axum::response::Response;
use axum::Router;
use axum_extra::extract::cookie::SameSite;
use metrics_exporter_prometheus::PrometheusBuilder;

use auth_cookie::{AuthCookie, Keyring};
use common::Secret;
use twitter_oauth::{AccessToken, RequestToken, TokenExchange};

use crate::state::{AppState, CookieSettings, Settings, Stats};

pub const COOKIE_NAME: &str = "twauth";

/// Scripted [`TokenExchange`] that never touches the network. Counts
/// calls and remembers the arguments it was handed.
#[derive(Clone)]
pub struct MockExchange {
    fail: bool,
    pub request_token_calls: Arc<AtomicUsize>,
    pub access_token_calls: Arc<AtomicUsize>,
    last_callback_url: Arc<Mutex<Option<String>>>,
    last_access_args: Arc<Mutex<Option<(String, String, String)>>>,
}

impl MockExchange {
    pub fn ok() -> Self {
        Self::new(false)
    }

    /// Both legs fail the way an unreachable provider would.
    pub fn failing() -> Self {
        Self::new(true)
    }

    fn new(fail: bool) -> Self {
        Self {
            fail,
            request_token_calls: Arc::new(AtomicUsize::new(0)),
            access_token_calls: Arc::new(AtomicUsize::new(0)),
            last_callback_url: Arc::new(Mutex::new(None)),
            last_access_args: Arc::new(Mutex::new(None)),
        }
    }

    pub fn last_callback_url(&self) -> Option<String> {
        self.last_callback_url.lock().unwrap().clone()
    }

    /// The `(token, token_secret, verifier)` triple of the last
    /// `access_token` call.
    pub fn last_access_args(&self) -> Option<(String, String, String)> {
        self.last_access_args.lock().unwrap().clone()
    }
}

impl TokenExchange for MockExchange {
    fn request_token<'a>(
        &'a self,
        callback_url: &'a str,
    ) -> Pin<Box<dyn Future<Output = twitter_oauth::Result<RequestToken>> + Send + 'a>> {
        Box::pin(async move {
            self.request_token_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_callback_url.lock().unwrap() = Some(callback_url.to_string());
            if self.fail {
                return Err(twitter_oauth::Error::Http("connection refused".into()));
            }
            Ok(RequestToken {
                token: "req-token".into(),
                secret: "req-secret".into(),
                authorize_url: "https://provider.test/authenticate?oauth_token=req-token".into(),
            })
        })
    }

    fn access_token<'a>(
        &'a self,
        token: &'a str,
        token_secret: &'a str,
        verifier: &'a str,
    ) -> Pin<Box<dyn Future<Output = twitter_oauth::Result<AccessToken>> + Send + 'a>> {
        Box::pin(async move {
            self.access_token_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_access_args.lock().unwrap() =
                Some((token.to_string(), token_secret.to_string(), verifier.to_string()));
            if self.fail {
                return Err(twitter_oauth::Error::Exchange(
                    "provider returned 401".into(),
                ));
            }
            Ok(AccessToken {
                token: "acc-token".into(),
                secret: "acc-secret".into(),
                user_id: "783214".into(),
                screen_name: Some("alice".into()),
            })
        })
    }
}

fn test_settings() -> Settings {
    Settings {
        mount_path: "/twauth".into(),
        success_redirect: "/done".into(),
        failure_redirect: None,
        force_https: false,
        cookie: CookieSettings {
            name: COOKIE_NAME.into(),
            domain: None,
            path: "/".into(),
            secure: false,
            same_site: SameSite::Lax,
            max_age: None,
        },
    }
}

/// State plus a fully wired router, using default test settings.
pub fn test_state(exchange: MockExchange) -> (AppState, Router) {
    test_state_with(exchange, |_| {})
}

pub fn test_state_with(
    exchange: MockExchange,
    customize: impl FnOnce(&mut Settings),
) -> (AppState, Router) {
    let mut settings = test_settings();
    customize(&mut settings);

    let keys = [Secret::from("test-signing-key".to_string())];
    let keyring = Keyring::new(&keys).unwrap();

    // Isolated recorder per test; the handle keeps the registry alive.
    let prometheus = PrometheusBuilder::new().build_recorder().handle();

    let state = AppState {
        exchange: Arc::new(exchange),
        keyring: Arc::new(keyring),
        settings: Arc::new(settings),
        callback_url: Arc::new(OnceLock::new()),
        stats: Stats::new(),
        prometheus,
    };
    let router = crate::build_router(state.clone());
    (state, router)
}

/// Encoded pending cookie value signed with the test keyring.
pub fn pending_cookie(state: &AppState, token: &str, secret: &str) -> String {
    auth_cookie::encode(
        &AuthCookie::Pending {
            request_token: token.into(),
            request_token_secret: secret.into(),
        },
        &state.keyring,
    )
    .unwrap()
}

/// Encoded authenticated cookie matching [`MockExchange::ok`]'s output.
pub fn authenticated_cookie(state: &AppState) -> String {
    auth_cookie::encode(
        &AuthCookie::Authenticated {
            user_id: "783214".into(),
            screen_name: Some("alice".into()),
            access_token: "acc-token".into(),
            access_token_secret: "acc-secret".into(),
        },
        &state.keyring,
    )
    .unwrap()
}

/// Decode the Set-Cookie header of `response` with the state keyring.
pub fn decode_set_cookie(response: &Response, keyring: &Keyring) -> AuthCookie {
    let value = set_cookie_value(response);
    assert!(!value.is_empty(), "expected a non-removal Set-Cookie");
    auth_cookie::decode(&value, keyring)
}

/// Assert that `response` clears the auth cookie.
pub fn removal_set_cookie(response: &Response) {
    let header = raw_set_cookie(response);
    assert!(
        set_cookie_value(response).is_empty(),
        "removal cookie must carry an empty value: {header}"
    );
    assert!(
        header.contains("Max-Age=0"),
        "removal cookie must expire immediately: {header}"
    );
}

fn raw_set_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("expected a Set-Cookie header")
        .to_str()
        .unwrap()
        .to_string()
}

fn set_cookie_value(response: &Response) -> String {
    let header = raw_set_cookie(response);
    let pair = header.split(';').next().unwrap();
    let (name, value) = pair.split_once('=').expect("malformed Set-Cookie");
    assert_eq!(name, COOKIE_NAME);
    value.to_string()
}
