//! Shared application state
//!
//! Everything in here is immutable after startup (configuration,
//! keyring, exchange client) or atomically updated (health counters).
//! Handlers clone the state freely; there is no lock to hold across a
//! request, and the one lazily written field (the callback URL) is a
//! write-once cell.

use std::sync::atomic::AtomicU64;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use axum_extra::extract::cookie::{Cookie, SameSite};
use metrics_exporter_prometheus::PrometheusHandle;
use time::Duration;

use auth_cookie::Keyring;
use twitter_oauth::TokenExchange;

use crate::config::Config;

/// Shared state accessible from all handlers
#[derive(Clone)]
pub struct AppState {
    pub exchange: Arc<dyn TokenExchange>,
    pub keyring: Arc<Keyring>,
    pub settings: Arc<Settings>,
    /// Callback URL registered with the provider, derived lazily from
    /// the first login request (the externally visible host is not
    /// known at startup).
    pub callback_url: Arc<OnceLock<String>>,
    pub stats: Stats,
    pub prometheus: PrometheusHandle,
}

/// Counters surfaced on the /health endpoint.
#[derive(Clone)]
pub struct Stats {
    pub started_at: Instant,
    pub logins_completed: Arc<AtomicU64>,
    pub guard_denials: Arc<AtomicU64>,
}

impl Stats {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            logins_completed: Arc::new(AtomicU64::new(0)),
            guard_denials: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Immutable runtime settings derived from [`Config`].
pub struct Settings {
    pub mount_path: String,
    pub success_redirect: String,
    pub failure_redirect: Option<String>,
    pub force_https: bool,
    pub cookie: CookieSettings,
}

/// Attributes applied to every auth cookie this service writes.
pub struct CookieSettings {
    pub name: String,
    pub domain: Option<String>,
    pub path: String,
    pub secure: bool,
    pub same_site: SameSite,
    pub max_age: Option<Duration>,
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            mount_path: config.login.mount_path.clone(),
            success_redirect: config.login.success_redirect.clone(),
            failure_redirect: config.login.failure_redirect.clone(),
            force_https: config.login.force_https,
            cookie: CookieSettings {
                name: config.cookie.name.clone(),
                domain: config.cookie.domain.clone(),
                path: config.cookie.path.clone(),
                // Force-HTTPS deployments always mark the cookie secure
                secure: config.cookie.secure || config.login.force_https,
                same_site: config.cookie.same_site(),
                max_age: config
                    .cookie
                    .max_age_secs
                    .map(|secs| Duration::seconds(secs as i64)),
            },
        }
    }
}

impl CookieSettings {
    /// Build the auth cookie carrying an encoded value.
    pub fn build(&self, value: String) -> Cookie<'static> {
        let mut builder = Cookie::build((self.name.clone(), value))
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .path(self.path.clone());
        if let Some(ref domain) = self.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(max_age) = self.max_age {
            builder = builder.max_age(max_age);
        }
        builder.build()
    }

    /// Build the removal cookie that clears the auth cookie.
    pub fn removal(&self) -> Cookie<'static> {
        let mut builder = Cookie::build((self.name.clone(), ""))
            .path(self.path.clone())
            .max_age(Duration::ZERO);
        if let Some(ref domain) = self.domain {
            builder = builder.domain(domain.clone());
        }
        builder.build()
    }
}
