//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! Secret material never lives in the TOML directly: cookie signing
//! keys come from COOKIE_KEYS or keys_file, the consumer secret from
//! TWITTER_CONSUMER_SECRET or consumer_secret_file.

use common::Secret;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum_extra::extract::cookie::SameSite;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub login: LoginConfig,
    #[serde(default)]
    pub cookie: CookieConfig,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub keys: KeysConfig,
}

/// Listener settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
}

/// Login handler settings
#[derive(Debug, Deserialize)]
pub struct LoginConfig {
    /// The one path the login handler is mounted at
    #[serde(default = "default_mount_path")]
    pub mount_path: String,
    /// Where a completed (or already-authenticated) login redirects to
    #[serde(default = "default_success_redirect")]
    pub success_redirect: String,
    /// Where the gatekeeper sends denied requests; 401 page if unset
    #[serde(default)]
    pub failure_redirect: Option<String>,
    /// Deployment is HTTPS-only: marks the cookie secure and derives
    /// an https callback URL
    #[serde(default)]
    pub force_https: bool,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            mount_path: default_mount_path(),
            success_redirect: default_success_redirect(),
            failure_redirect: None,
            force_https: false,
        }
    }
}

/// Auth cookie attributes
#[derive(Debug, Deserialize)]
pub struct CookieConfig {
    #[serde(default = "default_cookie_name")]
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default = "default_cookie_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    /// One of "strict", "lax", "none"
    #[serde(default = "default_same_site")]
    pub same_site: String,
    /// Browser-side expiry; session cookie if unset
    #[serde(default)]
    pub max_age_secs: Option<u64>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            domain: None,
            path: default_cookie_path(),
            secure: false,
            same_site: default_same_site(),
            max_age_secs: None,
        }
    }
}

impl CookieConfig {
    pub fn same_site(&self) -> SameSite {
        match self.same_site.as_str() {
            "strict" => SameSite::Strict,
            "none" => SameSite::None,
            _ => SameSite::Lax,
        }
    }
}

/// OAuth provider settings
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    pub consumer_key: String,
    #[serde(skip)]
    pub consumer_secret: Option<Secret<String>>,
    /// Path to a file containing the consumer secret (alternative to
    /// the TWITTER_CONSUMER_SECRET env var)
    #[serde(default)]
    pub consumer_secret_file: Option<PathBuf>,
    #[serde(default = "default_request_token_url")]
    pub request_token_url: String,
    #[serde(default = "default_access_token_url")]
    pub access_token_url: String,
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
}

/// Cookie signing key settings
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    #[serde(skip)]
    pub signing_keys: Vec<Secret<String>>,
    /// Path to a file with one key per line, newest first
    /// (alternative to the COOKIE_KEYS env var)
    #[serde(default)]
    pub keys_file: Option<PathBuf>,
}

fn default_mount_path() -> String {
    "/twauth".into()
}

fn default_success_redirect() -> String {
    "/".into()
}

fn default_cookie_name() -> String {
    "twauth".into()
}

fn default_cookie_path() -> String {
    "/".into()
}

fn default_same_site() -> String {
    "lax".into()
}

fn default_request_token_url() -> String {
    twitter_oauth::REQUEST_TOKEN_URL.into()
}

fn default_access_token_url() -> String {
    twitter_oauth::ACCESS_TOKEN_URL.into()
}

fn default_authorize_url() -> String {
    twitter_oauth::AUTHORIZE_URL.into()
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment
    /// variables.
    ///
    /// Signing-key resolution order: COOKIE_KEYS env var (comma
    /// separated, newest first), then keys_file. Consumer-secret
    /// resolution: TWITTER_CONSUMER_SECRET env var, then
    /// consumer_secret_file. Both are required.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if !config.login.mount_path.starts_with('/') {
            return Err(crate::error::Error::Config(format!(
                "login.mount_path must be absolute, got: {}",
                config.login.mount_path
            )));
        }

        if !matches!(config.cookie.same_site.as_str(), "strict" | "lax" | "none") {
            return Err(crate::error::Error::Config(format!(
                "cookie.same_site must be strict, lax or none, got: {}",
                config.cookie.same_site
            )));
        }

        for (field, url) in [
            ("request_token_url", &config.provider.request_token_url),
            ("access_token_url", &config.provider.access_token_url),
            ("authorize_url", &config.provider.authorize_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(crate::error::Error::Config(format!(
                    "provider.{field} must start with http:// or https://, got: {url}"
                )));
            }
        }

        if config.provider.consumer_key.is_empty() {
            return Err(crate::error::Error::Config(
                "provider.consumer_key must not be empty".into(),
            ));
        }

        // Resolve signing keys: env var takes precedence over file
        if let Ok(keys) = std::env::var("COOKIE_KEYS") {
            config.keys.signing_keys = keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(|k| Secret::new(k.to_owned()))
                .collect();
        } else if let Some(ref keys_file) = config.keys.keys_file {
            let contents = std::fs::read_to_string(keys_file).map_err(|e| {
                crate::error::Error::Config(format!(
                    "failed to read keys_file {}: {e}",
                    keys_file.display()
                ))
            })?;
            config.keys.signing_keys = contents
                .lines()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(|k| Secret::new(k.to_owned()))
                .collect();
        }
        if config.keys.signing_keys.is_empty() {
            return Err(crate::error::Error::Config(
                "no cookie signing keys configured — set COOKIE_KEYS or keys.keys_file".into(),
            ));
        }

        // Resolve consumer secret: env var takes precedence over file
        if let Ok(secret) = std::env::var("TWITTER_CONSUMER_SECRET") {
            config.provider.consumer_secret = Some(Secret::new(secret));
        } else if let Some(ref secret_file) = config.provider.consumer_secret_file {
            let secret = std::fs::read_to_string(secret_file).map_err(|e| {
                crate::error::Error::Config(format!(
                    "failed to read consumer_secret_file {}: {e}",
                    secret_file.display()
                ))
            })?;
            let secret = secret.trim().to_owned();
            if !secret.is_empty() {
                config.provider.consumer_secret = Some(Secret::new(secret));
            }
        }
        if config.provider.consumer_secret.is_none() {
            return Err(crate::error::Error::Config(
                "no consumer secret configured — set TWITTER_CONSUMER_SECRET or provider.consumer_secret_file"
                    .into(),
            ));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("login-gateway.toml")
    }
}
