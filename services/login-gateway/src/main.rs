//! Twitter login gateway
//!
//! Single-binary service that:
//! 1. Mounts the whole OAuth 1.0a handshake on one login path
//! 2. Keeps all session state in a signed browser cookie
//! 3. Guards protected routes with the gatekeeper middleware
//! 4. Exposes /health and Prometheus /metrics

mod config;
mod error;
mod gatekeeper;
mod login;
mod metrics;
mod state;
#[cfg(test)]
mod testing;

use std::sync::atomic::Ordering;
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Json, Router};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth_cookie::Keyring;
use twitter_oauth::OAuth1Client;

use crate::config::Config;
use crate::gatekeeper::Credentials;
use crate::state::{AppState, Settings, Stats};

/// Build the axum router: the login path, the demo protected route, and
/// the operational endpoints.
fn build_router(state: AppState) -> Router {
    let mount_path = state.settings.mount_path.clone();
    let protected = Router::new()
        .route("/me", get(me_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            gatekeeper::gatekeeper,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route(&mount_path, get(login::login))
        .merge(protected)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting twauth-login-gateway");

    // Install Prometheus metrics recorder before any metrics are emitted
    let prometheus = metrics::install_recorder();

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        listen_addr = %config.server.listen_addr,
        mount_path = %config.login.mount_path,
        signing_keys = config.keys.signing_keys.len(),
        "configuration loaded"
    );

    let keyring =
        Keyring::new(&config.keys.signing_keys).context("failed to build cookie keyring")?;

    let consumer_secret = config
        .provider
        .consumer_secret
        .clone()
        .context("consumer secret missing after config load")?;
    let exchange = OAuth1Client::with_endpoints(
        reqwest::Client::new(),
        config.provider.consumer_key.clone(),
        consumer_secret,
        config.provider.request_token_url.clone(),
        config.provider.access_token_url.clone(),
        config.provider.authorize_url.clone(),
    );

    let state = AppState {
        exchange: Arc::new(exchange),
        keyring: Arc::new(keyring),
        settings: Arc::new(Settings::from_config(&config)),
        callback_url: Arc::new(OnceLock::new()),
        stats: Stats::new(),
        prometheus,
    };

    let app = build_router(state);

    let listen_addr = config.server.listen_addr;
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind to {listen_addr}"))?;

    info!(addr = %listen_addr, "accepting requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutdown complete");
    Ok(())
}

/// Demo protected route: echoes the identity the gatekeeper attached.
/// The token pair stays server-side.
async fn me_handler(credentials: Credentials) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": credentials.user_id,
        "screen_name": credentials.screen_name,
    }))
}

/// Health endpoint: status, uptime and the login counters.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let body = serde_json::json!({
        "status": "healthy",
        "uptime_seconds": state.stats.started_at.elapsed().as_secs(),
        "logins_completed": state.stats.logins_completed.load(Ordering::Relaxed),
        "gatekeeper_denials": state.stats.guard_denials.load(Ordering::Relaxed),
    });
    (
        axum::http::StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

/// Prometheus metrics endpoint — returns metrics in text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::testing::{test_state, MockExchange, COOKIE_NAME};

    #[tokio::test]
    async fn health_endpoint_returns_json() {
        let (state, app) = test_state(MockExchange::ok());
        state
            .stats
            .logins_completed
            .fetch_add(3, std::sync::atomic::Ordering::Relaxed);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["status"], "healthy");
        assert_eq!(json["logins_completed"], 3);
        assert!(json["uptime_seconds"].is_u64());
    }

    #[tokio::test]
    async fn metrics_endpoint_returns_prometheus_format() {
        let (_state, app) = test_state(MockExchange::ok());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(
            content_type.contains("text/plain"),
            "metrics endpoint must return text/plain Prometheus format"
        );
    }

    #[tokio::test]
    async fn health_and_metrics_are_not_gatekept() {
        let (_state, app) = test_state(MockExchange::ok());

        for path in ["/health", "/metrics"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{path} must be open");
        }
    }

    /// Drive the full handshake through the router the way a browser
    /// would: visit the login path, come back from the provider with
    /// the verifier, then hit the protected route with the final cookie.
    #[tokio::test]
    async fn full_handshake_ends_with_access_to_protected_route() {
        let exchange = MockExchange::ok();
        let (_state, app) = test_state(exchange.clone());

        // First visit: no cookie, redirected to the consent page.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/twauth")
                    .header(header::HOST, "login.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        let pending = cookie_value(&response);

        // Provider callback with the pending cookie and the verifier.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/twauth?oauth_token=req-token&oauth_verifier=ver-123")
                    .header(header::HOST, "login.example.com")
                    .header(header::COOKIE, format!("{COOKIE_NAME}={pending}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/done");
        let authenticated = cookie_value(&response);

        // The final cookie opens the protected route.
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header(header::COOKIE, format!("{COOKIE_NAME}={authenticated}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["user_id"], "783214");
    }

    #[tokio::test]
    async fn protected_route_never_sees_the_token_secret() {
        let exchange = MockExchange::ok();
        let (state, app) = test_state(exchange);
        let cookie = crate::testing::authenticated_cookie(&state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header(header::COOKIE, format!("{COOKIE_NAME}={cookie}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(
            !text.contains("acc-secret"),
            "access token secret must not reach the browser: {text}"
        );
    }

    fn cookie_value(response: &axum::response::Response) -> String {
        let header = response.headers()[header::SET_COOKIE].to_str().unwrap();
        let pair = header.split(';').next().unwrap();
        pair.split_once('=').unwrap().1.to_string()
    }
}
