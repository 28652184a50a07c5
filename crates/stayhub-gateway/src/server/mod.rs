//! REST Server
//!
//! HTTP server exposing the StayHub API under `/api`.
//! Self-contained with dependency injection: repositories and secrets are
//! handed in through [`AppDependencies`].

mod dependencies;
mod handlers;
pub mod logging_middleware;
pub mod rate_limit;
mod state;

pub use dependencies::{AppDependencies, DependenciesBuilder};
pub use state::AppState;

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use stayhub_storage::TOKEN_SECRET_SIZE;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use zeroize::Zeroizing;

use crate::auth::{require_auth, DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS};

/// Default port the server listens on
pub const DEFAULT_PORT: u16 = 3001;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// SQLite file; the platform data directory when unset
    pub database_path: Option<PathBuf>,
    /// Token signing secret; generated per process when unset
    pub token_secret: Option<Zeroizing<[u8; TOKEN_SECRET_SIZE]>>,
    /// Token lifetime in seconds
    pub token_ttl_secs: i64,
    /// Enable CORS for browser access
    pub enable_cors: bool,
    /// Directory for rotating log files
    pub log_dir: Option<PathBuf>,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_path", &self.database_path)
            .field(
                "token_secret",
                &self.token_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("enable_cors", &self.enable_cors)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            database_path: None,
            token_secret: None,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            enable_cors: true,
            log_dir: None,
        }
    }
}

impl ServerConfig {
    /// Read `STAYHUB_*` environment variables over the defaults
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("STAYHUB_HOST") {
            config.host = host;
        }
        if let Some(port) = get("STAYHUB_PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid STAYHUB_PORT: {}", port))?;
        }
        if let Some(path) = get("STAYHUB_DATABASE_PATH") {
            config.database_path = Some(PathBuf::from(path));
        }
        if let Some(secret) = get("STAYHUB_TOKEN_SECRET") {
            config.token_secret = Some(parse_secret(&secret)?);
        }
        if let Some(ttl) = get("STAYHUB_TOKEN_TTL_SECS") {
            let ttl: i64 = ttl
                .trim()
                .parse()
                .with_context(|| format!("Invalid STAYHUB_TOKEN_TTL_SECS: {}", ttl))?;
            anyhow::ensure!(ttl > 0, "STAYHUB_TOKEN_TTL_SECS must be positive");
            anyhow::ensure!(
                ttl <= MAX_TOKEN_TTL_SECS,
                "STAYHUB_TOKEN_TTL_SECS must be at most {}",
                MAX_TOKEN_TTL_SECS
            );
            config.token_ttl_secs = ttl;
        }
        if let Some(cors) = get("STAYHUB_ENABLE_CORS") {
            config.enable_cors = match cors.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => anyhow::bail!("Invalid STAYHUB_ENABLE_CORS: {}", other),
            };
        }
        if let Some(dir) = get("STAYHUB_LOG_DIR") {
            config.log_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    /// Get the socket address
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid address {}:{}", self.host, self.port))
    }
}

fn parse_secret(raw: &str) -> anyhow::Result<Zeroizing<[u8; TOKEN_SECRET_SIZE]>> {
    let bytes = Zeroizing::new(hex::decode(raw.trim()).context("STAYHUB_TOKEN_SECRET is not hex")?);
    anyhow::ensure!(
        bytes.len() == TOKEN_SECRET_SIZE,
        "STAYHUB_TOKEN_SECRET must be {} bytes, got {}",
        TOKEN_SECRET_SIZE,
        bytes.len()
    );
    let mut secret = Zeroizing::new([0u8; TOKEN_SECRET_SIZE]);
    secret.copy_from_slice(&bytes);
    Ok(secret)
}

/// Build the Axum router
///
/// Every route lives under `/api`. Protected routes sit behind
/// [`require_auth`] as a route layer, so unknown paths still 404.
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/properties", get(handlers::properties::list_properties))
        .route("/properties/{id}", get(handlers::properties::get_property));

    let protected = Router::new()
        .route(
            "/bookings/my-bookings",
            get(handlers::bookings::my_bookings),
        )
        .route("/bookings", post(handlers::bookings::create_booking))
        .route("/bookings/{id}", get(handlers::bookings::get_booking))
        .route(
            "/bookings/{id}/cancel",
            put(handlers::bookings::cancel_booking),
        )
        .route("/properties", post(handlers::properties::create_property))
        .route(
            "/properties/{id}",
            put(handlers::properties::update_property)
                .delete(handlers::properties::delete_property),
        )
        .route(
            "/users/profile",
            get(handlers::users::get_profile).put(handlers::users::update_profile),
        )
        .route(
            "/users/change-password",
            put(handlers::users::change_password),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api = public.merge(protected).with_state(state);

    // Rate limiter for login/register
    let rate_limiter = rate_limit::default_auth_rate_limiter();

    let mut router = Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        // Request/Response logging with body (DEBUG level)
        .layer(middleware::from_fn(
            logging_middleware::http_logging_middleware,
        ))
        // Extension must wrap the limiter middleware so it is visible there
        .layer(middleware::from_fn(rate_limit::rate_limit_middleware))
        .layer(axum::Extension(rate_limiter));

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router
}

/// StayHub REST server
pub struct StayHubServer {
    config: ServerConfig,
    state: AppState,
}

impl StayHubServer {
    /// Create a new server with dependency injection
    pub fn new(config: ServerConfig, dependencies: AppDependencies) -> Self {
        info!("[Server] Initializing with dependency injection...");
        let state = AppState::from_dependencies(&dependencies);
        Self { config, state }
    }

    /// The router this server serves
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), self.config.enable_cors)
    }

    /// Bind and serve until the listener fails
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.addr()?;

        info!("[Server] Starting on {}", addr);
        info!(
            "[Server] CORS: {}",
            if self.config.enable_cors {
                "enabled"
            } else {
                "disabled"
            }
        );

        let router = self.router();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("[Server] Ready to accept connections");

        // Peer addresses feed the per-client rate limiter
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;

        Ok(())
    }

    /// Start the server in the background
    ///
    /// Returns a JoinHandle that can be used to wait for completion or abort.
    pub fn spawn(self) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
