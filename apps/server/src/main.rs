//! StayHub server binary
//!
//! Loads configuration from the environment (and `.env`), opens the SQLite
//! database and serves the REST API until the process is stopped.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use stayhub_gateway::{DependenciesBuilder, ServerConfig, StayHubServer};
use stayhub_storage::{default_database_path, generate_token_secret, Database, DATABASE_FILE};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Log file prefix, e.g. `stayhub.2026-01-22.log`
const LOG_PREFIX: &str = "stayhub";

/// Base directory for data and logs
fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stayhub")
}

/// Initialize tracing with console and file logging
///
/// - Console: colored, compact format
/// - File: daily rotation in `log_dir`, or the app data directory's `logs/`
fn init_tracing(log_dir: Option<PathBuf>) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let logs_dir = log_dir.unwrap_or_else(|| app_data_dir().join("logs"));
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create logs directory {:?}", logs_dir))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix("log")
        .build(&logs_dir)
        .context("Failed to create log file appender")?;
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG takes precedence over the per-crate defaults
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,stayhub_core=debug,stayhub_gateway=debug,stayhub_storage=debug")
    });

    let console_layer = fmt::layer()
        .with_ansi(true)
        .compact()
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    // Must be kept alive for the duration of the program
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    let _guard = init_tracing(config.log_dir.clone())?;

    info!("StayHub v{} starting", env!("CARGO_PKG_VERSION"));
    info!(?config, "Loaded configuration");

    let token_secret = match config.token_secret.clone() {
        Some(secret) => secret,
        None => {
            warn!("STAYHUB_TOKEN_SECRET not set; generated a per-process secret, tokens will not survive a restart");
            generate_token_secret()?
        }
    };

    let db_path = config
        .database_path
        .clone()
        .or_else(default_database_path)
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE));
    info!("Opening database at {:?}", db_path);
    let database = Arc::new(Mutex::new(Database::open(&db_path)?));

    let dependencies = DependenciesBuilder::new()
        .with_database(database)
        .with_token_secret(token_secret)
        .with_token_ttl_secs(config.token_ttl_secs)
        .build()
        .map_err(anyhow::Error::msg)?;

    StayHubServer::new(config, dependencies).run().await
}
