//! Trámites Server
//!
//! HTTP service for staff permission requests, justifications, and
//! infrastructure reports.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tower_http::services::ServeDir;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tramites_core::SystemClock;
use tramites_server::auth::TokenManager;
use tramites_server::blobstore::LocalBlobStore;
use tramites_server::http::cookies::SameSite;
use tramites_server::http::{AppState, CookieSettings, router};
use tramites_server::storage::Database;

#[derive(Parser, Debug)]
#[command(name = "tramites-server")]
#[command(
    version,
    about = "Trámites server - staff requests, justifications, and reports"
)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    addr: SocketAddr,

    /// Path to SQLite database file.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Session token secret key.
    #[arg(
        long,
        env = "TRAMITES_JWT_SECRET",
        default_value = "dev-secret-change-me"
    )]
    jwt_secret: String,

    /// Session TTL in seconds.
    #[arg(long, default_value_t = 604_800)]
    session_ttl: i64,

    /// `SameSite` attribute for the session cookie.
    #[arg(long, value_enum, default_value_t = SameSite::Lax)]
    cookie_same_site: SameSite,

    /// Mark the session cookie `Secure` (forced on when `SameSite=None`).
    #[arg(long)]
    cookie_secure: bool,

    /// `Domain` attribute for the session cookie.
    #[arg(long)]
    cookie_domain: Option<String>,

    /// Directory for uploaded attachments.
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// Public path the attachment directory is served under.
    #[arg(long, default_value = "/files")]
    files_mount: String,

    /// Directory holding the LiberationSans TTF set for PDF export.
    #[arg(long, default_value = "fonts")]
    fonts_dir: PathBuf,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    let dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?
        .join(".tramites");
    Ok(dir)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "tramites_server=info".into()),
    );
    if args.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %args.addr,
        "Starting tramites-server"
    );

    let db_path = match args.db_path {
        Some(path) => path,
        None => default_data_dir()?.join("tramites.db"),
    };
    info!(path = %db_path.display(), "Opening database");
    let db = Database::open(&db_path).await?;

    let storage_dir = match args.storage_dir {
        Some(dir) => dir,
        None => default_data_dir()?.join("uploads"),
    };
    tokio::fs::create_dir_all(&storage_dir).await?;

    let state = AppState {
        db,
        tokens: TokenManager::new(args.jwt_secret.as_bytes(), args.session_ttl),
        cookies: CookieSettings {
            same_site: args.cookie_same_site,
            secure: args.cookie_secure,
            domain: args.cookie_domain,
        },
        blobs: Arc::new(LocalBlobStore::new(&storage_dir, &args.files_mount)),
        clock: Arc::new(SystemClock),
        fonts_dir: args.fonts_dir,
    };

    let app = router(state)
        .nest_service(&args.files_mount, ServeDir::new(&storage_dir));

    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    info!(addr = %args.addr, files = %storage_dir.display(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
