//! fg-dir - restaurant directory service
//!
//! Public list/map views of blacklisted restaurants plus an admin surface
//! for CRUD, table-editor reconciliation, AI import, and coordinate repair.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use fg_common::config::Config;
use fg_dir::ai::GeminiClient;
use fg_dir::{build_router, db, AppState};

#[derive(Parser)]
#[command(name = "fg-dir", about = "FiscalGuard restaurant directory service")]
struct Args {
    /// Path to config.toml (overrides FG_CONFIG and the platform default)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification immediately after tracing init
    info!(
        "Starting FiscalGuard Directory (fg-dir) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    let db_path = config.directory_database_path();
    info!("Database path: {}", db_path.display());
    let pool = db::init_database_pool(&db_path).await?;

    // The working set lives in memory for the process lifetime; the
    // database is its durable mirror
    let listings = db::fetch_all(&pool).await?;
    info!("Loaded {} listings into the working set", listings.len());

    if config.directory.admin_passwords.is_empty() {
        warn!("No admin passwords configured; admin surface is disabled");
    }

    let gemini = if config.directory.gemini_api_key.is_empty() {
        warn!("No Gemini API key configured; AI import and repair are disabled");
        None
    } else {
        Some(GeminiClient::new(config.directory.gemini_api_key.clone())?)
    };

    let state = AppState::new(
        pool,
        listings,
        config.directory.admin_passwords.clone(),
        gemini,
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.directory.bind).await?;
    info!("fg-dir listening on http://{}", config.directory.bind);
    info!("Health check: http://{}/health", config.directory.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
