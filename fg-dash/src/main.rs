//! fg-dash - sales analytics dashboard service
//!
//! Chart views over ERP invoicing data: monthly revenue against goals,
//! revenue by product and customer, receivable aging, profit by plan.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use fg_common::config::Config;
use fg_dash::erp::ErpClient;
use fg_dash::{build_router, goals, AppState};

#[derive(Parser)]
#[command(name = "fg-dash", about = "FiscalGuard sales analytics dashboard")]
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
        "Starting FiscalGuard Dashboard (fg-dash) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    if config.dashboard.erp.url.is_empty() {
        warn!("No ERP URL configured; every view will render empty with a notice");
    }

    let monthly_goals = match &config.dashboard.goals_path {
        Some(path) => {
            let loaded = goals::load_goals(path);
            info!(
                "Loaded {} monthly goals from {}",
                loaded.len(),
                path.display()
            );
            loaded
        }
        None => Vec::new(),
    };

    let erp = ErpClient::new(config.dashboard.erp.clone())
        .map_err(|e| anyhow::anyhow!("ERP client setup failed: {}", e))?;
    let state = AppState::new(
        erp,
        Duration::from_secs(config.dashboard.cache_ttl_secs),
        monthly_goals,
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.dashboard.bind).await?;
    info!("fg-dash listening on http://{}", config.dashboard.bind);
    info!("Health check: http://{}/health", config.dashboard.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
