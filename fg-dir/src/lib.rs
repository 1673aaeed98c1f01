//! fg-dir library - restaurant directory service
//!
//! Filterable list + map markers for everyone; CRUD, table-editor
//! reconciliation, AI import and coordinate repair behind admin auth.

use axum::Router;
use fg_common::auth::SessionTokens;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod ai;
pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod reconcile;

use ai::GeminiClient;
use models::Listing;

/// Application state shared across HTTP handlers
///
/// The working set is the in-memory source for reads; the database is its
/// durable mirror. No process-wide singletons: everything handlers need
/// travels through this context object.
#[derive(Clone)]
pub struct AppState {
    /// Durable store for the working set
    pub db: SqlitePool,
    /// Ordered working set, loaded at startup
    pub listings: Arc<RwLock<Vec<Listing>>>,
    /// Active admin sessions
    pub sessions: Arc<SessionTokens>,
    /// Accepted admin passwords (from config)
    pub admin_passwords: Arc<Vec<String>>,
    /// Gemini client; None when no API key is configured
    pub gemini: Option<Arc<GeminiClient>>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        listings: Vec<Listing>,
        admin_passwords: Vec<String>,
        gemini: Option<GeminiClient>,
    ) -> Self {
        Self {
            db,
            listings: Arc::new(RwLock::new(listings)),
            sessions: Arc::new(SessionTokens::new()),
            admin_passwords: Arc::new(admin_passwords),
            gemini: gemini.map(Arc::new),
        }
    }
}

/// Build application router
///
/// Admin routes sit behind the session-token middleware; the public
/// surface (list, map, stats, login, health, UI) does not.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};
    use tower_http::trace::TraceLayer;

    let admin = Router::new()
        .route("/api/admin/listings", post(api::create_listing))
        .route("/api/admin/listings/save", post(api::save_edits))
        .route("/api/admin/import", post(api::import_listings))
        .route("/api/admin/repair", post(api::repair_coordinates))
        .route("/api/admin/logout", post(api::logout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_admin,
        ));

    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/api/listings", get(api::get_listings))
        .route("/api/listings/map", get(api::get_map_markers))
        .route("/api/stats/provinces", get(api::get_province_stats))
        .route("/api/admin/login", post(api::login))
        .merge(api::health_routes());

    Router::new()
        .merge(admin)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
