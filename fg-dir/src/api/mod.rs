//! HTTP API handlers for fg-dir

pub mod auth;
pub mod editor;
pub mod health;
pub mod import;
pub mod listings;
pub mod ui;

pub use auth::{login, logout, require_admin};
pub use editor::save_edits;
pub use health::health_routes;
pub use import::{import_listings, repair_coordinates};
pub use listings::{create_listing, get_listings, get_map_markers, get_province_stats};
pub use ui::{serve_app_js, serve_index};
