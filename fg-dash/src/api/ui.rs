//! UI serving route
//!
//! Serves the embedded dashboard page (chart tabs over the sales views)

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../ui/index.html");

/// GET /
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
