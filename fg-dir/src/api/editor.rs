//! Table-editor save endpoint: reconciliation + keyed store writes

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::reconcile::{apply_edits, EditedRow};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    /// Identifiers that were visible in the editor before editing
    pub shown_ids: Vec<Uuid>,
    /// The rows as returned by the editor
    pub edited: Vec<EditedRow>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub deleted: usize,
    pub updated: usize,
    pub added: usize,
    pub total: usize,
    /// Set when the store write failed and memory/store diverge
    pub notice: Option<String>,
}

/// POST /api/admin/listings/save
///
/// Applies an edit session against the full working set. The in-memory
/// update always succeeds before the store write is attempted; a store
/// failure leaves memory and store diverged until the next successful
/// save, and is reported through `notice`.
pub async fn save_edits(
    State(state): State<AppState>,
    Json(request): Json<SaveRequest>,
) -> ApiResult<Json<SaveResponse>> {
    let shown_ids: HashSet<Uuid> = request.shown_ids.into_iter().collect();

    let (outcome, total) = {
        let mut listings = state.listings.write().await;
        let outcome = apply_edits(listings.clone(), &shown_ids, request.edited);
        *listings = outcome.master.clone();
        let total = listings.len();
        (outcome, total)
    };

    info!(
        deleted = outcome.deleted_ids.len(),
        updated = outcome.updated,
        added = outcome.added,
        "Edit session reconciled"
    );

    let notice =
        match crate::db::apply_changeset(&state.db, &outcome.deleted_ids, &outcome.upserts).await {
            Ok(()) => None,
            Err(e) => {
                warn!("Store write failed after reconciliation: {}", e);
                Some(format!("Saved in memory only; store write failed: {}", e))
            }
        };

    Ok(Json(SaveResponse {
        deleted: outcome.deleted_ids.len(),
        updated: outcome.updated,
        added: outcome.added,
        total,
        notice,
    }))
}
