//! AI-assisted bulk import and coordinate auto-repair
//!
//! Both operations iterate sequentially; the Gemini client's built-in
//! inter-call delay is the only throttle. A repair run goes to completion,
//! there is no cancellation.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::models::{Listing, Province};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    /// Unstructured pasted text to extract listings from
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    /// Items the model returned that could not be used (bad province)
    pub skipped: usize,
    pub notice: Option<String>,
}

/// POST /api/admin/import
///
/// Extracts listings from pasted text, geocodes each one, appends them to
/// the working set, and persists. Every failure degrades: extraction
/// failure imports nothing, a geocode failure leaves the sentinel
/// coordinates on that record.
pub async fn import_listings(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> ApiResult<Json<ImportResponse>> {
    let Some(gemini) = &state.gemini else {
        return Ok(Json(ImportResponse {
            imported: 0,
            skipped: 0,
            notice: Some("AI import unavailable: no Gemini API key configured".to_string()),
        }));
    };

    let items = match gemini.parse_listing_text(&request.text).await {
        Ok(items) => items,
        Err(e) => {
            warn!("Listing extraction failed: {}", e);
            return Ok(Json(ImportResponse {
                imported: 0,
                skipped: 0,
                notice: Some(format!("Extraction failed: {}", e)),
            }));
        }
    };

    let mut new_listings = Vec::new();
    let mut skipped = 0;

    for item in items {
        let Some(province) = Province::parse(&item.province) else {
            warn!("Skipping extracted item with unknown province: {}", item.province);
            skipped += 1;
            continue;
        };

        // Sentinel coordinates when geocoding fails; the record still imports
        let (lat, lng) = match gemini.suggest_coordinates(&item.address, province).await {
            Ok(point) => (point.lat, point.lng),
            Err(e) => {
                warn!("Geocoding failed for '{}': {}", item.name, e);
                (0.0, 0.0)
            }
        };

        new_listings.push(Listing::new(item.name, province, item.address, lat, lng));
    }

    let imported = new_listings.len();
    state
        .listings
        .write()
        .await
        .extend(new_listings.iter().cloned());

    let mut notice = None;
    for listing in &new_listings {
        if let Err(e) = crate::db::upsert(&state.db, listing).await {
            warn!("Store write failed during import: {}", e);
            notice = Some(format!("Imported in memory only; store write failed: {}", e));
            break;
        }
    }

    info!(imported, skipped, "AI import finished");
    Ok(Json(ImportResponse {
        imported,
        skipped,
        notice,
    }))
}

#[derive(Debug, Serialize)]
pub struct RepairResponse {
    /// Records with sentinel coordinates that were attempted
    pub attempted: usize,
    /// Records that received real coordinates
    pub repaired: usize,
    pub notice: Option<String>,
}

/// POST /api/admin/repair
///
/// Walks every record with sentinel coordinates and asks the model for a
/// location. Zero results keep the sentinel and do not count as repaired.
pub async fn repair_coordinates(
    State(state): State<AppState>,
) -> ApiResult<Json<RepairResponse>> {
    let Some(gemini) = &state.gemini else {
        return Ok(Json(RepairResponse {
            attempted: 0,
            repaired: 0,
            notice: Some("Repair unavailable: no Gemini API key configured".to_string()),
        }));
    };

    // Snapshot the records needing repair so the read lock isn't held
    // across model calls
    let candidates: Vec<Listing> = state
        .listings
        .read()
        .await
        .iter()
        .filter(|l| !l.has_location())
        .cloned()
        .collect();

    let attempted = candidates.len();
    let mut repaired = Vec::new();

    for listing in candidates {
        match gemini
            .suggest_coordinates(&listing.address, listing.province)
            .await
        {
            Ok(point) if point.lat != 0.0 && point.lng != 0.0 => {
                let mut fixed = listing;
                fixed.lat = point.lat;
                fixed.lng = point.lng;
                repaired.push(fixed);
            }
            Ok(_) => warn!("Geocode returned sentinel for '{}'", listing.name),
            Err(e) => warn!("Geocode failed for '{}': {}", listing.name, e),
        }
    }

    {
        let mut listings = state.listings.write().await;
        for fixed in &repaired {
            if let Some(entry) = listings.iter_mut().find(|l| l.id == fixed.id) {
                entry.lat = fixed.lat;
                entry.lng = fixed.lng;
            }
        }
    }

    let mut notice = None;
    for fixed in &repaired {
        if let Err(e) = crate::db::upsert(&state.db, fixed).await {
            warn!("Store write failed during repair: {}", e);
            notice = Some(format!("Repaired in memory only; store write failed: {}", e));
            break;
        }
    }

    info!(attempted, repaired = repaired.len(), "Coordinate repair finished");
    Ok(Json(RepairResponse {
        attempted,
        repaired: repaired.len(),
        notice,
    }))
}
