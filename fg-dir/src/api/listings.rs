//! Public list/map/stats views and manual admin creation

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Listing, ListingFilter, Province};
use crate::AppState;

/// Query parameters shared by the list, map, and stats views
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    /// Province name; empty or "Todas" means all provinces
    pub province: Option<String>,
    /// Case-insensitive substring over name/address
    pub q: Option<String>,
}

impl FilterParams {
    /// Convert to a typed filter; unknown province names are a 400
    pub fn into_filter(self) -> ApiResult<ListingFilter> {
        let province = match self.province.as_deref() {
            None | Some("") | Some("Todas") => None,
            Some(raw) => Some(
                Province::parse(raw)
                    .ok_or_else(|| ApiError::BadRequest(format!("Unknown province: {}", raw)))?,
            ),
        };
        Ok(ListingFilter {
            province,
            query: self.q,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ListingsResponse {
    pub total: usize,
    pub listings: Vec<Listing>,
}

/// GET /api/listings?province=&q=
///
/// Filtered list view. Records without coordinates are included here and
/// in the total, sentinel or not.
pub async fn get_listings(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> ApiResult<Json<ListingsResponse>> {
    let filter = params.into_filter()?;
    let listings = state.listings.read().await;
    let filtered: Vec<Listing> = filter.apply(&listings).into_iter().cloned().collect();

    Ok(Json(ListingsResponse {
        total: filtered.len(),
        listings: filtered,
    }))
}

/// One map marker; only records with real coordinates become markers
#[derive(Debug, Serialize)]
pub struct Marker {
    pub id: Uuid,
    pub name: String,
    pub province: Province,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct MapResponse {
    pub markers: Vec<Marker>,
}

/// GET /api/listings/map?province=&q=
pub async fn get_map_markers(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> ApiResult<Json<MapResponse>> {
    let filter = params.into_filter()?;
    let listings = state.listings.read().await;

    let markers = filter
        .apply(&listings)
        .into_iter()
        .filter(|l| l.has_location())
        .map(|l| Marker {
            id: l.id,
            name: l.name.clone(),
            province: l.province,
            address: l.address.clone(),
            lat: l.lat,
            lng: l.lng,
        })
        .collect();

    Ok(Json(MapResponse { markers }))
}

#[derive(Debug, Serialize)]
pub struct ProvinceStatsResponse {
    pub labels: Vec<&'static str>,
    pub counts: Vec<usize>,
}

/// GET /api/stats/provinces?province=&q=
///
/// Listing count per province over the filtered view, for the admin chart.
/// Provinces with no listings are omitted.
pub async fn get_province_stats(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> ApiResult<Json<ProvinceStatsResponse>> {
    let filter = params.into_filter()?;
    let listings = state.listings.read().await;
    let filtered = filter.apply(&listings);

    let mut labels = Vec::new();
    let mut counts = Vec::new();
    for province in Province::ALL {
        let count = filtered.iter().filter(|l| l.province == province).count();
        if count > 0 {
            labels.push(province.name());
            counts.push(count);
        }
    }

    Ok(Json(ProvinceStatsResponse { labels, counts }))
}

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub name: String,
    pub province: Province,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct CreateListingResponse {
    pub listing: Listing,
    /// Set when the store write failed and memory/store diverge
    pub notice: Option<String>,
}

/// POST /api/admin/listings
///
/// Manual form submission. The in-memory append always succeeds; a store
/// failure is surfaced as a notice, not a rollback.
pub async fn create_listing(
    State(state): State<AppState>,
    Json(request): Json<CreateListingRequest>,
) -> ApiResult<Json<CreateListingResponse>> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Listing name is required".to_string()));
    }

    let listing = Listing::new(
        request.name,
        request.province,
        request.address,
        request.lat,
        request.lng,
    );

    state.listings.write().await.push(listing.clone());

    let notice = match crate::db::upsert(&state.db, &listing).await {
        Ok(()) => None,
        Err(e) => {
            warn!("Store write failed after create: {}", e);
            Some(format!("Saved in memory only; store write failed: {}", e))
        }
    };

    Ok(Json(CreateListingResponse { listing, notice }))
}
