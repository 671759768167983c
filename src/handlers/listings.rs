use crate::domain::{Category, ListingWithCategory};
use crate::error::{GuideError, Result};
use crate::metrics::ServerMetrics;
use crate::search::ListingQuery;
use crate::seasonal::{season_for_month, Season};
use crate::share::{share_links, ShareLinks};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

/// `GET /api/listings?category=<slug>&q=<substring>&sort=<mode>`
pub async fn list_listings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListingQuery>,
) -> Response {
    ServerMetrics::record_listings_request();

    match state.catalog.find_listings(&query).await {
        Ok(listings) => Json(listings).into_response(),
        Err(e) => {
            error!("Error fetching listings: {e}");
            ServerMetrics::record_listings_error();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Failed to fetch listings" })),
            )
                .into_response()
        }
    }
}

pub async fn list_categories(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog.categories().await?))
}

async fn find_listing(state: &AppState, id: i64) -> Result<ListingWithCategory> {
    state
        .catalog
        .listing_by_id(id)
        .await?
        .ok_or_else(|| GuideError::NotFound(format!("Listing {id}")))
}

pub async fn get_listing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ListingWithCategory>> {
    Ok(Json(find_listing(&state, id).await?))
}

pub async fn share_listing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ShareLinks>> {
    let listing = find_listing(&state, id).await?;
    Ok(Json(share_links(state.auth.callback_base_url(), &listing)))
}

#[derive(Debug, Deserialize)]
pub struct SeasonParams {
    pub month: Option<u32>,
}

/// Season for `month`, or for the current month when omitted.
pub async fn seasonal_guide(Query(params): Query<SeasonParams>) -> Result<Json<&'static Season>> {
    let month = params.month.unwrap_or_else(|| Utc::now().month());
    season_for_month(month)
        .map(Json)
        .ok_or_else(|| GuideError::BadRequest(format!("month must be 1-12, got {month}")))
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "hill-guide",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
