use crate::cart::{Cart, CartItem, OrderSummary};
use crate::error::{GuideError, Result};
use crate::metrics::ServerMetrics;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItem {
    pub listing_id: i64,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub unit_price_paise: u64,
}

fn one() -> u32 {
    1
}

pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    Path(cart_id): Path<Uuid>,
) -> Result<Json<Cart>> {
    Ok(Json(state.carts.get(cart_id)?))
}

/// Adds a catalog listing to the cart; the line name comes from the catalog.
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(cart_id): Path<Uuid>,
    Json(body): Json<AddItem>,
) -> Result<Json<Cart>> {
    if body.quantity == 0 {
        return Err(GuideError::BadRequest("quantity must be at least 1".to_string()));
    }

    let listing = state
        .catalog
        .listing_by_id(body.listing_id)
        .await?
        .ok_or_else(|| GuideError::NotFound(format!("Listing {}", body.listing_id)))?;

    let cart = state.carts.add(
        cart_id,
        CartItem {
            listing_id: listing.listing.id,
            name: listing.listing.name,
            unit_price_paise: body.unit_price_paise,
            quantity: body.quantity,
        },
    )?;
    Ok(Json(cart))
}

pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path((cart_id, listing_id)): Path<(Uuid, i64)>,
) -> Result<Json<Cart>> {
    Ok(Json(state.carts.remove(cart_id, listing_id)?))
}

pub async fn checkout(
    State(state): State<Arc<AppState>>,
    Path(cart_id): Path<Uuid>,
) -> Result<Json<OrderSummary>> {
    let order = state.carts.checkout(cart_id)?;
    ServerMetrics::record_checkout();
    info!(order = %order.order_id, total_paise = order.total_paise, "Mock order placed");
    Ok(Json(order))
}
