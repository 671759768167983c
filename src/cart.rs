//! Mock shopping cart. Nothing is charged; checkout only totals and empties the cart.

use crate::error::{GuideError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub listing_id: i64,
    pub name: String,
    pub unit_price_paise: u64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_id: Uuid,
    pub items: Vec<CartItem>,
    pub item_count: u32,
    pub total_paise: u64,
    pub message: String,
}

impl Cart {
    /// Add `quantity` of a listing. An existing line has its quantity increased.
    pub fn add(&mut self, item: CartItem) {
        if item.quantity == 0 {
            return;
        }
        match self.items.iter_mut().find(|i| i.listing_id == item.listing_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => self.items.push(item),
        }
    }

    /// Set a line's quantity; zero removes the line. Returns false if the listing is not in the cart.
    pub fn set_quantity(&mut self, listing_id: i64, quantity: u32) -> bool {
        let Some(pos) = self.items.iter().position(|i| i.listing_id == listing_id) else {
            return false;
        };
        if quantity == 0 {
            self.items.remove(pos);
        } else {
            self.items[pos].quantity = quantity;
        }
        true
    }

    pub fn remove(&mut self, listing_id: i64) -> bool {
        self.set_quantity(listing_id, 0)
    }

    /// Total quantity across lines; `None` when it does not fit in a `u32`.
    pub fn item_count(&self) -> Option<u32> {
        self.items
            .iter()
            .try_fold(0u32, |acc, i| acc.checked_add(i.quantity))
    }

    /// Sum of price times quantity; `None` when it does not fit in a `u64`.
    pub fn total_paise(&self) -> Option<u64> {
        self.items.iter().try_fold(0u64, |acc, i| {
            i.unit_price_paise
                .checked_mul(u64::from(i.quantity))
                .and_then(|line| acc.checked_add(line))
        })
    }

    /// Item count and total, or `BadRequest` when either overflows.
    pub fn totals(&self) -> Result<(u32, u64)> {
        match (self.item_count(), self.total_paise()) {
            (Some(count), Some(total)) => Ok((count, total)),
            _ => Err(GuideError::BadRequest("cart total out of range".to_string())),
        }
    }
}

/// Carts keyed by a client-chosen id. Only adding an item creates an entry.
#[derive(Default)]
pub struct CartStore {
    carts: Mutex<HashMap<Uuid, Cart>>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn carts(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Cart>>> {
        self.carts.lock().map_err(|e| GuideError::Storage {
            message: format!("cart lock poisoned: {e}"),
        })
    }

    /// Unknown ids read as an empty cart.
    pub fn get(&self, id: Uuid) -> Result<Cart> {
        Ok(self.carts()?.get(&id).cloned().unwrap_or_default())
    }

    /// Rejects the item, leaving the cart untouched, if the new totals would overflow.
    pub fn add(&self, id: Uuid, item: CartItem) -> Result<Cart> {
        let mut carts = self.carts()?;
        let mut updated = carts.get(&id).cloned().unwrap_or_default();
        updated.add(item);
        updated.totals()?;

        if updated.items.is_empty() {
            return Ok(updated);
        }
        carts.insert(id, updated.clone());
        Ok(updated)
    }

    pub fn remove(&self, id: Uuid, listing_id: i64) -> Result<Cart> {
        let mut carts = self.carts()?;
        let cart = carts
            .get_mut(&id)
            .filter(|cart| cart.items.iter().any(|i| i.listing_id == listing_id))
            .ok_or_else(|| GuideError::NotFound(format!("Listing {listing_id} in cart")))?;
        cart.remove(listing_id);

        let remaining = cart.clone();
        if remaining.items.is_empty() {
            carts.remove(&id);
        }
        Ok(remaining)
    }

    /// Totals the cart and drops it. On error the cart is kept as it was.
    pub fn checkout(&self, id: Uuid) -> Result<OrderSummary> {
        let mut carts = self.carts()?;
        let cart = carts
            .get(&id)
            .filter(|cart| !cart.items.is_empty())
            .ok_or_else(|| GuideError::BadRequest("Cart is empty".to_string()))?;
        let (item_count, total_paise) = cart.totals()?;

        let items = carts.remove(&id).map(|c| c.items).unwrap_or_default();
        Ok(OrderSummary {
            order_id: Uuid::new_v4(),
            items,
            item_count,
            total_paise,
            message: "Order placed successfully! (demo checkout, no payment taken)".to_string(),
        })
    }

    /// Number of carts currently held.
    pub fn len(&self) -> Result<usize> {
        Ok(self.carts()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
