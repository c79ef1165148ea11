// shop/src/pipelines/common_steps.rs

//! Pricing helpers shared by the cart and checkout pipelines.

use crate::errors::Result as AppResult;
use crate::models::{Cart, Product};
use crate::store::ProductCatalog;
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Loads the live catalog entries for every product referenced by `cart`.
/// Products that no longer exist are simply absent from the map.
#[instrument(name = "common_step::load_cart_catalog", skip(catalog, cart), fields(owner = %cart.owner, lines = cart.items.len()))]
pub async fn load_cart_catalog(catalog: &dyn ProductCatalog, cart: &Cart) -> AppResult<HashMap<Uuid, Product>> {
  let ids = cart.product_ids();
  if ids.is_empty() {
    return Ok(HashMap::new());
  }
  let products = catalog.find_products(&ids).await?;
  if products.len() < ids.len() {
    debug!(missing = ids.len() - products.len(), "Cart references products no longer in the catalog.");
  }
  Ok(products.into_iter().map(|p| (p.id, p)).collect())
}

pub fn price_map(products: &HashMap<Uuid, Product>) -> HashMap<Uuid, i64> {
  products.iter().map(|(id, p)| (*id, p.price)).collect()
}

/// Recomputes `cart.total` from live prices and returns the catalog used.
pub async fn reprice_cart(catalog: &dyn ProductCatalog, cart: &mut Cart) -> AppResult<(HashMap<Uuid, Product>, bool)> {
  let products = load_cart_catalog(catalog, cart).await?;
  let changed = cart.recompute_total(&price_map(&products));
  Ok((products, changed))
}
