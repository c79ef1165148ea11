// shop/src/services/catalog_seed.rs

//! Loads catalog entries from a JSON file into the product store.

use crate::errors::{AppError, Result as AppResult};
use crate::models::NewProduct;
use crate::store::{ProductCatalog, StoreError};
use chrono::Utc;
use std::path::Path;
use tracing::{info, instrument, warn};

pub fn parse_seed(json: &str) -> AppResult<Vec<NewProduct>> {
  serde_json::from_str(json).map_err(|e| AppError::Config(format!("Invalid product seed file: {}", e)))
}

/// Inserts every entry whose name is not already in the catalog.
/// Returns the number of products inserted.
pub async fn seed_products(catalog: &dyn ProductCatalog, entries: Vec<NewProduct>) -> AppResult<usize> {
  let mut inserted = 0;
  for entry in entries {
    if entry.price < 0 {
      warn!(name = %entry.name, "Skipping seed product with a negative price.");
      continue;
    }
    if catalog.find_product_by_name(entry.name.trim()).await?.is_some() {
      continue;
    }
    match catalog.insert_product(entry.into_product(Utc::now())).await {
      Ok(product) => {
        info!(product_id = %product.id, name = %product.name, "Seeded product.");
        inserted += 1;
      }
      // Another instance seeded it first.
      Err(StoreError::Duplicate { .. }) => {}
      Err(e) => return Err(e.into()),
    }
  }
  Ok(inserted)
}

#[instrument(name = "catalog_seed::seed_from_file", skip(catalog))]
pub async fn seed_from_file(catalog: &dyn ProductCatalog, path: &Path) -> AppResult<usize> {
  let raw = tokio::fs::read_to_string(path)
    .await
    .map_err(|e| AppError::Config(format!("Cannot read product seed file {}: {}", path.display(), e)))?;
  let inserted = seed_products(catalog, parse_seed(&raw)?).await?;
  info!(inserted, "Catalog seeding finished.");
  Ok(inserted)
}
