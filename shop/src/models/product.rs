// shop/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_IMAGE: &str = "placeholder.jpg";
pub const DEFAULT_STOCK_COUNT: i32 = 10;

/// Catalog record. `price` is in minor currency units.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub description: String,
  #[sqlx(rename = "price_cents")]
  pub price: i64,
  pub image: String,
  /// Free-form variant choices offered for this product (sizes, scents, ...).
  pub options: serde_json::Value,
  pub category: String,
  pub stock_count: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// The subset of a product shown next to a cart line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
  pub id: Uuid,
  pub name: String,
  pub price: i64,
  pub image: String,
  pub category: String,
}

impl From<&Product> for ProductSummary {
  fn from(p: &Product) -> Self {
    Self {
      id: p.id,
      name: p.name.clone(),
      price: p.price,
      image: p.image.clone(),
      category: p.category.clone(),
    }
  }
}

/// Seed file entry. Missing fields fall back to catalog defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
  #[serde(default)]
  pub id: Option<Uuid>,
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub price: i64,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub options: Option<serde_json::Value>,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub stock_count: Option<i32>,
}

impl NewProduct {
  pub fn into_product(self, now: DateTime<Utc>) -> Product {
    Product {
      id: self.id.unwrap_or_else(Uuid::new_v4),
      name: self.name.trim().to_string(),
      description: self.description,
      price: self.price,
      image: self
        .image
        .filter(|i| !i.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
      options: self.options.unwrap_or_else(|| serde_json::json!({})),
      category: self.category,
      stock_count: self.stock_count.unwrap_or(DEFAULT_STOCK_COUNT),
      created_at: now,
      updated_at: now,
    }
  }
}
