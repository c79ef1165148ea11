// shop/src/models/cart.rs

//! The per-user cart document and its in-memory mutations.
//!
//! Lines hold only a product reference, a quantity and variant attributes.
//! Names and prices always come from the live catalog, so the stored `total`
//! is a cache that is recomputed on every read and write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use uuid::Uuid;

use super::product::{Product, ProductSummary};

/// Stable identifier of a cart line, assigned when the line is first added.
pub type LineId = Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
  #[error("Quantity must be a positive number.")]
  InvalidQuantity,

  #[error("Quantity is too large.")]
  QuantityOverflow,

  #[error("Item not found in cart.")]
  LineNotFound(LineId),
}

/// Variant selection of a line. Empty strings are treated as "not chosen".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantAttrs {
  #[serde(default)]
  pub size: Option<String>,
  #[serde(default)]
  pub scent: Option<String>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub options: BTreeMap<String, String>,
}

fn normalize(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl VariantAttrs {
  pub fn new(size: Option<String>, scent: Option<String>, options: BTreeMap<String, String>) -> Self {
    Self {
      size: normalize(size),
      scent: normalize(scent),
      options: options
        .into_iter()
        .filter_map(|(k, v)| {
          let key = k.trim().to_string();
          normalize(Some(v)).filter(|_| !key.is_empty()).map(|v| (key, v))
        })
        .collect(),
    }
  }

  pub fn normalized(self) -> Self {
    Self::new(self.size, self.scent, self.options)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
  pub id: LineId,
  pub product_id: Uuid,
  pub quantity: u32,
  #[serde(flatten)]
  pub variant: VariantAttrs,
}

impl CartLine {
  /// Composite identity: same product and identical variant attributes.
  pub fn same_item(&self, product_id: Uuid, variant: &VariantAttrs) -> bool {
    self.product_id == product_id && &self.variant == variant
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
  pub owner: Uuid,
  pub items: Vec<CartLine>,
  /// Cached sum of live price times quantity, in minor units.
  pub total: i64,
  /// Optimistic concurrency token, bumped by every successful save.
  pub version: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Cart {
  pub fn new(owner: Uuid, now: DateTime<Utc>) -> Self {
    Self {
      owner,
      items: Vec::new(),
      total: 0,
      version: 0,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn line(&self, line_id: LineId) -> Option<&CartLine> {
    self.items.iter().find(|l| l.id == line_id)
  }

  /// Adds `quantity` of a product. A line with the same composite identity is
  /// incremented; otherwise a new line is appended. Returns the affected line id.
  pub fn add_line(&mut self, product_id: Uuid, quantity: u32, variant: VariantAttrs) -> Result<LineId, CartError> {
    if quantity == 0 {
      return Err(CartError::InvalidQuantity);
    }
    let variant = variant.normalized();

    if let Some(existing) = self.items.iter_mut().find(|l| l.same_item(product_id, &variant)) {
      existing.quantity = existing
        .quantity
        .checked_add(quantity)
        .ok_or(CartError::QuantityOverflow)?;
      return Ok(existing.id);
    }

    let line = CartLine {
      id: Uuid::new_v4(),
      product_id,
      quantity,
      variant,
    };
    let id = line.id;
    self.items.push(line);
    Ok(id)
  }

  /// Sets the quantity of one line to an absolute value.
  pub fn set_quantity(&mut self, line_id: LineId, quantity: u32) -> Result<(), CartError> {
    if quantity == 0 {
      return Err(CartError::InvalidQuantity);
    }
    let line = self
      .items
      .iter_mut()
      .find(|l| l.id == line_id)
      .ok_or(CartError::LineNotFound(line_id))?;
    line.quantity = quantity;
    Ok(())
  }

  /// Removes one line. An unchanged line count means the id was not present.
  pub fn remove_line(&mut self, line_id: LineId) -> Result<(), CartError> {
    let before = self.items.len();
    self.items.retain(|l| l.id != line_id);
    if self.items.len() == before {
      return Err(CartError::LineNotFound(line_id));
    }
    Ok(())
  }

  pub fn clear(&mut self) {
    self.items.clear();
    self.total = 0;
  }

  /// Recomputes `total` from `prices` (product id to live price). Lines whose
  /// product is missing count as zero. Returns whether the total changed.
  pub fn recompute_total(&mut self, prices: &HashMap<Uuid, i64>) -> bool {
    let total = self
      .items
      .iter()
      .map(|l| line_total(prices.get(&l.product_id).copied(), l.quantity))
      .fold(0i64, i64::saturating_add);
    let changed = total != self.total;
    self.total = total;
    changed
  }

  /// Total number of units across all lines.
  pub fn item_count(&self) -> u64 {
    self.items.iter().map(|l| u64::from(l.quantity)).sum()
  }

  pub fn product_ids(&self) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = self.items.iter().map(|l| l.product_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
  }
}

fn line_total(price: Option<i64>, quantity: u32) -> i64 {
  price.unwrap_or(0).saturating_mul(i64::from(quantity))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
  pub id: LineId,
  pub product_id: Uuid,
  /// `None` when the product has been removed from the catalog.
  pub product: Option<ProductSummary>,
  pub quantity: u32,
  pub size: Option<String>,
  pub scent: Option<String>,
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub options: BTreeMap<String, String>,
  pub line_total: i64,
}

/// A cart enriched with live catalog data, as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
  pub user: Uuid,
  pub items: Vec<CartLineView>,
  pub total: i64,
  pub item_count: u64,
  pub version: i64,
  pub updated_at: DateTime<Utc>,
}

impl CartView {
  pub fn build(cart: &Cart, catalog: &HashMap<Uuid, Product>) -> Self {
    let items = cart
      .items
      .iter()
      .map(|line| {
        let product = catalog.get(&line.product_id);
        CartLineView {
          id: line.id,
          product_id: line.product_id,
          product: product.map(ProductSummary::from),
          quantity: line.quantity,
          size: line.variant.size.clone(),
          scent: line.variant.scent.clone(),
          options: line.variant.options.clone(),
          line_total: line_total(product.map(|p| p.price), line.quantity),
        }
      })
      .collect();

    Self {
      user: cart.owner,
      items,
      total: cart.total,
      item_count: cart.item_count(),
      version: cart.version,
      updated_at: cart.updated_at,
    }
  }
}
