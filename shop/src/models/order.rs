// shop/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
  Pending,
  Paid,
  Failed,
}

impl PaymentStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentStatus::Pending => "Pending",
      PaymentStatus::Paid => "Paid",
      PaymentStatus::Failed => "Failed",
    }
  }
}

impl fmt::Display for PaymentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for PaymentStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Pending" => Ok(PaymentStatus::Pending),
      "Paid" => Ok(PaymentStatus::Paid),
      "Failed" => Ok(PaymentStatus::Failed),
      other => Err(format!("unknown payment status '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Processing => "Processing",
      OrderStatus::Shipped => "Shipped",
      OrderStatus::Delivered => "Delivered",
      OrderStatus::Cancelled => "Cancelled",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Processing" => Ok(OrderStatus::Processing),
      "Shipped" => Ok(OrderStatus::Shipped),
      "Delivered" => Ok(OrderStatus::Delivered),
      "Cancelled" => Ok(OrderStatus::Cancelled),
      other => Err(format!("unknown order status '{}'", other)),
    }
  }
}

/// Snapshot of a purchased line. Name and price are frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  pub product_id: Uuid,
  pub name: String,
  pub price: i64,
  pub quantity: u32,
  #[serde(default)]
  pub size: Option<String>,
  #[serde(default)]
  pub scent: Option<String>,
}

impl OrderItem {
  pub fn line_total(&self) -> i64 {
    self.price.saturating_mul(i64::from(self.quantity))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
  pub name: String,
  pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub user: Uuid,
  pub items: Vec<OrderItem>,
  pub total_amount: i64,
  pub shipping_address: ShippingAddress,
  pub transaction_id: String,
  pub payment_status: PaymentStatus,
  pub order_status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Everything needed to record an order. Ids and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewOrder {
  pub user: Uuid,
  pub items: Vec<OrderItem>,
  pub total_amount: i64,
  pub shipping_address: ShippingAddress,
  pub transaction_id: String,
  pub payment_status: PaymentStatus,
  pub order_status: OrderStatus,
}

/// Checkout body as sent by the storefront. Every field is optional at the
/// wire level so that missing data surfaces as `InvalidArgument` rather than a
/// generic deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub phone: Option<String>,
  #[serde(default)]
  pub cart_items: Option<Vec<CheckoutItemInput>>,
  #[serde(default)]
  pub total_amount: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItemInput {
  #[serde(default, alias = "product")]
  pub product_id: Option<Uuid>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub price: Option<i64>,
  #[serde(default)]
  pub quantity: Option<i64>,
  #[serde(default)]
  pub size: Option<String>,
  #[serde(default)]
  pub scent: Option<String>,
}
