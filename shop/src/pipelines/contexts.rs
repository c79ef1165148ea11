// shop/src/pipelines/contexts.rs

//! Context data carried through each pipeline run.
//! Handlers receive these wrapped in `orka::ContextData`.

use crate::models::{Cart, CartView, LineId, Order, OrderItem, Product, ShippingAddress, VariantAttrs};
use crate::state::AppState;
use std::collections::HashMap;
use uuid::Uuid;

// --- Cart ---

/// The requested cart operation and its raw, not yet validated inputs.
#[derive(Debug, Clone)]
pub enum CartCommand {
  View,
  Add {
    product_id: Uuid,
    quantity: i64,
    variant: VariantAttrs,
  },
  SetQuantity {
    line_id: LineId,
    quantity: i64,
  },
  Remove {
    line_id: LineId,
  },
  Clear,
}

impl CartCommand {
  pub fn name(&self) -> &'static str {
    match self {
      CartCommand::View => "view",
      CartCommand::Add { .. } => "add",
      CartCommand::SetQuantity { .. } => "set_quantity",
      CartCommand::Remove { .. } => "remove",
      CartCommand::Clear => "clear",
    }
  }
}

#[derive(Clone)]
pub struct CartCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub command: CartCommand,
  /// Validated quantity for `Add` and `SetQuantity`.
  pub quantity: Option<u32>,
  /// Product resolved for `Add`.
  pub product: Option<Product>,
  pub cart: Option<Cart>,
  /// Live catalog entries for the products referenced by the cart.
  pub catalog: HashMap<Uuid, Product>,
  /// Set when repricing a viewed cart changed its stored total.
  pub total_changed: bool,
  pub view: Option<CartView>,
}

impl CartCtxData {
  pub fn new(app_state: AppState, user_id: Uuid, command: CartCommand) -> Self {
    Self {
      app_state,
      user_id,
      command,
      quantity: None,
      product: None,
      cart: None,
      catalog: HashMap::new(),
      total_changed: false,
      view: None,
    }
  }
}

// --- Checkout ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
  Initiated,
  PaymentPending,
  PaymentSucceeded,
  PaymentFailed,
  OrderRecorded,
}

/// Difference between what the client claimed and what the server computed.
/// Recorded for observability only; checkout is never rejected on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalAudit {
  pub claimed: i64,
  pub snapshot_total: i64,
  /// Total of the user's stored cart at live prices, when a cart exists.
  pub live_cart_total: Option<i64>,
}

impl TotalAudit {
  pub fn is_consistent(&self) -> bool {
    self.claimed == self.snapshot_total && self.live_cart_total.map_or(true, |live| live == self.claimed)
  }
}

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub request: crate::models::CheckoutRequest,
  pub state: CheckoutState,
  pub items: Vec<OrderItem>,
  pub total_amount: i64,
  pub shipping_address: Option<ShippingAddress>,
  pub audit: Option<TotalAudit>,
  pub transaction_id: Option<String>,
  pub decline_reason: Option<String>,
  pub order: Option<Order>,
  pub cart_cleared: bool,
}

impl CheckoutCtxData {
  pub fn new(app_state: AppState, user_id: Uuid, request: crate::models::CheckoutRequest) -> Self {
    Self {
      app_state,
      user_id,
      request,
      state: CheckoutState::Initiated,
      items: Vec::new(),
      total_amount: 0,
      shipping_address: None,
      audit: None,
      transaction_id: None,
      decline_reason: None,
      order: None,
      cart_cleared: false,
    }
  }
}

// --- Accounts ---

#[derive(Clone)]
pub struct SignupCtxData {
  pub app_state: AppState,
  pub name: String,
  pub email: String,
  pub password: String,
  pub user: Option<crate::models::User>,
  pub session_token: Option<String>,
}

#[derive(Clone)]
pub struct SigninCtxData {
  pub app_state: AppState,
  pub email: String,
  pub password: String,
  pub user: Option<crate::models::User>,
  pub session_token: Option<String>,
}
