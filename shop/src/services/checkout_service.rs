// shop/src/services/checkout_service.rs

use crate::errors::{AppError, Result as AppResult};
use crate::models::{CheckoutRequest, Order};
use crate::pipelines::contexts::{CheckoutCtxData, CheckoutState, TotalAudit};
use crate::state::AppState;
use orka::{ContextData, PipelineResult};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
  pub order: Order,
  pub transaction_id: String,
  /// Present when the audit step ran.
  pub total_audit: Option<TotalAudit>,
  /// False when the order was recorded but emptying the cart failed.
  pub cart_cleared: bool,
}

/// Charges the mock gateway and, on approval, records the order and empties the cart.
/// A declined payment leaves every store untouched and maps to `PaymentDeclined`.
#[instrument(name = "checkout_service::checkout", skip(state, request))]
pub async fn checkout(state: &AppState, user_id: Uuid, request: CheckoutRequest) -> AppResult<CheckoutReceipt> {
  let ctx = ContextData::new(CheckoutCtxData::new(state.clone(), user_id, request));

  let result = state.orka_instance.run(ctx.clone()).await?;
  let final_ctx = ctx.read().clone();

  match (result, final_ctx.state) {
    (PipelineResult::Completed, CheckoutState::OrderRecorded) => {
      let (Some(order), Some(transaction_id)) = (final_ctx.order, final_ctx.transaction_id) else {
        return Err(AppError::Internal("Checkout completed without an order".to_string()));
      };
      if !final_ctx.cart_cleared {
        warn!(%user_id, order_id = %order.id, "Order recorded but the cart could not be cleared.");
      }
      info!(%user_id, order_id = %order.id, "Checkout completed.");
      Ok(CheckoutReceipt {
        order,
        transaction_id,
        total_audit: final_ctx.audit,
        cart_cleared: final_ctx.cart_cleared,
      })
    }
    (PipelineResult::Stopped, CheckoutState::PaymentFailed) => Err(AppError::PaymentDeclined(
      final_ctx
        .decline_reason
        .unwrap_or_else(|| "Payment failed due to a mock error.".to_string()),
    )),
    (result, checkout_state) => {
      error!(%user_id, ?result, ?checkout_state, "Checkout pipeline ended in an unexpected state.");
      Err(AppError::Internal("Checkout did not complete.".to_string()))
    }
  }
}
