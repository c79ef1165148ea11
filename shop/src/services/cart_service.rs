// shop/src/services/cart_service.rs

//! Entry points for the five cart operations. Each one runs the cart pipeline
//! with a different command and returns the enriched view.

use crate::errors::{AppError, Result as AppResult};
use crate::models::{CartView, LineId, VariantAttrs};
use crate::pipelines::contexts::{CartCommand, CartCtxData};
use crate::state::AppState;
use orka::{ContextData, PipelineResult};
use tracing::{error, instrument};
use uuid::Uuid;

async fn run_cart_pipeline(state: &AppState, user_id: Uuid, command: CartCommand) -> AppResult<CartView> {
  let ctx = ContextData::new(CartCtxData::new(state.clone(), user_id, command));

  match state.orka_instance.run(ctx.clone()).await? {
    PipelineResult::Completed => ctx
      .write()
      .view
      .take()
      .ok_or_else(|| AppError::Internal("Cart pipeline completed without a view".to_string())),
    PipelineResult::Stopped => {
      error!(%user_id, "Cart pipeline stopped unexpectedly.");
      Err(AppError::Internal("Cart operation did not complete.".to_string()))
    }
  }
}

/// Returns the user's cart, creating an empty one on first access.
#[instrument(name = "cart_service::get_or_create_cart", skip(state))]
pub async fn get_or_create_cart(state: &AppState, user_id: Uuid) -> AppResult<CartView> {
  run_cart_pipeline(state, user_id, CartCommand::View).await
}

#[instrument(name = "cart_service::add_item", skip(state, variant))]
pub async fn add_item(
  state: &AppState,
  user_id: Uuid,
  product_id: Uuid,
  quantity: i64,
  variant: VariantAttrs,
) -> AppResult<CartView> {
  run_cart_pipeline(
    state,
    user_id,
    CartCommand::Add {
      product_id,
      quantity,
      variant,
    },
  )
  .await
}

#[instrument(name = "cart_service::update_item_quantity", skip(state))]
pub async fn update_item_quantity(
  state: &AppState,
  user_id: Uuid,
  line_id: LineId,
  quantity: i64,
) -> AppResult<CartView> {
  run_cart_pipeline(state, user_id, CartCommand::SetQuantity { line_id, quantity }).await
}

#[instrument(name = "cart_service::remove_item", skip(state))]
pub async fn remove_item(state: &AppState, user_id: Uuid, line_id: LineId) -> AppResult<CartView> {
  run_cart_pipeline(state, user_id, CartCommand::Remove { line_id }).await
}

/// Idempotent. Creates the cart when missing.
#[instrument(name = "cart_service::clear_cart", skip(state))]
pub async fn clear_cart(state: &AppState, user_id: Uuid) -> AppResult<CartView> {
  run_cart_pipeline(state, user_id, CartCommand::Clear).await
}
