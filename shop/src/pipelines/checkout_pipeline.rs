// shop/src/pipelines/checkout_pipeline.rs

use crate::errors::AppError;
use crate::models::{CheckoutItemInput, NewOrder, OrderItem, OrderStatus, PaymentStatus, ShippingAddress};
use crate::pipelines::common_steps;
use crate::pipelines::contexts::{CheckoutCtxData, CheckoutState, TotalAudit};
use crate::services::payment_mock::{PaymentOutcome, PaymentRequest};
use orka::{ContextData, Orka, Pipeline, PipelineControl};
use std::sync::Arc;
use tracing::{error, info, warn};

const MISSING_CHECKOUT_DATA: &str = "Missing required customer info or empty cart data.";

fn non_blank(value: &Option<String>) -> Option<String> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn snapshot_item(index: usize, input: &CheckoutItemInput) -> Result<OrderItem, AppError> {
  let invalid = |what: &str| AppError::InvalidArgument(format!("Cart item {}: {}", index, what));

  let product_id = input.product_id.ok_or_else(|| invalid("product id is required."))?;
  let name = non_blank(&input.name).ok_or_else(|| invalid("name is required."))?;
  let price = input.price.filter(|p| *p >= 0).ok_or_else(|| invalid("price must be a non-negative number."))?;
  let quantity = input
    .quantity
    .filter(|q| *q >= 1)
    .and_then(|q| u32::try_from(q).ok())
    .ok_or_else(|| invalid("Quantity must be a positive number."))?;

  Ok(OrderItem {
    product_id,
    name,
    price,
    quantity,
    size: non_blank(&input.size),
    scent: non_blank(&input.scent),
  })
}

pub fn register_checkout_pipeline(orka_registry: &Arc<Orka<AppError>>) {
  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    ("validate_checkout_input", false, None),
    ("audit_claimed_total", true, None),
    ("process_mock_payment", false, None),
    ("create_order_record", false, None),
    ("clear_cart_after_order", true, None),
  ]);

  p.on_root("validate_checkout_input", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let request = { ctx_data.read().request.clone() };

      let name = non_blank(&request.name);
      let phone = non_blank(&request.phone);
      let items = request.cart_items.unwrap_or_default();
      let (Some(name), Some(phone), Some(total)) = (name, phone, request.total_amount) else {
        warn!("Checkout rejected: missing customer info or total.");
        return Err(AppError::InvalidArgument(MISSING_CHECKOUT_DATA.to_string()));
      };
      if items.is_empty() {
        warn!("Checkout rejected: empty cart snapshot.");
        return Err(AppError::InvalidArgument(MISSING_CHECKOUT_DATA.to_string()));
      }
      if total < 0 {
        return Err(AppError::InvalidArgument("Total amount must not be negative.".to_string()));
      }

      let snapshot = items
        .iter()
        .enumerate()
        .map(|(i, item)| snapshot_item(i, item))
        .collect::<Result<Vec<_>, _>>()?;

      let mut guard = ctx_data.write();
      guard.items = snapshot;
      guard.total_amount = total;
      guard.shipping_address = Some(ShippingAddress { name, phone });
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // The claimed total is accepted as-is; mismatches are only reported.
  p.on_root("audit_claimed_total", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (user_id, claimed, snapshot_total, carts, catalog) = {
        let guard = ctx_data.read();
        let snapshot_total = guard.items.iter().map(OrderItem::line_total).fold(0i64, i64::saturating_add);
        (
          guard.user_id,
          guard.total_amount,
          snapshot_total,
          guard.app_state.carts.clone(),
          guard.app_state.catalog.clone(),
        )
      };

      let live_cart_total = match carts.find_cart(user_id).await? {
        Some(mut cart) => {
          common_steps::reprice_cart(catalog.as_ref(), &mut cart).await?;
          Some(cart.total)
        }
        None => None,
      };

      let audit = TotalAudit {
        claimed,
        snapshot_total,
        live_cart_total,
      };
      if !audit.is_consistent() {
        warn!(
          %user_id,
          claimed,
          snapshot_total,
          live_cart_total = ?live_cart_total,
          "Claimed checkout total differs from the server-side computation."
        );
      }
      ctx_data.write().audit = Some(audit);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("process_mock_payment", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (request, gateway) = {
        let mut guard = ctx_data.write();
        guard.state = CheckoutState::PaymentPending;
        let phone = guard
          .shipping_address
          .as_ref()
          .map(|a| a.phone.clone())
          .unwrap_or_default();
        let request = PaymentRequest {
          user_id: guard.user_id,
          amount: guard.total_amount,
          phone,
        };
        (request, guard.app_state.payments.clone())
      };

      let outcome = gateway.charge(&request).await?;

      let mut guard = ctx_data.write();
      match outcome {
        PaymentOutcome::Approved { transaction_id } => {
          info!(user_id = %request.user_id, %transaction_id, "Payment approved.");
          guard.state = CheckoutState::PaymentSucceeded;
          guard.transaction_id = Some(transaction_id);
          Ok::<_, AppError>(PipelineControl::Continue)
        }
        PaymentOutcome::Declined { reason } => {
          warn!(user_id = %request.user_id, %reason, "Payment declined; no order recorded.");
          guard.state = CheckoutState::PaymentFailed;
          guard.decline_reason = Some(reason);
          Ok(PipelineControl::Stop)
        }
      }
    })
  });

  p.on_root("create_order_record", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (new_order, orders) = {
        let guard = ctx_data.read();
        let (Some(transaction_id), Some(shipping_address)) =
          (guard.transaction_id.clone(), guard.shipping_address.clone())
        else {
          return Err(AppError::Internal(
            "Order creation reached without an approved payment".to_string(),
          ));
        };
        let new_order = NewOrder {
          user: guard.user_id,
          items: guard.items.clone(),
          total_amount: guard.total_amount,
          shipping_address,
          transaction_id,
          payment_status: PaymentStatus::Paid,
          order_status: OrderStatus::Processing,
        };
        (new_order, guard.app_state.orders.clone())
      };

      let order = orders.insert_order(new_order).await.map_err(|e| {
        error!(error = %e, "Payment succeeded but the order could not be recorded.");
        AppError::from(e)
      })?;
      info!(order_id = %order.id, transaction_id = %order.transaction_id, "Order recorded.");

      let mut guard = ctx_data.write();
      guard.order = Some(order);
      guard.state = CheckoutState::OrderRecorded;
      Ok(PipelineControl::Continue)
    })
  });

  p.on_root("clear_cart_after_order", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (user_id, carts) = {
        let guard = ctx_data.read();
        (guard.user_id, guard.app_state.carts.clone())
      };

      carts.clear_cart(user_id).await?;
      ctx_data.write().cart_cleared = true;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  orka_registry.register_pipeline(p);
  tracing::info!("Checkout pipeline registered.");
}

#[cfg(test)]
mod tests {
  use super::*;
  use uuid::Uuid;

  fn item() -> CheckoutItemInput {
    CheckoutItemInput {
      product_id: Some(Uuid::new_v4()),
      name: Some("Candle".to_string()),
      price: Some(1800),
      quantity: Some(2),
      size: Some(" ".to_string()),
      scent: Some("Cedar".to_string()),
    }
  }

  #[test]
  fn snapshot_item_normalises_variants() {
    let snap = snapshot_item(0, &item()).unwrap();
    assert_eq!(snap.size, None);
    assert_eq!(snap.scent.as_deref(), Some("Cedar"));
    assert_eq!(snap.line_total(), 3600);
  }

  #[test]
  fn snapshot_item_rejects_bad_fields() {
    let mut no_id = item();
    no_id.product_id = None;
    assert!(matches!(snapshot_item(0, &no_id), Err(AppError::InvalidArgument(_))));

    let mut zero_qty = item();
    zero_qty.quantity = Some(0);
    assert!(matches!(snapshot_item(0, &zero_qty), Err(AppError::InvalidArgument(_))));

    let mut negative_price = item();
    negative_price.price = Some(-1);
    assert!(matches!(snapshot_item(0, &negative_price), Err(AppError::InvalidArgument(_))));

    let mut blank_name = item();
    blank_name.name = Some("   ".to_string());
    assert!(matches!(snapshot_item(0, &blank_name), Err(AppError::InvalidArgument(_))));
  }
}
