// shop/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::CheckoutRequest;
use crate::services::checkout_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(
    name = "handler::checkout",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user_id)
)]
pub async fn checkout_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  req_payload: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
  let receipt = checkout_service::checkout(&app_state, auth_user.user_id, req_payload.into_inner()).await?;

  info!(order_id = %receipt.order.id, "Checkout succeeded.");
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "message": format!("Payment successful! Order {} placed.", receipt.order.id),
      "transactionId": receipt.transaction_id,
      "order": receipt.order,
  })))
}
