// shop/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::VariantAttrs;
use crate::services::cart_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

fn default_quantity() -> i64 {
  1
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequestPayload {
  pub product_id: Uuid,
  #[serde(default = "default_quantity")]
  pub quantity: i64,
  #[serde(default)]
  pub size: Option<String>,
  #[serde(default)]
  pub scent: Option<String>,
  #[serde(default)]
  pub options: BTreeMap<String, String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateQuantityPayload {
  pub quantity: i64,
}

#[instrument(name = "handler::get_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_cart_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
  let view = cart_service::get_or_create_cart(&app_state, auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, product_id = %req_payload.product_id, quantity = req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let variant = VariantAttrs::new(payload.size, payload.scent, payload.options);
  let view = cart_service::add_item(
    &app_state,
    auth_user.user_id,
    payload.product_id,
    payload.quantity,
    variant,
  )
  .await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(
    name = "handler::update_cart_item",
    skip(app_state, path, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, line_id = %path.as_ref())
)]
pub async fn update_cart_item_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateQuantityPayload>,
) -> Result<HttpResponse, AppError> {
  let view = cart_service::update_item_quantity(
    &app_state,
    auth_user.user_id,
    path.into_inner(),
    req_payload.quantity,
  )
  .await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Cart item quantity updated.", "cart": view })))
}

#[instrument(
    name = "handler::remove_cart_item",
    skip(app_state, path, auth_user),
    fields(user_id = %auth_user.user_id, line_id = %path.as_ref())
)]
pub async fn remove_cart_item_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let view = cart_service::remove_item(&app_state, auth_user.user_id, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Item successfully removed from cart.", "cart": view })))
}

#[instrument(name = "handler::clear_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn clear_cart_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
  let view = cart_service::clear_cart(&app_state, auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Cart successfully cleared.", "cart": view })))
}
