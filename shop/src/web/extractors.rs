// shop/src/web/extractors.rs

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub const TOKEN_COOKIE: &str = "token";

/// The caller behind a valid session token whose account still exists.
/// Protected handlers take it as their first argument so a missing credential
/// is rejected before any body or path is parsed.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
}

/// Cookie first, then `Authorization: Bearer`.
fn session_token(req: &HttpRequest) -> Option<String> {
  if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
    let value = cookie.value().trim();
    if !value.is_empty() {
      return Some(value.to_string());
    }
  }
  req
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(|t| t.trim().to_string())
    .filter(|t| !t.is_empty())
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = req.app_data::<web::Data<AppState>>().cloned();
    let token = session_token(req);

    Box::pin(async move {
      let state = state.ok_or_else(|| AppError::Internal("AppState is not configured".to_string()))?;
      let token = token.ok_or_else(|| {
        warn!("Request without a session token.");
        AppError::Unauthorized("Not authorized, no token.".to_string())
      })?;

      let user_id = state.tokens.verify(&token)?;
      if state.users.find_user(user_id).await?.is_none() {
        warn!(%user_id, "Session token for a user that no longer exists.");
        return Err(AppError::Unauthorized("Not authorized, user not found.".to_string()));
      }
      Ok(AuthenticatedUser { user_id })
    })
  }
}
