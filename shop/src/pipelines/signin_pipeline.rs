// shop/src/pipelines/signin_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::SigninCtxData;
use crate::services::auth_service;
use orka::{ContextData, Orka, Pipeline, PipelineControl};
use std::sync::Arc;
use tracing::{event, info, warn, Level};

const BAD_CREDENTIALS: &str = "Invalid email or password.";

/// Registers the user sign-in pipeline with the Orka registry.
pub fn register_signin_pipeline(orka_instance: &Arc<Orka<AppError>>) {
  let mut signin_p = Pipeline::<SigninCtxData, AppError>::new(&[
    ("validate_signin_input", false, None),
    ("fetch_user_by_email", false, None),
    ("verify_user_password", false, None),
    ("issue_session_token", false, None),
  ]);

  signin_p.on_root("validate_signin_input", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      guard.email = guard.email.trim().to_lowercase();

      event!(Level::DEBUG, email = %guard.email, "Validating sign-in input.");
      if guard.email.is_empty() || !guard.email.contains('@') {
        return Err(AppError::InvalidArgument("Valid email is required.".to_string()));
      }
      if guard.password.is_empty() {
        return Err(AppError::InvalidArgument("Password is required.".to_string()));
      }
      Ok(PipelineControl::Continue)
    })
  });

  signin_p.on_root("fetch_user_by_email", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (email, users) = {
        let guard = ctx_data.read();
        (guard.email.clone(), guard.app_state.users.clone())
      };

      let Some(user) = users.find_user_by_email(&email).await? else {
        warn!(%email, "Sign-in for unknown email.");
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
      };
      ctx_data.write().user = Some(user);
      Ok(PipelineControl::Continue)
    })
  });

  signin_p.on_root("verify_user_password", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      let user = guard
        .user
        .as_ref()
        .ok_or_else(|| AppError::Internal("User not loaded before password check".to_string()))?;

      if !auth_service::verify_password(&user.password_hash, &guard.password)? {
        warn!(user_id = %user.id, "Sign-in with a wrong password.");
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
      }
      Ok(PipelineControl::Continue)
    })
  });

  signin_p.on_root("issue_session_token", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let user_id = guard
        .user
        .as_ref()
        .map(|u| u.id)
        .ok_or_else(|| AppError::Internal("No user to issue a token for".to_string()))?;
      let token = guard.app_state.tokens.issue(user_id)?;
      guard.session_token = Some(token);
      info!(%user_id, "User signed in.");
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  orka_instance.register_pipeline(signin_p);
  tracing::info!("Sign-in pipeline registered.");
}
