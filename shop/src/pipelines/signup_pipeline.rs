// shop/src/pipelines/signup_pipeline.rs

use crate::errors::AppError;
use crate::models::NewUser;
use crate::pipelines::contexts::SignupCtxData;
use crate::services::auth_service;
use crate::store::StoreError;
use orka::{ContextData, Orka, Pipeline, PipelineControl};
use std::sync::Arc;
use tracing::{event, info, warn, Level};

pub const MIN_PASSWORD_LEN: usize = 6;
const EMAIL_TAKEN: &str = "User already exists with this email address.";

/// Registers the user sign-up pipeline with the Orka registry.
pub fn register_signup_pipeline(orka_instance: &Arc<Orka<AppError>>) {
  let mut signup_p = Pipeline::<SignupCtxData, AppError>::new(&[
    ("validate_signup_input", false, None),
    ("check_existing_user", false, None),
    ("create_user", false, None),
    ("issue_session_token", false, None),
  ]);

  signup_p.on_root("validate_signup_input", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      guard.name = guard.name.trim().to_string();
      guard.email = guard.email.trim().to_lowercase();

      event!(Level::DEBUG, email = %guard.email, "Validating signup input.");
      if guard.name.is_empty() {
        return Err(AppError::InvalidArgument("Name is required.".to_string()));
      }
      if guard.email.is_empty() || !guard.email.contains('@') {
        warn!("Invalid email format provided for signup.");
        return Err(AppError::InvalidArgument("Valid email is required.".to_string()));
      }
      if guard.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidArgument(format!(
          "Password must be at least {} characters long.",
          MIN_PASSWORD_LEN
        )));
      }
      Ok(PipelineControl::Continue)
    })
  });

  signup_p.on_root("check_existing_user", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let (email, users) = {
        let guard = ctx_data.read();
        (guard.email.clone(), guard.app_state.users.clone())
      };

      if users.find_user_by_email(&email).await?.is_some() {
        warn!(%email, "Attempt to sign up with an existing email.");
        return Err(AppError::InvalidArgument(EMAIL_TAKEN.to_string()));
      }
      Ok(PipelineControl::Continue)
    })
  });

  signup_p.on_root("create_user", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let (name, email, password, users) = {
        let guard = ctx_data.read();
        (
          guard.name.clone(),
          guard.email.clone(),
          guard.password.clone(),
          guard.app_state.users.clone(),
        )
      };

      let password_hash = auth_service::hash_password(&password)?;
      let user = users
        .insert_user(NewUser {
          name,
          email,
          password_hash,
        })
        .await
        .map_err(|e| match e {
          // Lost a race with a concurrent signup for the same email.
          StoreError::Duplicate { .. } => AppError::InvalidArgument(EMAIL_TAKEN.to_string()),
          other => AppError::from(other),
        })?;

      info!(user_id = %user.id, "User created.");
      ctx_data.write().user = Some(user);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  signup_p.on_root("issue_session_token", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let user_id = guard
        .user
        .as_ref()
        .map(|u| u.id)
        .ok_or_else(|| AppError::Internal("No user to issue a token for".to_string()))?;
      let token = guard.app_state.tokens.issue(user_id)?;
      guard.session_token = Some(token);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  orka_instance.register_pipeline(signup_p);
  tracing::info!("Sign-up pipeline registered.");
}
