// shop/src/web/handlers/auth_handlers.rs

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::{PublicUser, User};
use crate::pipelines::contexts::{SigninCtxData, SignupCtxData};
use crate::state::AppState;
use crate::web::extractors::{AuthenticatedUser, TOKEN_COOKIE};
use orka::{ContextData, PipelineResult};

#[derive(Deserialize, Debug)]
pub struct RegisterRequestPayload {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequestPayload {
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
}

fn session_cookie(state: &AppState, token: &str) -> Cookie<'static> {
  Cookie::build(TOKEN_COOKIE, token.to_string())
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .max_age(CookieDuration::seconds(state.tokens.ttl().num_seconds()))
    .finish()
}

fn session_response(
  mut builder: actix_web::HttpResponseBuilder,
  state: &AppState,
  message: &str,
  user: &User,
  token: String,
) -> HttpResponse {
  let cookie = session_cookie(state, &token);
  builder.cookie(cookie).json(json!({
    "message": message,
    "user": { "id": user.id, "name": user.name, "email": user.email },
    "token": token,
  }))
}

#[instrument(name = "handler::register", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let orka_context_data = ContextData::new(SignupCtxData {
    app_state: app_state.get_ref().clone(),
    name: payload.name,
    email: payload.email,
    password: payload.password,
    user: None,
    session_token: None,
  });

  match app_state.orka_instance.run(orka_context_data.clone()).await {
    Ok(PipelineResult::Completed) => {
      let final_ctx = orka_context_data.read();
      let (Some(user), Some(token)) = (final_ctx.user.as_ref(), final_ctx.session_token.clone()) else {
        return Err(AppError::Internal("Signup completed without a user or token.".to_string()));
      };
      info!(user_id = %user.id, "User registered.");
      Ok(session_response(
        HttpResponse::Created(),
        &app_state,
        "User registered successfully!",
        user,
        token,
      ))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Signup pipeline was stopped by a handler.");
      Err(AppError::Internal("Signup process was halted by an internal step.".to_string()))
    }
    Err(app_err) => {
      warn!(error = %app_err, "Signup failed.");
      Err(app_err)
    }
  }
}

#[instrument(name = "handler::login", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let orka_context_data = ContextData::new(SigninCtxData {
    app_state: app_state.get_ref().clone(),
    email: payload.email,
    password: payload.password,
    user: None,
    session_token: None,
  });

  match app_state.orka_instance.run(orka_context_data.clone()).await {
    Ok(PipelineResult::Completed) => {
      let final_ctx = orka_context_data.read();
      let (Some(user), Some(token)) = (final_ctx.user.as_ref(), final_ctx.session_token.clone()) else {
        return Err(AppError::Internal("Signin completed without a user or token.".to_string()));
      };
      Ok(session_response(HttpResponse::Ok(), &app_state, "Login successful", user, token))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Signin pipeline was stopped by a handler.");
      Err(AppError::Unauthorized("Authentication process was unexpectedly halted.".to_string()))
    }
    Err(app_err) => {
      warn!(error = %app_err, "Signin failed.");
      Err(app_err)
    }
  }
}

#[instrument(name = "handler::profile", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn profile_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
  let user = app_state
    .users
    .find_user(auth_user.user_id)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;
  Ok(HttpResponse::Ok().json(PublicUser::from(&user)))
}
