// shop/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use orka::OrkaError;
use serde_json::json;
use thiserror::Error;

use crate::models::cart::CartError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  #[error("Unauthorized: {0}")]
  Unauthorized(String),

  #[error("Not found: {0}")]
  NotFound(String),

  /// The mock gateway declined the charge. Nothing was persisted; the client may retry.
  #[error("Payment declined: {0}")]
  PaymentDeclined(String),

  /// A concurrent writer changed the resource first.
  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Storage error: {0}")]
  Store(#[source] StoreError),

  #[error("Orka workflow error: {source}")]
  Workflow {
    #[from]
    source: OrkaError,
  },

  #[error("Internal server error: {0}")]
  Internal(String),
}

impl AppError {
  /// Stable machine-readable error code included in every error body.
  pub fn code(&self) -> &'static str {
    match self {
      AppError::InvalidArgument(_) => "invalid_argument",
      AppError::Unauthorized(_) => "unauthorized",
      AppError::NotFound(_) => "not_found",
      AppError::PaymentDeclined(_) => "payment_declined",
      AppError::Conflict(_) => "conflict",
      AppError::Config(_) => "config",
      AppError::Store(_) => "store",
      AppError::Workflow { .. } => "workflow",
      AppError::Internal(_) => "internal",
    }
  }
}

impl From<StoreError> for AppError {
  fn from(err: StoreError) -> Self {
    match err {
      StoreError::Conflict { .. } | StoreError::Duplicate { .. } => AppError::Conflict(err.to_string()),
      other => AppError::Store(other),
    }
  }
}

impl From<CartError> for AppError {
  fn from(err: CartError) -> Self {
    match err {
      CartError::InvalidQuantity | CartError::QuantityOverflow => AppError::InvalidArgument(err.to_string()),
      CartError::LineNotFound(_) => AppError::NotFound(err.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
      AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::PaymentDeclined(_)
      | AppError::Config(_)
      | AppError::Store(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, code = self.code(), "Responding with error");
    } else {
      tracing::warn!(application_error = %self, code = self.code(), "Responding with error");
    }

    let mut builder = HttpResponse::build(status);
    match self {
      AppError::InvalidArgument(m) | AppError::Unauthorized(m) | AppError::NotFound(m) | AppError::Conflict(m) => {
        builder.json(json!({"error": m, "code": self.code()}))
      }
      AppError::PaymentDeclined(m) => builder.json(json!({
        "success": false,
        "error": m,
        "message": m,
        "code": self.code(),
        "transactionId": null,
      })),
      AppError::Config(_) => builder.json(json!({"error": "Configuration issue", "code": self.code()})),
      AppError::Store(_) => builder.json(json!({"error": "Database operation failed", "code": self.code()})),
      AppError::Workflow { source } => {
        tracing::error!(orka_error_source = ?source, "Workflow error details");
        builder.json(json!({"error": "Workflow processing error", "code": self.code()}))
      }
      AppError::Internal(_) => builder.json(json!({"error": "An internal error occurred", "code": self.code()})),
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
