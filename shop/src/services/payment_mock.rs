// shop/src/services/payment_mock.rs

//! Simulated mobile-money gateway. No external system is contacted.

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::PaymentConfig;
use crate::errors::{AppError, Result as AppResult};

#[derive(Debug, Clone)]
pub struct PaymentRequest {
  pub user_id: Uuid,
  pub amount: i64,
  pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
  Approved { transaction_id: String },
  Declined { reason: String },
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  /// A decline is a normal outcome, not an error. `Err` means the gateway
  /// itself could not be used.
  async fn charge(&self, request: &PaymentRequest) -> AppResult<PaymentOutcome>;
}

#[derive(Debug, Clone)]
pub struct MockPaymentGateway {
  success_rate: f64,
  prefix: String,
  latency: Duration,
}

impl MockPaymentGateway {
  pub fn new(success_rate: f64, prefix: impl Into<String>, latency: Duration) -> AppResult<Self> {
    if !(0.0..=1.0).contains(&success_rate) {
      return Err(AppError::Config(format!(
        "Payment success rate must be within [0, 1], got {}",
        success_rate
      )));
    }
    Ok(Self {
      success_rate,
      prefix: prefix.into(),
      latency,
    })
  }

  pub fn from_config(config: &PaymentConfig) -> AppResult<Self> {
    Self::new(
      config.success_rate,
      config.transaction_prefix.clone(),
      Duration::from_millis(config.latency_ms),
    )
  }

  fn next_transaction_id(&self) -> String {
    let millis = Utc::now().timestamp_millis().rem_euclid(100_000_000);
    let salt: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("{}{:08}{:04}", self.prefix, millis, salt)
  }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
  #[instrument(name = "payment::charge", skip(self, request), fields(user_id = %request.user_id, amount = request.amount))]
  async fn charge(&self, request: &PaymentRequest) -> AppResult<PaymentOutcome> {
    if !self.latency.is_zero() {
      tokio::time::sleep(self.latency).await;
    }

    // The rng handle is not Send; keep it out of any await.
    let approved = rand::thread_rng().gen_bool(self.success_rate);

    if approved {
      let transaction_id = self.next_transaction_id();
      info!(%transaction_id, "Mock payment approved.");
      Ok(PaymentOutcome::Approved { transaction_id })
    } else {
      warn!("Mock payment declined.");
      Ok(PaymentOutcome::Declined {
        reason: "Payment failed due to a mock error.".to_string(),
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn request() -> PaymentRequest {
    PaymentRequest {
      user_id: Uuid::new_v4(),
      amount: 1500,
      phone: "0712345678".to_string(),
    }
  }

  #[tokio::test]
  async fn certain_success_always_approves_with_prefixed_id() {
    let gateway = MockPaymentGateway::new(1.0, "MPESA", Duration::ZERO).unwrap();
    for _ in 0..20 {
      match gateway.charge(&request()).await.unwrap() {
        PaymentOutcome::Approved { transaction_id } => {
          assert!(transaction_id.starts_with("MPESA"));
          assert_eq!(transaction_id.len(), "MPESA".len() + 12);
        }
        other => panic!("expected approval, got {:?}", other),
      }
    }
  }

  #[tokio::test]
  async fn zero_rate_always_declines() {
    let gateway = MockPaymentGateway::new(0.0, "MPESA", Duration::ZERO).unwrap();
    for _ in 0..20 {
      assert!(matches!(
        gateway.charge(&request()).await.unwrap(),
        PaymentOutcome::Declined { .. }
      ));
    }
  }

  #[test]
  fn out_of_range_rate_is_a_config_error() {
    assert!(matches!(
      MockPaymentGateway::new(1.5, "X", Duration::ZERO),
      Err(AppError::Config(_))
    ));
    assert!(MockPaymentGateway::new(-0.1, "X", Duration::ZERO).is_err());
  }
}
