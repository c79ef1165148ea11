// tests/common/mod.rs
#![allow(dead_code)]

use chrono::Utc;
use once_cell::sync::Lazy;
use shop::config::{AppConfig, PaymentConfig};
use shop::models::{NewProduct, NewUser, Product};
use shop::services::payment_mock::MockPaymentGateway;
use shop::state::{AppState, Stores};
use shop::store::{MemoryStore, ProductCatalog, UserDirectory};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn test_config(success_rate: f64) -> AppConfig {
  AppConfig {
    payment: PaymentConfig {
      success_rate,
      transaction_prefix: "MPESA".to_string(),
      latency_ms: 0,
    },
    ..AppConfig::default()
  }
}

pub fn gateway(success_rate: f64) -> Arc<MockPaymentGateway> {
  Arc::new(MockPaymentGateway::new(success_rate, "MPESA", Duration::ZERO).expect("valid rate"))
}

pub struct TestShop {
  pub state: AppState,
  pub store: Arc<MemoryStore>,
  pub p1: Product,
  pub p2: Product,
  pub user_id: Uuid,
}

pub fn product(name: &str, price: i64) -> Product {
  NewProduct {
    id: None,
    name: name.to_string(),
    description: format!("{} description", name),
    price,
    image: None,
    options: None,
    category: "Test".to_string(),
    stock_count: None,
  }
  .into_product(Utc::now())
}

/// In-memory shop with P1 at 1000, P2 at 500 and one registered user.
/// `success_rate` drives the mock gateway (1.0 always approves, 0.0 always declines).
pub async fn test_shop(success_rate: f64) -> TestShop {
  let store = Arc::new(MemoryStore::new());
  build_shop(store.clone(), Stores::from_shared(store), success_rate).await
}

pub async fn build_shop(store: Arc<MemoryStore>, stores: Stores, success_rate: f64) -> TestShop {
  setup_tracing();
  let p1 = store.insert_product(product("P1", 1000)).await.expect("insert P1");
  let p2 = store.insert_product(product("P2", 500)).await.expect("insert P2");
  let user = store
    .insert_user(NewUser {
      name: "Test Shopper".to_string(),
      email: "shopper@example.com".to_string(),
      password_hash: "not-a-real-hash".to_string(),
    })
    .await
    .expect("insert user");

  let state = AppState::new(stores, gateway(success_rate), test_config(success_rate));
  TestShop {
    state,
    store,
    p1,
    p2,
    user_id: user.id,
  }
}
