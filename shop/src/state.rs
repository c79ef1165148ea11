// shop/src/state.rs

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::services::payment_mock::PaymentGateway;
use crate::services::token_service::TokenIssuer;
use crate::store::{CartStore, OrderStore, ProductCatalog, UserDirectory};
use std::sync::Arc;

/// The four persistence seams, usually backed by one store.
#[derive(Clone)]
pub struct Stores {
  pub carts: Arc<dyn CartStore>,
  pub orders: Arc<dyn OrderStore>,
  pub catalog: Arc<dyn ProductCatalog>,
  pub users: Arc<dyn UserDirectory>,
}

impl Stores {
  pub fn from_shared<S>(store: Arc<S>) -> Self
  where
    S: CartStore + OrderStore + ProductCatalog + UserDirectory + 'static,
  {
    Self {
      carts: store.clone(),
      orders: store.clone(),
      catalog: store.clone(),
      users: store,
    }
  }
}

#[derive(Clone)]
pub struct AppState {
  pub carts: Arc<dyn CartStore>,
  pub orders: Arc<dyn OrderStore>,
  pub catalog: Arc<dyn ProductCatalog>,
  pub users: Arc<dyn UserDirectory>,
  pub payments: Arc<dyn PaymentGateway>,
  pub tokens: Arc<TokenIssuer>,
  pub orka_instance: Arc<orka::Orka<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the stores and gateway together and registers every pipeline.
  pub fn new(stores: Stores, payments: Arc<dyn PaymentGateway>, config: AppConfig) -> Self {
    let orka_instance = Arc::new(orka::Orka::<AppError>::new());
    pipelines::register_all_pipelines(&orka_instance);

    let tokens = Arc::new(TokenIssuer::new(
      &config.jwt_secret,
      chrono::Duration::days(config.token_ttl_days),
    ));

    Self {
      carts: stores.carts,
      orders: stores.orders,
      catalog: stores.catalog,
      users: stores.users,
      payments,
      tokens,
      orka_instance,
      config: Arc::new(config),
    }
  }
}
