// shop/src/store/mod.rs

//! Persistence seams. Pipelines only talk to these traits, so the same steps
//! run against Postgres in production and the in-memory store in tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Cart, NewOrder, NewUser, Order, Product, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
  /// The stored version no longer matches the one the writer loaded.
  #[error("{entity} '{key}' was modified concurrently")]
  Conflict { entity: &'static str, key: String },

  #[error("{entity} already exists: {detail}")]
  Duplicate { entity: &'static str, detail: String },

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  /// A stored document could not be decoded into its model.
  #[error("Corrupt stored data: {0}")]
  Codec(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait ProductCatalog: Send + Sync {
  async fn list_products(&self) -> StoreResult<Vec<Product>>;

  async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>>;

  /// Returns the subset of `ids` that still exist. Order is unspecified.
  async fn find_products(&self, ids: &[Uuid]) -> StoreResult<Vec<Product>>;

  async fn find_product_by_name(&self, name: &str) -> StoreResult<Option<Product>>;

  /// Fails with `Duplicate` when a product with the same name exists.
  async fn insert_product(&self, product: Product) -> StoreResult<Product>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
  async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

  async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

  /// Fails with `Duplicate` when the email is taken.
  async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
  async fn find_cart(&self, owner: Uuid) -> StoreResult<Option<Cart>>;

  /// Inserts an empty cart unless one exists and returns whichever is stored.
  /// Two racing callers observe the same cart.
  async fn create_cart(&self, owner: Uuid) -> StoreResult<Cart>;

  /// Writes `cart` if the stored version still equals `cart.version`.
  /// Returns the stored cart with its bumped version, or `Conflict`.
  async fn save_cart(&self, cart: &Cart) -> StoreResult<Cart>;

  /// Empties the owner's cart, creating it when absent. Always succeeds
  /// regardless of the stored version.
  async fn clear_cart(&self, owner: Uuid) -> StoreResult<Cart>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Fails with `Duplicate` when the transaction id was already recorded.
  async fn insert_order(&self, order: NewOrder) -> StoreResult<Order>;

  /// Newest first.
  async fn list_orders_for_user(&self, user: Uuid) -> StoreResult<Vec<Order>>;
}
