// shop/src/store/memory.rs

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::{CartStore, OrderStore, ProductCatalog, StoreError, StoreResult, UserDirectory};
use crate::models::{Cart, NewOrder, NewUser, Order, Product, User};

/// Process-local store used when no database is configured and by the tests.
/// Each map sits behind its own lock; no lock is held across an await.
#[derive(Debug, Default)]
pub struct MemoryStore {
  products: RwLock<HashMap<Uuid, Product>>,
  users: RwLock<HashMap<Uuid, User>>,
  carts: RwLock<HashMap<Uuid, Cart>>,
  orders: RwLock<Vec<Order>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Replaces a product in place. Used to simulate catalog edits.
  pub fn upsert_product(&self, product: Product) {
    self.products.write().insert(product.id, product);
  }

  pub fn remove_product(&self, id: Uuid) -> Option<Product> {
    self.products.write().remove(&id)
  }
}

#[async_trait]
impl ProductCatalog for MemoryStore {
  async fn list_products(&self) -> StoreResult<Vec<Product>> {
    let mut products: Vec<Product> = self.products.read().values().cloned().collect();
    products.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(products)
  }

  async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
    Ok(self.products.read().get(&id).cloned())
  }

  async fn find_products(&self, ids: &[Uuid]) -> StoreResult<Vec<Product>> {
    let products = self.products.read();
    Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
  }

  async fn find_product_by_name(&self, name: &str) -> StoreResult<Option<Product>> {
    Ok(self.products.read().values().find(|p| p.name == name).cloned())
  }

  async fn insert_product(&self, product: Product) -> StoreResult<Product> {
    let mut products = self.products.write();
    if products.values().any(|p| p.name == product.name) {
      return Err(StoreError::Duplicate {
        entity: "product",
        detail: product.name,
      });
    }
    products.insert(product.id, product.clone());
    Ok(product)
  }
}

#[async_trait]
impl UserDirectory for MemoryStore {
  async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
    Ok(self.users.read().get(&id).cloned())
  }

  async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    Ok(
      self
        .users
        .read()
        .values()
        .find(|u| u.email.eq_ignore_ascii_case(email))
        .cloned(),
    )
  }

  async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
    let mut users = self.users.write();
    if users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
      return Err(StoreError::Duplicate {
        entity: "user",
        detail: user.email,
      });
    }
    let now = Utc::now();
    let stored = User {
      id: Uuid::new_v4(),
      name: user.name,
      email: user.email,
      password_hash: user.password_hash,
      created_at: now,
      updated_at: now,
    };
    users.insert(stored.id, stored.clone());
    Ok(stored)
  }
}

#[async_trait]
impl CartStore for MemoryStore {
  async fn find_cart(&self, owner: Uuid) -> StoreResult<Option<Cart>> {
    Ok(self.carts.read().get(&owner).cloned())
  }

  async fn create_cart(&self, owner: Uuid) -> StoreResult<Cart> {
    let mut carts = self.carts.write();
    let cart = carts.entry(owner).or_insert_with(|| Cart::new(owner, Utc::now()));
    Ok(cart.clone())
  }

  async fn save_cart(&self, cart: &Cart) -> StoreResult<Cart> {
    let mut carts = self.carts.write();
    let conflict = || StoreError::Conflict {
      entity: "cart",
      key: cart.owner.to_string(),
    };
    let stored = carts.get_mut(&cart.owner).ok_or_else(conflict)?;
    if stored.version != cart.version {
      return Err(conflict());
    }

    let mut next = cart.clone();
    next.version = cart.version + 1;
    next.updated_at = Utc::now();
    *stored = next.clone();
    Ok(next)
  }

  async fn clear_cart(&self, owner: Uuid) -> StoreResult<Cart> {
    let mut carts = self.carts.write();
    let now = Utc::now();
    let cart = carts.entry(owner).or_insert_with(|| Cart::new(owner, now));
    cart.clear();
    cart.version += 1;
    cart.updated_at = now;
    Ok(cart.clone())
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn insert_order(&self, order: NewOrder) -> StoreResult<Order> {
    let mut orders = self.orders.write();
    if orders.iter().any(|o| o.transaction_id == order.transaction_id) {
      return Err(StoreError::Duplicate {
        entity: "order",
        detail: order.transaction_id,
      });
    }
    let now = Utc::now();
    let stored = Order {
      id: Uuid::new_v4(),
      user: order.user,
      items: order.items,
      total_amount: order.total_amount,
      shipping_address: order.shipping_address,
      transaction_id: order.transaction_id,
      payment_status: order.payment_status,
      order_status: order.order_status,
      created_at: now,
      updated_at: now,
    };
    orders.push(stored.clone());
    Ok(stored)
  }

  async fn list_orders_for_user(&self, user: Uuid) -> StoreResult<Vec<Order>> {
    // Insertion order is chronological, so reversing yields newest first.
    Ok(self.orders.read().iter().rev().filter(|o| o.user == user).cloned().collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::VariantAttrs;

  #[tokio::test]
  async fn create_cart_is_idempotent() {
    let store = MemoryStore::new();
    let owner = Uuid::new_v4();
    let first = store.create_cart(owner).await.unwrap();
    let second = store.create_cart(owner).await.unwrap();
    assert_eq!(first, second);
  }

  #[tokio::test]
  async fn stale_save_is_rejected() {
    let store = MemoryStore::new();
    let owner = Uuid::new_v4();
    let loaded = store.create_cart(owner).await.unwrap();

    let mut writer_a = loaded.clone();
    writer_a.add_line(Uuid::new_v4(), 1, VariantAttrs::default()).unwrap();
    let saved = store.save_cart(&writer_a).await.unwrap();
    assert_eq!(saved.version, loaded.version + 1);

    let mut writer_b = loaded;
    writer_b.add_line(Uuid::new_v4(), 2, VariantAttrs::default()).unwrap();
    assert!(matches!(
      store.save_cart(&writer_b).await,
      Err(StoreError::Conflict { entity: "cart", .. })
    ));

    let stored = store.find_cart(owner).await.unwrap().unwrap();
    assert_eq!(stored.items, saved.items);
  }

  #[tokio::test]
  async fn clear_creates_missing_cart_and_bumps_version() {
    let store = MemoryStore::new();
    let owner = Uuid::new_v4();
    let cleared = store.clear_cart(owner).await.unwrap();
    assert!(cleared.items.is_empty());
    assert_eq!(cleared.version, 1);
    assert_eq!(store.clear_cart(owner).await.unwrap().version, 2);
  }

  #[tokio::test]
  async fn duplicate_email_is_rejected_case_insensitively() {
    let store = MemoryStore::new();
    let new_user = |email: &str| NewUser {
      name: "Ann".into(),
      email: email.into(),
      password_hash: "hash".into(),
    };
    store.insert_user(new_user("ann@example.com")).await.unwrap();
    assert!(matches!(
      store.insert_user(new_user("ANN@example.com")).await,
      Err(StoreError::Duplicate { entity: "user", .. })
    ));
  }
}
