// shop/src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{query, query_as, FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use super::{CartStore, OrderStore, ProductCatalog, StoreError, StoreResult, UserDirectory};
use crate::models::{Cart, CartLine, NewOrder, NewUser, Order, OrderItem, Product, ShippingAddress, User};

const SCHEMA_SQL: &str = include_str!("../../schema.sql");

const PRODUCT_COLUMNS: &str =
  "id, name, description, price_cents, image, options, category, stock_count, created_at, updated_at";
const CART_COLUMNS: &str = "user_id, items, total_cents, version, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, user_id, items, total_amount_cents, shipping_name, shipping_phone, \
   transaction_id, payment_status, order_status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect(database_url)
      .await?;
    info!("Database connection pool created.");
    Ok(Self { pool })
  }

  pub fn from_pool(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn ensure_schema(&self) -> StoreResult<()> {
    sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
    info!("Database schema is up to date.");
    Ok(())
  }
}

fn duplicate_or(err: sqlx::Error, entity: &'static str, detail: String) -> StoreError {
  match &err {
    sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate { entity, detail },
    _ => StoreError::Database(err),
  }
}

#[derive(FromRow)]
struct CartRow {
  user_id: Uuid,
  items: Json<Vec<CartLine>>,
  total_cents: i64,
  version: i64,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
  fn from(row: CartRow) -> Self {
    Cart {
      owner: row.user_id,
      items: row.items.0,
      total: row.total_cents,
      version: row.version,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

#[derive(FromRow)]
struct OrderRow {
  id: Uuid,
  user_id: Uuid,
  items: Json<Vec<OrderItem>>,
  total_amount_cents: i64,
  shipping_name: String,
  shipping_phone: String,
  transaction_id: String,
  payment_status: String,
  order_status: String,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
  type Error = StoreError;

  fn try_from(row: OrderRow) -> StoreResult<Self> {
    Ok(Order {
      id: row.id,
      user: row.user_id,
      items: row.items.0,
      total_amount: row.total_amount_cents,
      shipping_address: ShippingAddress {
        name: row.shipping_name,
        phone: row.shipping_phone,
      },
      transaction_id: row.transaction_id,
      payment_status: row.payment_status.parse().map_err(StoreError::Codec)?,
      order_status: row.order_status.parse().map_err(StoreError::Codec)?,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[async_trait]
impl ProductCatalog for PgStore {
  async fn list_products(&self) -> StoreResult<Vec<Product>> {
    let sql = format!("SELECT {} FROM products ORDER BY name", PRODUCT_COLUMNS);
    Ok(query_as::<_, Product>(&sql).fetch_all(&self.pool).await?)
  }

  async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
    Ok(query_as::<_, Product>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn find_products(&self, ids: &[Uuid]) -> StoreResult<Vec<Product>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let sql = format!("SELECT {} FROM products WHERE id = ANY($1)", PRODUCT_COLUMNS);
    Ok(
      query_as::<_, Product>(&sql)
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?,
    )
  }

  async fn find_product_by_name(&self, name: &str) -> StoreResult<Option<Product>> {
    let sql = format!("SELECT {} FROM products WHERE name = $1", PRODUCT_COLUMNS);
    Ok(query_as::<_, Product>(&sql).bind(name).fetch_optional(&self.pool).await?)
  }

  async fn insert_product(&self, product: Product) -> StoreResult<Product> {
    let sql = format!(
      "INSERT INTO products ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
      PRODUCT_COLUMNS, PRODUCT_COLUMNS
    );
    query_as::<_, Product>(&sql)
      .bind(product.id)
      .bind(&product.name)
      .bind(&product.description)
      .bind(product.price)
      .bind(&product.image)
      .bind(&product.options)
      .bind(&product.category)
      .bind(product.stock_count)
      .bind(product.created_at)
      .bind(product.updated_at)
      .fetch_one(&self.pool)
      .await
      .map_err(|e| duplicate_or(e, "product", product.name.clone()))
  }
}

#[async_trait]
impl UserDirectory for PgStore {
  async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
    Ok(
      query_as::<_, User>("SELECT id, name, email, password_hash, created_at, updated_at FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    Ok(
      query_as::<_, User>(
        "SELECT id, name, email, password_hash, created_at, updated_at FROM users WHERE lower(email) = lower($1)",
      )
      .bind(email)
      .fetch_optional(&self.pool)
      .await?,
    )
  }

  async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
    query_as::<_, User>(
      "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) \
       RETURNING id, name, email, password_hash, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| duplicate_or(e, "user", user.email.clone()))
  }
}

#[async_trait]
impl CartStore for PgStore {
  async fn find_cart(&self, owner: Uuid) -> StoreResult<Option<Cart>> {
    let sql = format!("SELECT {} FROM carts WHERE user_id = $1", CART_COLUMNS);
    let row = query_as::<_, CartRow>(&sql).bind(owner).fetch_optional(&self.pool).await?;
    Ok(row.map(Cart::from))
  }

  async fn create_cart(&self, owner: Uuid) -> StoreResult<Cart> {
    query("INSERT INTO carts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
      .bind(owner)
      .execute(&self.pool)
      .await?;

    let sql = format!("SELECT {} FROM carts WHERE user_id = $1", CART_COLUMNS);
    let row = query_as::<_, CartRow>(&sql).bind(owner).fetch_one(&self.pool).await?;
    Ok(row.into())
  }

  async fn save_cart(&self, cart: &Cart) -> StoreResult<Cart> {
    let sql = format!(
      "UPDATE carts SET items = $2, total_cents = $3, version = version + 1, updated_at = now() \
       WHERE user_id = $1 AND version = $4 RETURNING {}",
      CART_COLUMNS
    );
    let row = query_as::<_, CartRow>(&sql)
      .bind(cart.owner)
      .bind(Json(&cart.items))
      .bind(cart.total)
      .bind(cart.version)
      .fetch_optional(&self.pool)
      .await?;

    row.map(Cart::from).ok_or_else(|| StoreError::Conflict {
      entity: "cart",
      key: cart.owner.to_string(),
    })
  }

  async fn clear_cart(&self, owner: Uuid) -> StoreResult<Cart> {
    let sql = format!(
      "INSERT INTO carts (user_id, version) VALUES ($1, 1) \
       ON CONFLICT (user_id) DO UPDATE SET items = '[]'::jsonb, total_cents = 0, \
       version = carts.version + 1, updated_at = now() RETURNING {}",
      CART_COLUMNS
    );
    let row = query_as::<_, CartRow>(&sql).bind(owner).fetch_one(&self.pool).await?;
    Ok(row.into())
  }
}

#[async_trait]
impl OrderStore for PgStore {
  async fn insert_order(&self, order: NewOrder) -> StoreResult<Order> {
    let sql = format!(
      "INSERT INTO orders (id, user_id, items, total_amount_cents, shipping_name, shipping_phone, \
       transaction_id, payment_status, order_status) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
      ORDER_COLUMNS
    );
    let row = query_as::<_, OrderRow>(&sql)
      .bind(Uuid::new_v4())
      .bind(order.user)
      .bind(Json(&order.items))
      .bind(order.total_amount)
      .bind(&order.shipping_address.name)
      .bind(&order.shipping_address.phone)
      .bind(&order.transaction_id)
      .bind(order.payment_status.as_str())
      .bind(order.order_status.as_str())
      .fetch_one(&self.pool)
      .await
      .map_err(|e| duplicate_or(e, "order", order.transaction_id.clone()))?;
    Order::try_from(row)
  }

  async fn list_orders_for_user(&self, user: Uuid) -> StoreResult<Vec<Order>> {
    let sql = format!(
      "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
      ORDER_COLUMNS
    );
    query_as::<_, OrderRow>(&sql)
      .bind(user)
      .fetch_all(&self.pool)
      .await?
      .into_iter()
      .map(Order::try_from)
      .collect()
  }
}
