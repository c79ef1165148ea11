// shop/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

const DEV_JWT_SECRET: &str = "dev-only-jwt-secret-change-me";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
  #[default]
  Text,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "text" | "" => Ok(LogFormat::Text),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!("Invalid LOG_FORMAT '{}': expected text or json", other))),
    }
  }
}

impl LogFormat {
  /// Read before the rest of the config so logging is up before config errors are reported.
  pub fn from_env() -> Self {
    env::var("LOG_FORMAT")
      .ok()
      .and_then(|v| v.parse().ok())
      .unwrap_or_default()
  }
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
  /// Probability in [0, 1] that a mock charge is approved.
  pub success_rate: f64,
  pub transaction_prefix: String,
  pub latency_ms: u64,
}

impl Default for PaymentConfig {
  fn default() -> Self {
    Self {
      success_rate: 0.8,
      transaction_prefix: "MPESA".to_string(),
      latency_ms: 50,
    }
  }
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// `None` runs against the in-memory store.
  pub database_url: Option<String>,
  pub database_max_connections: u32,
  pub jwt_secret: String,
  pub token_ttl_days: i64,
  pub payment: PaymentConfig,
  pub seed_db: bool,
  pub seed_products_path: PathBuf,
  pub log_format: LogFormat,
}

// Secrets stay out of Debug output.
impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
      .field("database_max_connections", &self.database_max_connections)
      .field("jwt_secret", &"[REDACTED]")
      .field("token_ttl_days", &self.token_ttl_days)
      .field("payment", &self.payment)
      .field("seed_db", &self.seed_db)
      .field("seed_products_path", &self.seed_products_path)
      .field("log_format", &self.log_format)
      .finish()
  }
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 5000,
      database_url: None,
      database_max_connections: 5,
      jwt_secret: DEV_JWT_SECRET.to_string(),
      token_ttl_days: 7,
      payment: PaymentConfig::default(),
      seed_db: false,
      seed_products_path: PathBuf::from("products.json"),
      log_format: LogFormat::Text,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from an arbitrary variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let defaults = Self::default();

    let get_env = |var_name: &str| lookup(var_name).filter(|v| !v.trim().is_empty());

    fn parse<T: FromStr>(var_name: &str, raw: Option<String>, default: T) -> Result<T>
    where
      T::Err: std::fmt::Display,
    {
      match raw {
        Some(value) => value
          .trim()
          .parse::<T>()
          .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, value, e))),
        None => Ok(default),
      }
    }

    let server_host = get_env("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = parse(
      "SERVER_PORT",
      get_env("SERVER_PORT").or_else(|| get_env("PORT")),
      defaults.server_port,
    )?;
    let database_url = get_env("DATABASE_URL");
    let database_max_connections = parse(
      "DATABASE_MAX_CONNECTIONS",
      get_env("DATABASE_MAX_CONNECTIONS"),
      defaults.database_max_connections,
    )?;

    let jwt_secret = match (get_env("JWT_SECRET"), &database_url) {
      (Some(secret), _) => secret,
      (None, Some(_)) => {
        return Err(AppError::Config(
          "JWT_SECRET must be set when DATABASE_URL is configured".to_string(),
        ))
      }
      (None, None) => {
        tracing::warn!("JWT_SECRET not set; using the development secret.");
        defaults.jwt_secret
      }
    };
    let token_ttl_days = parse("TOKEN_TTL_DAYS", get_env("TOKEN_TTL_DAYS"), defaults.token_ttl_days)?;
    if token_ttl_days <= 0 {
      return Err(AppError::Config("TOKEN_TTL_DAYS must be positive".to_string()));
    }

    let success_rate = parse(
      "MOCK_PAYMENT_SUCCESS_RATE",
      get_env("MOCK_PAYMENT_SUCCESS_RATE"),
      defaults.payment.success_rate,
    )?;
    if !(0.0..=1.0).contains(&success_rate) {
      return Err(AppError::Config(format!(
        "MOCK_PAYMENT_SUCCESS_RATE must be within [0, 1], got {}",
        success_rate
      )));
    }
    let payment = PaymentConfig {
      success_rate,
      transaction_prefix: get_env("MOCK_PAYMENT_PREFIX").unwrap_or(defaults.payment.transaction_prefix),
      latency_ms: parse(
        "MOCK_PAYMENT_LATENCY_MS",
        get_env("MOCK_PAYMENT_LATENCY_MS"),
        defaults.payment.latency_ms,
      )?,
    };

    let seed_db = parse("SEED_DB", get_env("SEED_DB"), defaults.seed_db)?;
    let seed_products_path = get_env("SEED_PRODUCTS_PATH")
      .map(PathBuf::from)
      .unwrap_or(defaults.seed_products_path);
    let log_format = parse("LOG_FORMAT", get_env("LOG_FORMAT"), defaults.log_format)?;

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      jwt_secret,
      token_ttl_days,
      payment,
      seed_db,
      seed_products_path,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}
