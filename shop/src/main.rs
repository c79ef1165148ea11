// shop/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use shop::config::{AppConfig, LogFormat};
use shop::services::catalog_seed;
use shop::services::payment_mock::MockPaymentGateway;
use shop::state::{AppState, Stores};
use shop::store::{MemoryStore, PgStore};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);

  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Text => builder.init(),
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();
  init_tracing(LogFormat::from_env());

  tracing::info!("Starting shop server...");

  let app_config = AppConfig::from_env().context("Failed to load application configuration")?;
  tracing::debug!(config = ?app_config, "Configuration loaded.");

  let stores = match &app_config.database_url {
    Some(url) => {
      let store = PgStore::connect(url, app_config.database_max_connections)
        .await
        .context("Failed to connect to the database")?;
      store.ensure_schema().await.context("Failed to apply the database schema")?;
      Stores::from_shared(Arc::new(store))
    }
    None => {
      tracing::warn!("DATABASE_URL is not set; using the in-memory store. Data is lost on restart.");
      Stores::from_shared(Arc::new(MemoryStore::new()))
    }
  };

  let payments = Arc::new(MockPaymentGateway::from_config(&app_config.payment)?);
  let seed_path = app_config.seed_products_path.clone();
  let seed_db = app_config.seed_db;
  let bind_address = app_config.bind_address();

  let app_state = AppState::new(stores, payments, app_config);

  if seed_db {
    catalog_seed::seed_from_file(app_state.catalog.as_ref(), &seed_path)
      .await
      .context("Failed to seed the product catalog")?;
  }

  tracing::info!("Binding server to {}...", bind_address);
  let state_data = actix_data::Data::new(app_state);

  HttpServer::new(move || {
    App::new()
      .app_data(state_data.clone())
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(shop::web::configure_app_routes)
  })
  .bind(&bind_address)?
  .run()
  .await?;

  Ok(())
}
