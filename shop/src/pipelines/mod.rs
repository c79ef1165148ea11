// shop/src/pipelines/mod.rs

//! Defines and registers all Orka pipelines used by the shop.

use crate::errors::AppError;
use orka::Orka;
use std::sync::Arc;

pub mod common_steps;
pub mod contexts;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod signin_pipeline;
pub mod signup_pipeline;

/// Registers every pipeline with `orka_instance`. Called once while building `AppState`.
pub fn register_all_pipelines(orka_instance: &Arc<Orka<AppError>>) {
  tracing::info!("Registering Orka pipelines...");

  signup_pipeline::register_signup_pipeline(orka_instance);
  signin_pipeline::register_signin_pipeline(orka_instance);
  cart_pipeline::register_cart_pipeline(orka_instance);
  checkout_pipeline::register_checkout_pipeline(orka_instance);

  tracing::info!("All application pipelines registered with Orka.");
}
