// shop/src/lib.rs

//! Storefront backend: catalog, accounts, per-user carts and a mocked checkout.
//!
//! Cart and checkout operations run as `orka` pipelines registered once in
//! [`state::AppState`]. Persistence sits behind the traits in [`store`] with a
//! Postgres implementation and an in-memory one.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

pub use errors::{AppError, Result};
pub use state::AppState;
