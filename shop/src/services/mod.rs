// shop/src/services/mod.rs

pub mod auth_service;
pub mod cart_service;
pub mod catalog_seed;
pub mod checkout_service;
pub mod payment_mock;
pub mod token_service;
