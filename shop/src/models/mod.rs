// shop/src/models/mod.rs

//! Domain records and their JSON shapes.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartError, CartLine, CartLineView, CartView, LineId, VariantAttrs};
pub use order::{
  CheckoutItemInput, CheckoutRequest, NewOrder, Order, OrderItem, OrderStatus, PaymentStatus, ShippingAddress,
};
pub use product::{NewProduct, Product, ProductSummary};
pub use user::{NewUser, PublicUser, User};
