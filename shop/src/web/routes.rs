// shop/src/web/routes.rs

use actix_web::{web, HttpRequest, HttpResponse};
use tracing::warn;

use crate::errors::AppError;
use crate::web::handlers::{auth_handlers, cart_handlers, checkout_handlers, order_handlers, product_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Malformed or mistyped bodies (e.g. a string quantity) are client errors.
fn json_error_handler(err: actix_web::error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
  warn!(path = %req.path(), error = %err, "Rejected JSON body.");
  AppError::InvalidArgument(format!("Invalid request body: {}", err)).into()
}

// An id that does not parse cannot name an existing resource.
fn path_error_handler(err: actix_web::error::PathError, req: &HttpRequest) -> actix_web::Error {
  warn!(path = %req.path(), error = %err, "Rejected path parameter.");
  AppError::NotFound("Resource not found or invalid ID.".to_string()).into()
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler))
    .service(
      web::scope("/api")
        .route("/health", web::get().to(health_check_handler))
        .service(
          web::scope("/users")
            .route("/register", web::post().to(auth_handlers::register_handler))
            .route("/login", web::post().to(auth_handlers::login_handler))
            .route("/profile", web::get().to(auth_handlers::profile_handler)),
        )
        .service(
          web::scope("/products")
            .route("", web::get().to(product_handlers::list_products_handler))
            .route("/{product_id}", web::get().to(product_handlers::get_product_handler)),
        )
        .service(
          web::scope("/cart")
            .route("", web::get().to(cart_handlers::get_cart_handler))
            .route("", web::post().to(cart_handlers::add_to_cart_handler))
            .route("/update/{item_id}", web::put().to(cart_handlers::update_cart_item_handler))
            .route("/remove/{item_id}", web::delete().to(cart_handlers::remove_cart_item_handler))
            .route("/clear", web::delete().to(cart_handlers::clear_cart_handler)),
        )
        .route("/checkout", web::post().to(checkout_handlers::checkout_handler))
        .route("/mpesa/pay", web::post().to(checkout_handlers::checkout_handler))
        .route("/orders", web::get().to(order_handlers::list_orders_handler)),
    );
}
