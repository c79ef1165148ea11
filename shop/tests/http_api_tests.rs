// tests/http_api_tests.rs
mod common;

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use common::*;
use serde_json::{json, Value};
use shop::store::OrderStore;
use shop::web::configure_app_routes;

macro_rules! shop_app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

macro_rules! register {
  ($app:expr, $email:expr) => {{
    let req = test::TestRequest::post()
      .uri("/api/users/register")
      .set_json(json!({ "name": "Ann", "email": $email, "password": "secret-pass" }))
      .to_request();
    let resp = test::call_service(&$app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    body["token"].as_str().expect("token in body").to_string()
  }};
}

fn bearer(token: &str) -> (&'static str, String) {
  ("Authorization", format!("Bearer {}", token))
}

#[actix_web::test]
async fn health_is_public() {
  let shop = test_shop(1.0).await;
  let app = shop_app!(shop.state);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn cart_requires_a_session() {
  let shop = test_shop(1.0).await;
  let app = shop_app!(shop.state);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/cart").to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Not authorized, no token.");

  let req = test::TestRequest::get()
    .uri("/api/cart")
    .insert_header(bearer("not-a-token"))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn register_then_login_issues_tokens() {
  let shop = test_shop(1.0).await;
  let app = shop_app!(shop.state);

  let token = register!(app, "Ann@Example.com");
  assert!(!token.is_empty());

  let req = test::TestRequest::post()
    .uri("/api/users/register")
    .set_json(json!({ "name": "Ann", "email": "ann@example.com", "password": "secret-pass" }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

  let req = test::TestRequest::post()
    .uri("/api/users/login")
    .set_json(json!({ "email": "ann@example.com", "password": "wrong-pass" }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::post()
    .uri("/api/users/login")
    .set_json(json!({ "email": "ann@example.com", "password": "secret-pass" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let cookie = resp
    .response()
    .cookies()
    .find(|c| c.name() == "token")
    .expect("session cookie");
  assert!(cookie.http_only().unwrap_or(false));
  assert_eq!(cookie.max_age(), Some(CookieDuration::days(7)));
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["user"]["email"], "ann@example.com");

  let token = body["token"].as_str().unwrap();
  let req = test::TestRequest::get()
    .uri("/api/users/profile")
    .insert_header(bearer(token))
    .to_request();
  let profile: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(profile["name"], "Ann");
  assert!(profile.get("passwordHash").is_none());
}

#[actix_web::test]
async fn malformed_input_maps_to_client_errors() {
  let shop = test_shop(1.0).await;
  let app = shop_app!(shop.state);
  let token = register!(app, "bad-input@example.com");

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/products/not-a-uuid").to_request()).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let req = test::TestRequest::post()
    .uri("/api/cart")
    .insert_header(bearer(&token))
    .set_json(json!({ "productId": shop.p1.id, "quantity": "2" }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

  let req = test::TestRequest::post()
    .uri("/api/cart")
    .insert_header(bearer(&token))
    .set_json(json!({ "productId": shop.p1.id, "quantity": 0 }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

  let req = test::TestRequest::delete()
    .uri("/api/cart/remove/not-a-line")
    .insert_header(bearer(&token))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn anonymous_requests_fail_before_body_or_path_parsing() {
  let shop = test_shop(1.0).await;
  let app = shop_app!(shop.state);

  let requests = vec![
    test::TestRequest::post()
      .uri("/api/cart")
      .set_json(json!({ "productId": "x", "quantity": "abc" })),
    test::TestRequest::put()
      .uri("/api/cart/update/not-a-uuid")
      .set_json(json!({ "quantity": "abc" })),
    test::TestRequest::delete().uri("/api/cart/remove/not-a-uuid"),
    test::TestRequest::post()
      .uri("/api/checkout")
      .set_json(json!({ "totalAmount": "x" })),
    test::TestRequest::post()
      .uri("/api/mpesa/pay")
      .set_json(json!({ "cartItems": "nope" })),
  ];

  for req in requests {
    let resp = test::call_service(&app, req.to_request()).await;
    let path = resp.request().path().to_string();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", path);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "unauthorized", "{}", path);
  }
}

#[actix_web::test]
async fn rejected_quantity_updates_leave_the_cart_untouched() {
  let shop = test_shop(1.0).await;
  let app = shop_app!(shop.state);
  let token = register!(app, "steady@example.com");

  let req = test::TestRequest::post()
    .uri("/api/cart")
    .insert_header(bearer(&token))
    .set_json(json!({ "productId": shop.p1.id, "quantity": 2 }))
    .to_request();
  let before: Value = test::call_and_read_body_json(&app, req).await;
  let line_id = before["items"][0]["id"].as_str().unwrap().to_string();
  let uri = format!("/api/cart/update/{}", line_id);

  for quantity in [json!("abc"), json!(0), json!(-1)] {
    let req = test::TestRequest::put()
      .uri(&uri)
      .insert_header(bearer(&token))
      .set_json(json!({ "quantity": quantity }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "quantity {}", quantity);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "invalid_argument");
  }

  let req = test::TestRequest::get()
    .uri("/api/cart")
    .insert_header(bearer(&token))
    .to_request();
  let after: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(after["items"][0]["quantity"], 2);
  assert_eq!(after["total"], 2000);
  assert_eq!(after["version"], before["version"]);
}

#[actix_web::test]
async fn products_are_listed_and_fetched_by_id() {
  let shop = test_shop(1.0).await;
  let app = shop_app!(shop.state);

  let list: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/products").to_request()).await;
  assert_eq!(list.as_array().map(Vec::len), Some(2));

  let uri = format!("/api/products/{}", shop.p2.id);
  let product: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri(&uri).to_request()).await;
  assert_eq!(product["name"], "P2");
  assert_eq!(product["price"], 500);
}

#[actix_web::test]
async fn cart_lifecycle_and_checkout_over_http() {
  let shop = test_shop(1.0).await;
  let app = shop_app!(shop.state);
  let token = register!(app, "buyer@example.com");

  let req = test::TestRequest::post()
    .uri("/api/cart")
    .insert_header(bearer(&token))
    .set_json(json!({ "productId": shop.p1.id, "quantity": 2 }))
    .to_request();
  let cart: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(cart["total"], 2000);
  let line_id = cart["items"][0]["id"].as_str().unwrap().to_string();

  let req = test::TestRequest::put()
    .uri(&format!("/api/cart/update/{}", line_id))
    .insert_header(bearer(&token))
    .set_json(json!({ "quantity": 3 }))
    .to_request();
  let updated: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(updated["message"], "Cart item quantity updated.");
  assert_eq!(updated["cart"]["total"], 3000);

  let req = test::TestRequest::post()
    .uri("/api/checkout")
    .insert_header(bearer(&token))
    .set_json(json!({
      "name": "Ann",
      "phone": "0712345678",
      "cartItems": [{ "productId": shop.p1.id, "name": "P1", "price": 1000, "quantity": 3 }],
      "totalAmount": 3000,
    }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["success"], true);
  assert!(body["transactionId"].as_str().unwrap().starts_with("MPESA"));
  assert_eq!(body["order"]["paymentStatus"], "Paid");

  let req = test::TestRequest::get()
    .uri("/api/cart")
    .insert_header(bearer(&token))
    .to_request();
  let cart: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));

  let req = test::TestRequest::get()
    .uri("/api/orders")
    .insert_header(bearer(&token))
    .to_request();
  let orders: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(orders.as_array().map(Vec::len), Some(1));
  assert_eq!(orders[0]["totalAmount"], 3000);
}

#[actix_web::test]
async fn declined_checkout_reports_failure_and_keeps_the_cart() {
  let shop = test_shop(0.0).await;
  let app = shop_app!(shop.state);
  let token = register!(app, "unlucky@example.com");

  let req = test::TestRequest::post()
    .uri("/api/cart")
    .insert_header(bearer(&token))
    .set_json(json!({ "productId": shop.p2.id }))
    .to_request();
  let cart: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(cart["total"], 500);
  let owner = cart["user"].as_str().unwrap().parse().unwrap();

  let req = test::TestRequest::post()
    .uri("/api/mpesa/pay")
    .insert_header(bearer(&token))
    .set_json(json!({
      "name": "Ann",
      "phone": "0712345678",
      "cartItems": [{ "product": shop.p2.id, "name": "P2", "price": 500, "quantity": 1 }],
      "totalAmount": 500,
    }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["success"], false);
  assert_eq!(body["transactionId"], Value::Null);

  assert!(shop.store.list_orders_for_user(owner).await.unwrap().is_empty());
  let req = test::TestRequest::get()
    .uri("/api/cart")
    .insert_header(bearer(&token))
    .to_request();
  let cart: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(cart["total"], 500);
}
