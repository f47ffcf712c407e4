//! End-to-end API tests against an in-memory database.
//!
//! Each test builds the full router and drives it with `tower::ServiceExt::
//! oneshot`, so routing, extractors, auth, and error mapping are all
//! exercised without binding a socket.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use api::config::Config;
use api::{create_app, AppState};
use store_db::{Database, DbConfig};

async fn test_app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_path: ":memory:".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_ttl_secs: 3600,
    };

    create_app(AppState::new(db, &config))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    builder.body(Body::empty()).unwrap()
}

/// Registers a user and returns their bearer token.
async fn register(app: &Router, username: &str, role: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/auth/register",
            None,
            json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "hunter22hunter",
                "role": role,
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

/// Creates a product as admin and returns its id.
async fn create_product(app: &Router, admin_token: &str, name: &str, price_cents: i64, stock: i64) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/products",
            Some(admin_token),
            json!({ "name": name, "price_cents": price_cents, "stock": stock }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = test_app().await;

    let (status, body) = send(&app, get_request("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn register_then_login() {
    let app = test_app().await;

    register(&app, "alice", "user").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "email": "alice@example.com", "password": "hunter22hunter" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["username"], "alice");
    // The hash must never appear in a response.
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = test_app().await;
    register(&app, "bob", "user").await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "email": "bob@example.com", "password": "wrong-password" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = test_app().await;
    register(&app, "carol", "user").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            None,
            json!({
                "username": "carol",
                "email": "carol@example.com",
                "password": "hunter22hunter",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = test_app().await;

    let (status, _) = send(&app, get_request("/cart", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get_request("/cart", Some("not-a-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn product_writes_require_admin() {
    let app = test_app().await;
    let user_token = register(&app, "dave", "user").await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/products",
            Some(&user_token),
            json!({ "name": "Widget", "price_cents": 100, "stock": 5 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn full_purchase_flow_with_idempotent_settlement() {
    let app = test_app().await;
    let admin = register(&app, "admin", "admin").await;
    let shopper = register(&app, "erin", "user").await;

    let product_id = create_product(&app, &admin, "Gadget", 2500, 10).await;

    // Add twice; lines merge.
    for _ in 0..2 {
        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/cart",
                Some(&shopper),
                json!({ "product_id": product_id, "quantity": 1 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, cart) = send(&app, get_request("/cart", Some(&shopper))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["lines"].as_array().unwrap().len(), 1);
    assert_eq!(cart["lines"][0]["quantity"], 2);
    assert_eq!(cart["total_cents"], 5000);

    // Checkout.
    let (status, checkout) = send(
        &app,
        json_request("POST", "/orders", Some(&shopper), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = checkout["order"]["id"].as_str().unwrap().to_string();
    assert_eq!(checkout["order"]["amount_cents"], 5000);
    assert_eq!(checkout["order"]["status"], "pending");

    // Stock went down, cart emptied.
    let (_, product) = send(&app, get_request(&format!("/products/{product_id}"), None)).await;
    assert_eq!(product["stock"], 8);

    let (_, cart) = send(&app, get_request("/cart", Some(&shopper))).await;
    assert!(cart["lines"].as_array().unwrap().is_empty());

    // Settle twice; the second call is a no-op with the same transaction id.
    let settle_uri = format!("/orders/{order_id}/payments");

    let (status, first) = send(
        &app,
        json_request("POST", &settle_uri, Some(&shopper), json!({ "method": "card" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["already_settled"], false);
    assert_eq!(first["payment"]["status"], "completed");

    let (status, second) = send(
        &app,
        json_request("POST", &settle_uri, Some(&shopper), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["already_settled"], true);
    assert_eq!(
        second["payment"]["transaction_id"],
        first["payment"]["transaction_id"]
    );
    assert_eq!(second["invoice"]["id"], first["invoice"]["id"]);

    // Order shipped, invoice retrievable.
    let (_, order) = send(&app, get_request(&format!("/orders/{order_id}"), Some(&shopper))).await;
    assert_eq!(order["status"], "shipped");

    let (status, invoice) = send(
        &app,
        get_request(&format!("/orders/{order_id}/invoice"), Some(&shopper)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoice["amount_cents"], 5000);
}

#[tokio::test]
async fn checkout_empty_cart_is_bad_request() {
    let app = test_app().await;
    let shopper = register(&app, "frank", "user").await;

    let (status, body) = send(
        &app,
        json_request("POST", "/orders", Some(&shopper), json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cart is empty");
}

#[tokio::test]
async fn oversell_is_a_conflict() {
    let app = test_app().await;
    let admin = register(&app, "admin2", "admin").await;
    let shopper = register(&app, "grace", "user").await;

    let product_id = create_product(&app, &admin, "Scarce", 900, 2).await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/cart",
            Some(&shopper),
            json!({ "product_id": product_id, "quantity": 3 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        json_request("POST", "/orders", Some(&shopper), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn another_users_order_is_forbidden() {
    let app = test_app().await;
    let admin = register(&app, "admin3", "admin").await;
    let alice = register(&app, "alice3", "user").await;
    let mallory = register(&app, "mallory3", "user").await;

    let product_id = create_product(&app, &admin, "Widget", 100, 5).await;

    send(
        &app,
        json_request(
            "POST",
            "/cart",
            Some(&alice),
            json!({ "product_id": product_id, "quantity": 1 }),
        ),
    )
    .await;
    let (_, checkout) = send(
        &app,
        json_request("POST", "/orders", Some(&alice), json!({})),
    )
    .await;
    let order_id = checkout["order"]["id"].as_str().unwrap();

    // A non-owner, non-admin gets 403 on the order and everything under it.
    let (status, _) = send(
        &app,
        get_request(&format!("/orders/{order_id}"), Some(&mallory)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/orders/{order_id}/payments"),
            Some(&mallory),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        get_request(&format!("/orders/{order_id}/payments"), Some(&mallory)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        get_request(&format!("/orders/{order_id}/invoice"), Some(&mallory)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin sees it fine.
    let (status, _) = send(&app, get_request(&format!("/orders/{order_id}"), Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);

    // A genuinely missing order is still a 404, not a 403.
    let (status, _) = send(&app, get_request("/orders/no-such-order", Some(&mallory))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_update_roundtrip() {
    let app = test_app().await;
    let token = register(&app, "heidi", "user").await;

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/profile",
            Some(&token),
            json!({ "location": "Berlin", "payment_method": "wallet" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"], "Berlin");
    assert_eq!(body["payment_method"], "wallet");

    let (_, profile) = send(&app, get_request("/profile", Some(&token))).await;
    assert_eq!(profile["location"], "Berlin");
}
