//! End-to-end API tests over the in-memory backend.
//!
//! Each test drives the real router (routes, extractors, error mapping)
//! through `tower::ServiceExt::oneshot`, with `MemoryStore` standing in for
//! `PostgreSQL` and the synthetic gateway settling payments.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use coursehaven_server::config::ServerConfig;
use coursehaven_server::db::MemoryStore;
use coursehaven_server::routes;
use coursehaven_server::services::SyntheticGateway;
use coursehaven_server::state::AppState;

fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from("postgres://localhost/unused"),
        host: "127.0.0.1".parse().unwrap(),
        port: 4000,
        frontend_origin: "http://localhost:5174".to_owned(),
        jwt_user_secret: SecretString::from("u".repeat(48)),
        jwt_admin_secret: SecretString::from("a".repeat(48)),
        token_ttl_secs: 3600,
        sentry_dsn: None,
    }
}

fn app_with_store() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(test_config(), store.clone(), Arc::new(SyntheticGateway));
    (routes::routes().with_state(state), store)
}

fn app() -> Router {
    app_with_store().0
}

fn request(
    method: &str,
    uri: &str,
    body: Option<&Value>,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));
    builder.body(body).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response: Response<_> = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn admin_token(app: &Router) -> String {
    let signup = json!({
        "firstName": "Grace",
        "lastName": "Hopper",
        "email": "grace@example.com",
        "password": "compilers4ever",
    });
    let (status, _) = send(app, request("POST", "/api/v1/admin/signup", Some(&signup), None)).await;
    assert_eq!(status, StatusCode::CREATED);

    let login = json!({ "email": "grace@example.com", "password": "compilers4ever" });
    let (status, body) = send(app, request("POST", "/api/v1/admin/login", Some(&login), None)).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_owned()
}

async fn user_token(app: &Router, email: &str) -> String {
    let signup = json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": email,
        "password": "analytical-engine",
    });
    let (status, _) = send(app, request("POST", "/api/v1/user/signup", Some(&signup), None)).await;
    assert_eq!(status, StatusCode::CREATED);

    let login = json!({ "email": email, "password": "analytical-engine" });
    let (status, body) = send(app, request("POST", "/api/v1/user/login", Some(&login), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login success");
    body["token"].as_str().unwrap().to_owned()
}

async fn create_course(app: &Router, token: &str) -> i64 {
    let course = json!({
        "title": "Rust for Web",
        "description": "Build APIs with axum",
        "price": "499",
        "image": {
            "publicId": "img-1",
            "url": "https://images.example.com/img-1.png",
        },
    });
    let (status, body) = send(
        app,
        request("POST", "/api/v1/course/create", Some(&course), Some(token)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Course created successfully");
    body["course"]["id"].as_i64().unwrap()
}

fn payment_body(course_id: i64, card_number: &str) -> Value {
    json!({
        "courseId": course_id,
        "cardNumber": card_number,
        "cardHolder": "JOHN DOE",
        "expiryMonth": "12",
        "expiryYear": "99",
        "cvv": "123",
        "pin": "1234",
    })
}

#[tokio::test]
async fn test_full_purchase_flow() {
    let app = app();

    let admin = admin_token(&app).await;
    let course_id = create_course(&app, &admin).await;
    let user = user_token(&app, "ada@example.com").await;

    // Purchase the course.
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/payment/process",
            Some(&payment_body(course_id, "4111111111111111")),
            Some(&user),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Payment successful");
    assert!(body["transactionId"].as_str().unwrap().starts_with("TXN"));
    assert_eq!(body["purchase"]["courseId"].as_i64().unwrap(), course_id);

    // The purchase shows up in the purchases view, paired with its course.
    let (status, body) = send(
        &app,
        request("GET", "/api/v1/user/purchases", None, Some(&user)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["purchases"].as_array().unwrap().len(), 1);
    let courses = body["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["title"], "Rust for Web");
    assert_eq!(courses[0]["price"], "499");
}

#[tokio::test]
async fn test_second_purchase_is_rejected() {
    let app = app();

    let admin = admin_token(&app).await;
    let course_id = create_course(&app, &admin).await;
    let user = user_token(&app, "ada@example.com").await;

    let pay = || {
        request(
            "POST",
            "/api/v1/payment/process",
            Some(&payment_body(course_id, "4111111111111111")),
            Some(&user),
        )
    };

    let (status, _) = send(&app, pay()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, pay()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], "Course already purchased");

    // Still exactly one purchase on record.
    let (_, body) = send(
        &app,
        request("GET", "/api/v1/user/purchases", None, Some(&user)),
    )
    .await;
    assert_eq!(body["purchases"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_declined_card() {
    let app = app();

    let admin = admin_token(&app).await;
    let course_id = create_course(&app, &admin).await;
    let user = user_token(&app, "ada@example.com").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/payment/process",
            Some(&payment_body(course_id, "1111222233330000")),
            Some(&user),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], "Invalid card number");

    // Nothing was recorded.
    let (_, body) = send(
        &app,
        request("GET", "/api/v1/user/purchases", None, Some(&user)),
    )
    .await;
    assert!(body["purchases"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_expired_card() {
    let app = app();

    let admin = admin_token(&app).await;
    let course_id = create_course(&app, &admin).await;
    let user = user_token(&app, "ada@example.com").await;

    let mut body = payment_body(course_id, "4111111111111111");
    body["expiryYear"] = json!("20");

    let (status, body) = send(
        &app,
        request("POST", "/api/v1/payment/process", Some(&body), Some(&user)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], "Card has expired");
}

#[tokio::test]
async fn test_payment_validation_errors() {
    let app = app();
    let user = user_token(&app, "ada@example.com").await;

    let (status, body) = send(
        &app,
        request("POST", "/api/v1/payment/process", Some(&json!({})), Some(&user)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let errors = body["errors"].as_array().unwrap();
    let fields: Vec<&str> = errors.iter().map(|e| e["field"].as_str().unwrap()).collect();
    assert!(fields.contains(&"courseId"));
    assert!(fields.contains(&"cardNumber"));
    assert!(fields.contains(&"cvv"));
}

#[tokio::test]
async fn test_payment_unknown_course() {
    let app = app();
    let user = user_token(&app, "ada@example.com").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/payment/process",
            Some(&payment_body(4040, "4111111111111111")),
            Some(&user),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"], "Course not found");
}

#[tokio::test]
async fn test_payment_requires_user_token() {
    let app = app();

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/payment/process",
            Some(&payment_body(1, "4111111111111111")),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errors"], "no token provided");

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/payment/process",
            Some(&payment_body(1, "4111111111111111")),
            Some("garbage-token"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errors"], "invalid token");
}

#[tokio::test]
async fn test_user_token_rejected_on_admin_routes() {
    let app = app();
    let user = user_token(&app, "ada@example.com").await;

    let course = json!({
        "title": "T",
        "description": "D",
        "price": "10",
        "image": { "publicId": "p", "url": "https://example.com/p.png" },
    });
    let (status, body) = send(
        &app,
        request("POST", "/api/v1/course/create", Some(&course), Some(&user)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errors"], "invalid token");
}

#[tokio::test]
async fn test_duplicate_signup_rejected() {
    let app = app();
    user_token(&app, "ada@example.com").await;

    let signup = json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ADA@example.com",
        "password": "analytical-engine",
    });
    let (status, body) = send(&app, request("POST", "/api/v1/user/signup", Some(&signup), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], "User already exists");
}

#[tokio::test]
async fn test_signup_validation_errors() {
    let app = app();

    let signup = json!({
        "firstName": "A",
        "lastName": "B",
        "email": "nope",
        "password": "short",
    });
    let (status, body) = send(&app, request("POST", "/api/v1/user/signup", Some(&signup), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 4);
    assert_eq!(errors[0]["field"], "firstName");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = app();
    user_token(&app, "ada@example.com").await;

    let login = json!({ "email": "ada@example.com", "password": "wrong" });
    let (status, body) = send(&app, request("POST", "/api/v1/user/login", Some(&login), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errors"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_unknown_user() {
    let app = app();

    let login = json!({ "email": "ghost@example.com", "password": "whatever" });
    let (status, body) = send(&app, request("POST", "/api/v1/user/login", Some(&login), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"], "User does not exist");
}

#[tokio::test]
async fn test_course_catalog_public() {
    let app = app();

    let admin = admin_token(&app).await;
    create_course(&app, &admin).await;

    let (status, body) = send(&app, request("GET", "/api/v1/course/courses", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["courses"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_course_details_and_missing_course() {
    let app = app();

    let admin = admin_token(&app).await;
    let course_id = create_course(&app, &admin).await;

    let (status, body) = send(
        &app,
        request("GET", &format!("/api/v1/course/{course_id}"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["course"]["title"], "Rust for Web");

    let (status, body) = send(&app, request("GET", "/api/v1/course/9999", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"], "Course not found");
}

#[tokio::test]
async fn test_course_update_creator_only() {
    let app = app();

    let admin = admin_token(&app).await;
    let course_id = create_course(&app, &admin).await;

    // A different admin may not touch it.
    let signup = json!({
        "firstName": "Second",
        "lastName": "Admin",
        "email": "second@example.com",
        "password": "another-password",
    });
    send(&app, request("POST", "/api/v1/admin/signup", Some(&signup), None)).await;
    let login = json!({ "email": "second@example.com", "password": "another-password" });
    let (_, body) = send(&app, request("POST", "/api/v1/admin/login", Some(&login), None)).await;
    let other_admin = body["token"].as_str().unwrap().to_owned();

    let update = json!({
        "title": "Hijacked",
        "description": "Nope",
        "price": "1",
        "image": { "publicId": "p", "url": "https://example.com/p.png" },
    });
    let (status, body) = send(
        &app,
        request(
            "PUT",
            &format!("/api/v1/course/update/{course_id}"),
            Some(&update),
            Some(&other_admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["errors"], "Course was created by another admin");

    // The creator may.
    let update = json!({
        "title": "Rust for Web, 2nd Edition",
        "description": "Build APIs with axum",
        "price": "599",
        "image": { "publicId": "img-1", "url": "https://images.example.com/img-1.png" },
    });
    let (status, body) = send(
        &app,
        request(
            "PUT",
            &format!("/api/v1/course/update/{course_id}"),
            Some(&update),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["course"]["title"], "Rust for Web, 2nd Edition");
    assert_eq!(body["course"]["price"], "599");
}

#[tokio::test]
async fn test_course_delete_creator_only() {
    let app = app();

    let admin = admin_token(&app).await;
    let course_id = create_course(&app, &admin).await;

    let (status, body) = send(
        &app,
        request(
            "DELETE",
            &format!("/api/v1/course/delete/{course_id}"),
            None,
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Course deleted successfully");

    let (status, _) = send(
        &app,
        request("GET", &format!("/api/v1/course/{course_id}"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_course_create_missing_fields() {
    let app = app();
    let admin = admin_token(&app).await;

    let course = json!({ "title": "Only a title" });
    let (status, body) = send(
        &app,
        request("POST", "/api/v1/course/create", Some(&course), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], "All fields are required");
}

#[tokio::test]
async fn test_price_snapshot_survives_price_change() {
    let (app, store) = app_with_store();

    let admin = admin_token(&app).await;
    let course_id = create_course(&app, &admin).await;
    let user = user_token(&app, "ada@example.com").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/payment/process",
            Some(&payment_body(course_id, "4111111111111111")),
            Some(&user),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let transaction_id = body["transactionId"].as_str().unwrap().to_owned();
    assert!(!transaction_id.is_empty());

    // Raising the price afterwards must not affect the committed purchase.
    let update = json!({
        "title": "Rust for Web",
        "description": "Build APIs with axum",
        "price": "999",
        "image": { "publicId": "img-1", "url": "https://images.example.com/img-1.png" },
    });
    let (status, _) = send(
        &app,
        request(
            "PUT",
            &format!("/api/v1/course/update/{course_id}"),
            Some(&update),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        request("GET", "/api/v1/user/purchases", None, Some(&user)),
    )
    .await;
    assert_eq!(body["purchases"].as_array().unwrap().len(), 1);
    assert_eq!(body["courses"][0]["price"], "999");

    // The payment kept the amount charged at purchase time.
    let payments = store.payments();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount.amount(), rust_decimal::Decimal::from(499));
}
