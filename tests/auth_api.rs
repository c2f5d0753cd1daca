use actix_web::{test, web, App};
use marketplace_server::configure_routes;
use serde_json::{json, Value};

mod common;

use common::{EMAIL, PASSWORD};

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(common::state(common::store())))
                .configure(|cfg| configure_routes(cfg, false)),
        )
        .await
    };
}

fn has_key(value: &Value, key: &str) -> bool {
    match value {
        Value::Object(map) => map.contains_key(key) || map.values().any(|v| has_key(v, key)),
        Value::Array(items) => items.iter().any(|v| has_key(v, key)),
        _ => false,
    }
}

#[actix_web::test]
async fn test_login_returns_token_without_password() {
    let app = app!();

    let resp = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": EMAIL, "password": PASSWORD }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().map_or(false, |t| !t.is_empty()));
    assert_eq!(body["user"]["email"], EMAIL);
    assert!(!has_key(&body, "password"));
    assert!(!has_key(&body, "password_hash"));
}

#[actix_web::test]
async fn test_unknown_email_and_wrong_password_are_identical() {
    let app = app!();

    let unknown = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "stranger@example.com", "password": PASSWORD }))
        .send_request(&app)
        .await;
    assert_eq!(unknown.status(), 401);
    let unknown: Value = test::read_body_json(unknown).await;

    let wrong = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": EMAIL, "password": "not-it" }))
        .send_request(&app)
        .await;
    assert_eq!(wrong.status(), 401);
    let wrong: Value = test::read_body_json(wrong).await;

    assert_eq!(unknown, json!({ "success": false, "error": "Invalid email or password" }));
    assert_eq!(unknown, wrong);
}

#[actix_web::test]
async fn test_passport_login_shares_the_same_flow() {
    let app = app!();

    let resp = test::TestRequest::post()
        .uri("/api/auth/passport-login")
        .set_json(json!({ "email": EMAIL, "password": PASSWORD }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();

    // Tokens from either path are accepted everywhere
    let me = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .send_request(&app)
        .await;
    assert_eq!(me.status(), 200);
    let me: Value = test::read_body_json(me).await;
    assert_eq!(me["user"]["email"], EMAIL);

    let rejected = test::TestRequest::post()
        .uri("/api/auth/passport-login")
        .set_json(json!({ "email": EMAIL, "password": "nope" }))
        .send_request(&app)
        .await;
    assert_eq!(rejected.status(), 401);
}

#[actix_web::test]
async fn test_malformed_and_incomplete_bodies() {
    let app = app!();

    let resp = test::TestRequest::post()
        .uri("/api/auth/login")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"email\": ")
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "success": false, "error": "Invalid request body" }));

    let resp = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "password": PASSWORD }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Email is required");
}

#[actix_web::test]
async fn test_signup_then_me() {
    let app = app!();

    let resp = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "full_name": "Kabir Das",
            "email": "kabir@example.com",
            "password": "dohas-and-more",
            "mobile_number": "+91 91234 56789"
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();
    assert!(body["user"].get("password_hash").is_none());

    let me = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .send_request(&app)
        .await;
    assert_eq!(me.status(), 200);

    let duplicate = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "full_name": "Someone Else",
            "email": "kabir@example.com",
            "password": "another-password"
        }))
        .send_request(&app)
        .await;
    assert_eq!(duplicate.status(), 409);
}

#[actix_web::test]
async fn test_me_requires_a_valid_token() {
    let app = app!();

    let missing = test::TestRequest::get().uri("/api/auth/me").send_request(&app).await;
    assert_eq!(missing.status(), 401);

    let bogus = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", "Bearer abc.def.ghi"))
        .send_request(&app)
        .await;
    assert_eq!(bogus.status(), 401);
    let body: Value = test::read_body_json(bogus).await;
    assert_eq!(body["error"], "Invalid token");
}

#[actix_web::test]
async fn test_login_body_size_is_bounded() {
    let app = app!();

    let resp = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": EMAIL, "password": "x".repeat(1024 * 1024) }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid request body");
}
