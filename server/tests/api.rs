//! Route table exercised end to end over the full middleware stack.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use aapkaun_server::{build_app, config::Config};
use aapkaun_testing::test_clock;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let mut config = Config::default();
    config.auth.jwt_secret = "integration-secret".to_string();
    config.auth.password_work_factor = 4;
    build_app(&config, Arc::new(test_clock())).unwrap()
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn ada() -> Value {
    json!({
        "email": "ada@example.com",
        "password": "secret1",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "company": "Analytical Engines"
    })
}

async fn sign_up(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(post_json("/api/signup", &ada()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await["response"]["token"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_sign_up_then_session() {
    let app = app();
    let token = sign_up(&app).await;

    let response = app
        .clone()
        .oneshot(get_with_token("/api/session", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-correlation-id"));
    let body = json_body(response).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["description"], "Session");
    assert_eq!(body["response"]["name"], "Ada Lovelace");
}

#[tokio::test]
async fn test_duplicate_sign_up_is_rejected() {
    let app = app();
    sign_up(&app).await;

    let response = app.oneshot(post_json("/api/signup", &ada())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["errorClass"], "validation_failed");
    assert_eq!(body["errorDescription"], "User Already Exists");
}

#[tokio::test]
async fn test_sign_in_and_list_users() {
    let app = app();
    sign_up(&app).await;

    let signed_in = app
        .clone()
        .oneshot(post_json(
            "/api/signin",
            &json!({ "email": "ada@example.com", "password": "secret1" }),
        ))
        .await
        .unwrap();
    assert_eq!(signed_in.status(), StatusCode::OK);
    let token = json_body(signed_in).await["response"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    let listed = app
        .clone()
        .oneshot(get_with_token("/api/users", &token))
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    let body = json_body(listed).await;
    assert_eq!(body["response"]["count"], 1);

    let id = body["response"]["users"][0]["id"].as_str().unwrap().to_string();
    let fetched = app
        .oneshot(get_with_token(&format!("/api/users/{id}"), &token))
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(json_body(fetched).await["response"]["user"]["email"], "ada@example.com");
}

#[tokio::test]
async fn test_secured_routes_without_valid_token() {
    let app = app();

    for request in [
        Request::get("/api/session").body(Body::empty()).unwrap(),
        get_with_token("/api/users", "not-a-jwt"),
    ] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["errorClass"], "auth_failed");
        assert_eq!(body["errorDescription"], "Invalid or missing auth token");
    }
}

#[tokio::test]
async fn test_text_body_that_is_not_json_counts_as_empty() {
    let response = app()
        .oneshot(
            Request::post("/api/signin")
                .body(Body::from("email=ada@example.com"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = json_body(response).await["errorDescription"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(message.contains("\"email\" is required"), "{message}");
    assert!(message.contains("\"password\" is required"), "{message}");
}

#[tokio::test]
async fn test_unknown_route_is_not_found_envelope() {
    let response = app()
        .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["code"], 1);
    assert_eq!(body["errorClass"], "not_found");
}

#[tokio::test]
async fn test_invoke_event_entry_point() {
    let app = app();
    let event = json!({
        "body": ada().to_string(),
        "headers": { "Referer": "https://example.com" }
    });

    let response = app.oneshot(post_json("/invoke/sign_up", &event)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let record = json_body(response).await;
    assert_eq!(record["statusCode"], 200);
    assert_eq!(record["headers"]["Access-Control-Allow-Origin"], "*");
    assert_eq!(record["body"]["response"]["token_type"], "bearer");
}

#[tokio::test]
async fn test_health_and_readiness() {
    let app = app();

    let health = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let ready = app
        .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
    assert_eq!(json_body(ready).await["endpoints"].as_array().unwrap().len(), 5);
}
