mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use common::{TestContext, TEST_PASSWORD};
use serde_json::{json, Value};
use tower::ServiceExt; // for .oneshot()
use woostaa_backend::util::jwt::JwtTokenUtils;

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_register_handler() {
    let ctx = TestContext::new();
    let app = ctx.router();

    let body = json!({
        "email": "new.user@example.com",
        "password": TEST_PASSWORD,
        "fullName": "New User",
        "phone": "9876501234"
    });
    let resp = app.clone().oneshot(json_request("POST", "/api/auth/register", body.clone())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json = body_json(resp).await;
    assert!(json["message"].as_str().unwrap().starts_with("User registered successfully"));

    // within the resend cooldown
    let resp = app.oneshot(json_request("POST", "/api/auth/register", body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_validation() {
    let ctx = TestContext::new();
    let body = json!({ "email": "not-an-email", "password": "123", "fullName": "", "phone": "9876501234" });
    let resp = ctx.router().oneshot(json_request("POST", "/api/auth/register", body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "Validation");
}

#[tokio::test]
async fn test_login_handler() {
    let ctx = TestContext::new();
    ctx.add_customer().await;

    let body = json!({ "email": "asha@example.com", "password": TEST_PASSWORD });
    let resp = ctx.router().oneshot(json_request("POST", "/api/auth/login", body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["message"], "Login successful");
    assert_eq!(json["user"]["email"], "asha@example.com");
    assert!(json["user"].get("passwordHash").is_none());
    assert_eq!(json["tokens"]["token_type"], "Bearer");
}

#[tokio::test]
async fn test_login_unverified_sets_flag() {
    let ctx = TestContext::new();
    ctx.add_customer().await;
    ctx.users.users.lock().unwrap()[0].is_verified = false;

    let body = json!({ "email": "asha@example.com", "password": TEST_PASSWORD });
    let resp = ctx.router().oneshot(json_request("POST", "/api/auth/login", body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["needsVerification"], true);
}

#[tokio::test]
async fn test_refresh_token_handler() {
    let ctx = TestContext::new();
    let user = ctx.add_customer().await;
    let pair = ctx
        .services
        .jwt_utils
        .generate_token_pair(&user.id.unwrap().to_hex(), &user.email, &user.role)
        .unwrap();

    let app = ctx.router();
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/refresh-token", json!({ "refreshToken": pair.refresh_token })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert!(json["access_token"].as_str().is_some());

    let resp = app
        .oneshot(json_request("POST", "/api/auth/refresh-token", json!({ "refreshToken": "not-a-real-refresh-token" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_email_redirects_to_login() {
    let ctx = TestContext::new();
    let user = ctx.add_customer().await;
    {
        let mut users = ctx.users.users.lock().unwrap();
        users[0].is_verified = false;
        users[0].verification_token = Some("verify-me".to_string());
    }

    let app = ctx.router();
    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/api/auth/verify-email?token=verify-me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "https://woostaa.test/login?verified=true");
    assert!(ctx.users.users.lock().unwrap()[0].is_verified);
    assert_eq!(ctx.users.users.lock().unwrap()[0].id, user.id);

    let resp = app
        .oneshot(Request::builder().uri("/api/auth/verify-email").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_requires_token() {
    let ctx = TestContext::new();
    let user = ctx.add_customer().await;
    let app = ctx.router();

    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/api/auth/profile").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let mut req = json_request("PUT", "/api/auth/profile", json!({ "landmark": "Opp. Forum Mall" }));
    req.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", ctx.access_token(&user)).parse().unwrap(),
    );
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["message"], "Profile updated successfully");
    assert_eq!(json["user"]["profile"]["landmark"], "Opp. Forum Mall");
}

#[tokio::test]
async fn test_forgot_password_does_not_reveal_accounts() {
    let ctx = TestContext::new();
    let resp = ctx
        .router()
        .oneshot(json_request("POST", "/api/auth/forgot-password", json!({ "email": "nobody@example.com" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert!(json["message"].as_str().unwrap().starts_with("If an account with this email exists"));
}
