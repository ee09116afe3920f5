mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use common::TestContext;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt; // for .oneshot()
use woostaa_backend::model::catalog::ServiceKind;
use woostaa_backend::model::order::OrderStatus;

async fn send(router: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, value)
}

#[tokio::test]
async fn test_create_order_requires_token() {
    let ctx = TestContext::new();
    let router = ctx.router();
    let (status, body) = send(&router, Method::POST, "/api/orders/create", None, Some(json!({ "serviceId": "x" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication required");
}

#[tokio::test]
async fn test_create_order_returns_created() {
    let ctx = TestContext::new();
    let user = ctx.add_customer().await;
    let service = ctx.add_service(ServiceKind::Maid, Some(200.0)).await;
    let token = ctx.access_token(&user);
    let router = ctx.router();

    let payload = json!({
        "serviceId": service.id.unwrap().to_hex(),
        "planType": "hourly",
        "scheduledDate": "2026-11-02",
        "scheduledTime": "10:00 AM",
        "duration": 150,
        "selectedFactors": [{ "factorName": "BHK", "selectedOption": "3BHK", "additionalCost": 50 }],
        "paymentMethod": "cash"
    });
    let (status, body) = send(&router, Method::POST, "/api/orders/create", Some(&token), Some(payload)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["totalAmount"], 650.0);
    assert_eq!(body["order"]["paymentMethod"], "cod");
    assert!(body["order"]["orderNumber"].as_str().unwrap().starts_with("WOS"));
    assert!(body["order"].get("razorpayOrderId").is_none());
    assert_eq!(body["message"], "Order created successfully");
    assert_eq!(body["order"]["id"].as_str().unwrap().len(), 24);
}

#[tokio::test]
async fn test_ineligible_user_gets_requirement_flags() {
    let ctx = TestContext::new();
    let user = ctx.add_user("nophone@example.com", "", false).await;
    let service = ctx.add_service(ServiceKind::Cook, None).await;
    let token = ctx.access_token(&user);
    let router = ctx.router();

    let payload = json!({
        "serviceId": service.id.unwrap().to_hex(),
        "totalAmount": 949,
        "preferredDate": "2026-11-05",
        "preferredTime": "14:30"
    });
    let (status, body) = send(&router, Method::POST, "/api/orders/create", Some(&token), Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["needsPhone"], true);
    assert_eq!(body["needsProfile"], true);
    assert!(ctx.orders.all().is_empty());
}

#[tokio::test]
async fn test_unknown_service_is_404() {
    let ctx = TestContext::new();
    let user = ctx.add_customer().await;
    let token = ctx.access_token(&user);
    let router = ctx.router();

    let payload = json!({
        "serviceId": bson::oid::ObjectId::new().to_hex(),
        "totalAmount": 949,
        "preferredDate": "2026-11-05",
        "preferredTime": "14:30"
    });
    let (status, body) = send(&router, Method::POST, "/api/orders/create", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Service not found");
}

#[tokio::test]
async fn test_cancel_and_admin_status_routes() {
    let ctx = TestContext::new();
    let user = ctx.add_customer().await;
    let admin = ctx.add_admin().await;
    let service = ctx.add_service(ServiceKind::CarWash, None).await;
    let user_token = ctx.access_token(&user);
    let admin_token = ctx.access_token(&admin);
    let router = ctx.router();

    let payload = json!({
        "serviceId": service.id.unwrap().to_hex(),
        "totalAmount": 499,
        "preferredDate": "2026-11-05",
        "preferredTime": "08:00"
    });
    let (_, created) = send(&router, Method::POST, "/api/orders/create", Some(&user_token), Some(payload)).await;
    let order_id = created["order"]["id"].as_str().unwrap().to_string();

    // customers cannot reach admin routes
    let status_uri = format!("/api/orders/admin/{}/status", order_id);
    let (status, body) = send(&router, Method::PUT, &status_uri, Some(&user_token), Some(json!({ "status": "in_progress" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required");

    let (status, body) = send(
        &router,
        Method::PUT,
        &status_uri,
        Some(&admin_token),
        Some(json!({ "status": "in_progress", "notes": "Crew on the way" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order status updated successfully");
    assert_eq!(body["order"]["status"], "in_progress");
    assert_eq!(body["order"]["adminNotes"], "Crew on the way");

    let cancel_uri = format!("/api/orders/{}/cancel", order_id);
    let (status, body) = send(&router, Method::PUT, &cancel_uri, Some(&user_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot cancel order at this stage");
    assert_eq!(ctx.orders.all()[0].status, OrderStatus::InProgress);
}

#[tokio::test]
async fn test_admin_order_listing() {
    let ctx = TestContext::new();
    let admin = ctx.add_admin().await;
    let router = ctx.router();

    let (status, body) = send(&router, Method::GET, "/api/orders/admin/all?page=1&limit=5", Some(&ctx.access_token(&admin)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"], json!([]));
    assert_eq!(body["pagination"]["limit"], 5);
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_unknown_order_id_is_404() {
    let ctx = TestContext::new();
    let user = ctx.add_customer().await;
    let router = ctx.router();
    let (status, _) = send(&router, Method::GET, "/api/orders/not-an-id", Some(&ctx.access_token(&user)), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_visitor_cookie() {
    let ctx = TestContext::new();
    let router = ctx.router();

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/api/services").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("visitorId="));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/services")
                .header("x-visitor-id", "returning-visitor")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_token_of_deleted_account_is_rejected() {
    let ctx = TestContext::new();
    let user = ctx.add_customer().await;
    let admin = ctx.add_admin().await;
    let user_token = ctx.access_token(&user);
    let admin_token = ctx.access_token(&admin);
    let router = ctx.router();

    let (status, _) = send(&router, Method::GET, "/api/orders/my-orders", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let delete_uri = format!("/api/admin/users/{}", user.id.unwrap().to_hex());
    let (status, _) = send(&router, Method::DELETE, &delete_uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&router, Method::GET, "/api/orders/my-orders", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn test_admin_role_is_read_from_stored_account() {
    let ctx = TestContext::new();
    let admin = ctx.add_admin().await;
    let admin_token = ctx.access_token(&admin);
    let router = ctx.router();

    ctx.users.users.lock().unwrap()[0].role = "user".to_string();
    let (status, body) = send(&router, Method::GET, "/api/orders/admin/all", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required");

    ctx.users.users.lock().unwrap().clear();
    let (status, _) = send(&router, Method::GET, "/api/orders/admin/all", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_huge_page_number_returns_empty_page() {
    let ctx = TestContext::new();
    let user = ctx.add_customer().await;
    let router = ctx.router();

    let (status, body) = send(
        &router,
        Method::GET,
        "/api/orders/my-orders?page=18446744073709551615&limit=20",
        Some(&ctx.access_token(&user)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"], json!([]));
}
