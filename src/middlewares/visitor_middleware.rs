use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Method, Request},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use crate::middlewares::auth_middleware::bearer_claims;
use crate::service::visitor_service::{PageView, VisitorService};
use crate::util::jwt::JwtTokenUtilsImpl;

pub const VISITOR_HEADER: &str = "x-visitor-id";
pub const VISITOR_COOKIE: &str = "visitorId";
const COOKIE_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

pub struct VisitorState {
    pub visitor_service: Arc<dyn VisitorService>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

fn is_tracked(method: &Method, path: &str) -> bool {
    method == Method::GET && path != "/health" && !path.starts_with("/api/admin")
}

fn cookie_value(req: &Request<Body>, name: &str) -> Option<String> {
    req.headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|v| !v.is_empty())
}

fn header_value(req: &Request<Body>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn client_ip(req: &Request<Body>) -> Option<String> {
    header_value(req, "x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string()))
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
}

/// Records page views in the background. Never fails the request.
pub async fn track_visits(
    State(state): State<Arc<VisitorState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !is_tracked(req.method(), req.uri().path()) {
        return next.run(req).await;
    }

    let known_id = header_value(&req, VISITOR_HEADER).or_else(|| cookie_value(&req, VISITOR_COOKIE));
    let is_new = known_id.is_none();
    let visitor_id = known_id.unwrap_or_else(|| Uuid::new_v4().to_string());

    let view = PageView {
        visitor_id: visitor_id.clone(),
        page: req.uri().path().to_string(),
        user_agent: header_value(&req, header::USER_AGENT.as_str()),
        client_ip: client_ip(&req),
        user: bearer_claims(&state.jwt_utils, &req).and_then(|c| c.user_id().ok()),
    };
    let service = state.visitor_service.clone();
    tokio::spawn(async move {
        if let Err(e) = service.track(view).await {
            warn!("Visitor tracking failed: {}", e);
        }
    });

    let mut response = next.run(req).await;
    if is_new {
        let cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            VISITOR_COOKIE, visitor_id, COOKIE_MAX_AGE_SECS
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}
