use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use std::sync::Arc;
use tracing::{error, warn};

use crate::repository::user_repo::UserRepository;
use crate::util::error::{HandlerError, HandlerErrorKind};
use crate::util::jwt::{Claims, JwtTokenUtils, JwtTokenUtilsImpl};

pub struct AuthState {
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub user_repo: Arc<dyn UserRepository>,
}

/// Validated access-token claims from the `Authorization` header, if any.
pub fn bearer_claims(jwt_utils: &JwtTokenUtilsImpl, req: &Request<Body>) -> Option<Claims> {
    let header = req.headers().get("authorization")?.to_str().ok()?;
    let token = jwt_utils.extract_token_from_header(header).ok()?;
    jwt_utils.validate_access_token(&token).ok()
}

fn unauthorized() -> HandlerError {
    HandlerError::new(HandlerErrorKind::Unauthorized, "Authentication required")
}

fn invalid_token() -> HandlerError {
    HandlerError::new(HandlerErrorKind::Unauthorized, "Invalid token")
}

/// Claims of a token whose account still exists. Email and role are taken from
/// the stored account, not from the token.
async fn account_claims(state: &AuthState, bearer: Option<Claims>) -> Result<Claims, HandlerError> {
    let mut claims = bearer.ok_or_else(unauthorized)?;
    let id = claims.user_id().map_err(|_| invalid_token())?;
    let user = state
        .user_repo
        .find_by_id(&id)
        .await
        .map_err(|e| {
            error!("Failed to load user for token: {}", e);
            HandlerError::new(HandlerErrorKind::Internal, "Internal server error")
        })?
        .ok_or_else(|| {
            warn!(user = %id, "Token for a deleted account");
            invalid_token()
        })?;
    claims.email = user.email;
    claims.role = user.role;
    Ok(claims)
}

/// Requires a valid access token and stores its claims in request extensions.
pub async fn user_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let claims = account_claims(&state, bearer_claims(&state.jwt_utils, &req)).await?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Like [`user_auth`], and additionally requires the admin role.
pub async fn admin_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let claims = account_claims(&state, bearer_claims(&state.jwt_utils, &req)).await?;
    if !claims.is_admin() {
        return Err(HandlerError::new(HandlerErrorKind::Forbidden, "Admin access required"));
    }
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
