use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use condohub_core::EnterpriseId;
use condohub_infra::IdentityService;

use crate::app::errors;
use crate::context::{ActorContext, SessionContext};

/// Header selecting the active enterprise.
pub const ENTERPRISE_HEADER: &str = "x-enterprise-id";

#[derive(Clone)]
pub struct AuthState {
    pub identity: Arc<IdentityService>,
}

/// Resolve the bearer token to a live session.
pub async fn session_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers())
        .map_err(|_| errors::json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "missing bearer token"))?;

    let session = state
        .identity
        .authenticate(token)
        .map_err(errors::identity_error_to_response)?;

    req.extensions_mut().insert(SessionContext::new(session));
    Ok(next.run(req).await)
}

/// Bind the session to the enterprise named by `X-Enterprise-Id`, or to the
/// user's only membership. Runs after [`session_middleware`].
pub async fn actor_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let session = req
        .extensions()
        .get::<SessionContext>()
        .cloned()
        .ok_or_else(|| errors::json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "no session"))?;

    let enterprise_id = extract_enterprise(req.headers())?;
    let actor = state
        .identity
        .actor_for(session.session(), enterprise_id)
        .await
        .map_err(errors::identity_error_to_response)?;

    req.extensions_mut().insert(ActorContext::new(actor));
    Ok(next.run(req).await)
}

fn extract_enterprise(headers: &HeaderMap) -> Result<Option<EnterpriseId>, Response> {
    let Some(value) = headers.get(ENTERPRISE_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<EnterpriseId>().ok())
        .map(Some)
        .ok_or_else(|| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid X-Enterprise-Id header"))
}

pub(crate) fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
