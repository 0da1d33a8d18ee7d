//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, identity, hooks and gateways
//! - `routes/`: HTTP routes + handlers (one file per module)
//! - `dto.rs`: request/response bodies that are not domain types
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tower::ServiceBuilder;

use condohub_infra::Settings;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(settings: &Settings) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(settings).await?);
    Ok(router(services))
}

/// Route table over already-built services.
pub fn router(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        identity: services.identity.clone(),
    };

    // Module routes: require a session bound to one enterprise.
    let scoped = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state.clone(),
        middleware::actor_middleware,
    ));

    // Session routes: require a valid bearer token only.
    let protected = Router::new()
        .route("/auth/logout", post(routes::auth::logout))
        .route("/me", get(routes::auth::me))
        .merge(scoped)
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::session_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/auth/login", post(routes::auth::login))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}

pub use services::AppServices;
