use axum::Router;

pub mod admin;
pub mod auth;
pub mod common;
pub mod documents;
pub mod equipment;
pub mod structural;
pub mod suppliers;
pub mod system;
pub mod tasks;
pub mod water;

/// Router for all enterprise-scoped endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/water", water::router())
        .nest("/tasks", tasks::router())
        .nest("/equipment", equipment::router())
        .nest("/structural", structural::router())
        .nest("/documents", documents::router())
        .nest("/suppliers", suppliers::router())
        .nest("/admin", admin::router())
}
