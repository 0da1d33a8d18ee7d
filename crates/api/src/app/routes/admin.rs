use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
};

use condohub_auth::MembershipPatch;
use condohub_core::UserId;
use condohub_infra::gateways::admin::NewMember;
use condohub_infra::{AuditFilter, EnterpriseSettings};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_members).post(create_member))
        .route("/users/:id", axum::routing::patch(update_membership).delete(delete_membership))
        .route("/users/:id/permissions", get(member_permissions))
        .route("/settings", get(get_settings).put(update_settings))
        .route("/audit-logs", get(audit_logs))
}

pub async fn list_members(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> Response {
    common::respond_items(services.gateways.admin.list_members(ctx.actor()).await)
}

/// Adds a member; unknown emails get a new account.
pub async fn create_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<NewMember>,
) -> Response {
    common::respond(StatusCode::CREATED, services.gateways.admin.create_member(ctx.actor(), body).await)
}

pub async fn update_membership(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<MembershipPatch>,
) -> Response {
    let id: UserId = match common::parse_id(&id, "user") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond(
        StatusCode::OK,
        services.gateways.admin.update_membership(ctx.actor(), id, body).await,
    )
}

pub async fn delete_membership(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Response {
    let id: UserId = match common::parse_id(&id, "user") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond_deleted(services.gateways.admin.delete_membership(ctx.actor(), id).await)
}

/// Effective per-module affordances of one member.
pub async fn member_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Response {
    let id: UserId = match common::parse_id(&id, "user") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond_items(services.gateways.admin.member_affordances(ctx.actor(), id).await)
}

pub async fn get_settings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> Response {
    common::respond(StatusCode::OK, services.gateways.admin.settings(ctx.actor()).await)
}

pub async fn update_settings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<EnterpriseSettings>,
) -> Response {
    common::respond(StatusCode::OK, services.gateways.admin.update_settings(ctx.actor(), body).await)
}

/// Newest first; `?action=` and `?userEmail=` narrow the list.
pub async fn audit_logs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(filter): Query<AuditFilter>,
) -> Response {
    common::respond_items(services.gateways.admin.audit_logs(ctx.actor(), &filter).await)
}
