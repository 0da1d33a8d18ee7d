use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::{get, post},
};

use condohub_structural::{IssueFilter, IssueId, IssuePatch, NewIssue};

use crate::app::dto::AddPhotoRequest;
use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_issues).post(report_issue))
        .route("/:id", get(get_issue).patch(update_issue).delete(delete_issue))
        .route("/:id/photos", post(add_photo))
}

pub async fn list_issues(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(filter): Query<IssueFilter>,
) -> Response {
    common::respond_items(services.gateways.structural.list(ctx.actor(), &filter).await)
}

/// Issue with its photos.
pub async fn get_issue(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Response {
    let id: IssueId = match common::parse_id(&id, "issue") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond(StatusCode::OK, services.gateways.structural.get(ctx.actor(), id).await)
}

pub async fn report_issue(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<NewIssue>,
) -> Response {
    common::respond(StatusCode::CREATED, services.gateways.structural.create(ctx.actor(), body).await)
}

pub async fn update_issue(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<IssuePatch>,
) -> Response {
    let id: IssueId = match common::parse_id(&id, "issue") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond(StatusCode::OK, services.gateways.structural.update(ctx.actor(), id, body).await)
}

pub async fn delete_issue(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Response {
    let id: IssueId = match common::parse_id(&id, "issue") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond_deleted(services.gateways.structural.delete(ctx.actor(), id).await)
}

pub async fn add_photo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<AddPhotoRequest>,
) -> Response {
    let id: IssueId = match common::parse_id(&id, "issue") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond(
        StatusCode::CREATED,
        services.gateways.structural.add_photo(ctx.actor(), id, &body.url).await,
    )
}
