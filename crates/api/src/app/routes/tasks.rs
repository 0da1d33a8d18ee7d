use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
};

use condohub_tasks::{NewTask, TaskFilter, TaskId, TaskPatch};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/:id", get(get_task).patch(update_task).delete(delete_task))
}

pub async fn list_tasks(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(filter): Query<TaskFilter>,
) -> Response {
    common::respond_items(services.gateways.tasks.list(ctx.actor(), &filter).await)
}

pub async fn get_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Response {
    let id: TaskId = match common::parse_id(&id, "task") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond(StatusCode::OK, services.gateways.tasks.get(ctx.actor(), id).await)
}

pub async fn create_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<NewTask>,
) -> Response {
    common::respond(StatusCode::CREATED, services.gateways.tasks.create(ctx.actor(), body).await)
}

pub async fn update_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<TaskPatch>,
) -> Response {
    let id: TaskId = match common::parse_id(&id, "task") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond(StatusCode::OK, services.gateways.tasks.update(ctx.actor(), id, body).await)
}

pub async fn delete_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Response {
    let id: TaskId = match common::parse_id(&id, "task") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond_deleted(services.gateways.tasks.delete(ctx.actor(), id).await)
}
