use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
};

use condohub_water::{NewReading, ReadingFilter, ReadingId, ReadingPatch};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_readings).post(create_reading))
        .route("/summary", get(consumption_summary))
        .route("/:id", get(get_reading).patch(update_reading).delete(delete_reading))
}

pub async fn list_readings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(filter): Query<ReadingFilter>,
) -> Response {
    common::respond_items(services.gateways.water.list(ctx.actor(), &filter).await)
}

/// Per-unit consumption totals.
pub async fn consumption_summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> Response {
    common::respond_items(services.gateways.water.summary(ctx.actor()).await)
}

pub async fn get_reading(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Response {
    let id: ReadingId = match common::parse_id(&id, "reading") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond(StatusCode::OK, services.gateways.water.get(ctx.actor(), id).await)
}

pub async fn create_reading(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<NewReading>,
) -> Response {
    common::respond(StatusCode::CREATED, services.gateways.water.create(ctx.actor(), body).await)
}

pub async fn update_reading(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<ReadingPatch>,
) -> Response {
    let id: ReadingId = match common::parse_id(&id, "reading") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond(StatusCode::OK, services.gateways.water.update(ctx.actor(), id, body).await)
}

pub async fn delete_reading(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Response {
    let id: ReadingId = match common::parse_id(&id, "reading") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond_deleted(services.gateways.water.delete(ctx.actor(), id).await)
}
