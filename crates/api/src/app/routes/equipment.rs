use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::{delete, get},
};

use condohub_equipment::{
    CategoryId, CategoryPatch, EquipmentFilter, EquipmentId, EquipmentPatch, MaintenanceId, NewCategory,
    NewEquipment, NewMaintenance,
};

use crate::app::dto::WindowQuery;
use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_equipment).post(create_equipment))
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/:id", axum::routing::patch(update_category).delete(delete_category))
        .route("/maintenance/due", get(maintenance_due))
        .route("/:id", get(get_equipment).patch(update_equipment).delete(delete_equipment))
        .route("/:id/maintenance", get(maintenance_history).post(add_maintenance))
        .route("/:id/maintenance/:record_id", delete(delete_maintenance))
}

// -------------------------
// Categories
// -------------------------

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> Response {
    common::respond_items(services.gateways.equipment.list_categories(ctx.actor()).await)
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<NewCategory>,
) -> Response {
    common::respond(
        StatusCode::CREATED,
        services.gateways.equipment.create_category(ctx.actor(), body).await,
    )
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<CategoryPatch>,
) -> Response {
    let id: CategoryId = match common::parse_id(&id, "category") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond(
        StatusCode::OK,
        services.gateways.equipment.update_category(ctx.actor(), id, body).await,
    )
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Response {
    let id: CategoryId = match common::parse_id(&id, "category") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond_deleted(services.gateways.equipment.delete_category(ctx.actor(), id).await)
}

// -------------------------
// Equipment
// -------------------------

pub async fn list_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(filter): Query<EquipmentFilter>,
) -> Response {
    common::respond_items(services.gateways.equipment.list(ctx.actor(), &filter).await)
}

pub async fn get_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Response {
    let id: EquipmentId = match common::parse_id(&id, "equipment") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond(StatusCode::OK, services.gateways.equipment.get(ctx.actor(), id).await)
}

pub async fn create_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<NewEquipment>,
) -> Response {
    common::respond(StatusCode::CREATED, services.gateways.equipment.create(ctx.actor(), body).await)
}

pub async fn update_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<EquipmentPatch>,
) -> Response {
    let id: EquipmentId = match common::parse_id(&id, "equipment") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond(StatusCode::OK, services.gateways.equipment.update(ctx.actor(), id, body).await)
}

/// Deletes the equipment and its maintenance history.
pub async fn delete_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Response {
    let id: EquipmentId = match common::parse_id(&id, "equipment") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond_deleted(services.gateways.equipment.delete(ctx.actor(), id).await)
}

// -------------------------
// Maintenance
// -------------------------

pub async fn maintenance_history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Response {
    let id: EquipmentId = match common::parse_id(&id, "equipment") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond_items(services.gateways.equipment.history(ctx.actor(), id).await)
}

pub async fn add_maintenance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<NewMaintenance>,
) -> Response {
    let id: EquipmentId = match common::parse_id(&id, "equipment") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond(
        StatusCode::CREATED,
        services.gateways.equipment.add_maintenance(ctx.actor(), id, body).await,
    )
}

pub async fn delete_maintenance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path((id, record_id)): Path<(String, String)>,
) -> Response {
    let id: EquipmentId = match common::parse_id(&id, "equipment") {
        Ok(v) => v,
        Err(r) => return r,
    };
    let record_id: MaintenanceId = match common::parse_id(&record_id, "maintenance") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond_deleted(
        services
            .gateways
            .equipment
            .delete_maintenance(ctx.actor(), id, record_id)
            .await,
    )
}

pub async fn maintenance_due(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(window): Query<WindowQuery>,
) -> Response {
    common::respond_items(
        services
            .gateways
            .equipment
            .maintenance_due(ctx.actor(), window.days())
            .await,
    )
}
