use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
};

use condohub_suppliers::{NewSupplier, SupplierFilter, SupplierId, SupplierPatch};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route("/:id", get(get_supplier).patch(update_supplier).delete(delete_supplier))
}

pub async fn list_suppliers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(filter): Query<SupplierFilter>,
) -> Response {
    common::respond_items(services.gateways.suppliers.list(ctx.actor(), &filter).await)
}

pub async fn get_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Response {
    let id: SupplierId = match common::parse_id(&id, "supplier") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond(StatusCode::OK, services.gateways.suppliers.get(ctx.actor(), id).await)
}

pub async fn create_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<NewSupplier>,
) -> Response {
    common::respond(StatusCode::CREATED, services.gateways.suppliers.create(ctx.actor(), body).await)
}

pub async fn update_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<SupplierPatch>,
) -> Response {
    let id: SupplierId = match common::parse_id(&id, "supplier") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond(StatusCode::OK, services.gateways.suppliers.update(ctx.actor(), id, body).await)
}

pub async fn delete_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Response {
    let id: SupplierId = match common::parse_id(&id, "supplier") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond_deleted(services.gateways.suppliers.delete(ctx.actor(), id).await)
}
