use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
};

use condohub_documents::{DocumentFilter, DocumentId, DocumentPatch, NewDocument};

use crate::app::dto::WindowQuery;
use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_documents).post(upload_document))
        .route("/expiring", get(expiring_documents))
        .route("/:id", get(get_document).patch(update_document).delete(delete_document))
}

pub async fn list_documents(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(filter): Query<DocumentFilter>,
) -> Response {
    common::respond_items(services.gateways.documents.list(ctx.actor(), &filter).await)
}

pub async fn expiring_documents(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(window): Query<WindowQuery>,
) -> Response {
    common::respond_items(services.gateways.documents.expiring(ctx.actor(), window.days()).await)
}

pub async fn get_document(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Response {
    let id: DocumentId = match common::parse_id(&id, "document") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond(StatusCode::OK, services.gateways.documents.get(ctx.actor(), id).await)
}

/// Registers document metadata; the file itself lives behind `fileUrl`.
pub async fn upload_document(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<NewDocument>,
) -> Response {
    common::respond(StatusCode::CREATED, services.gateways.documents.create(ctx.actor(), body).await)
}

pub async fn update_document(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<DocumentPatch>,
) -> Response {
    let id: DocumentId = match common::parse_id(&id, "document") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond(StatusCode::OK, services.gateways.documents.update(ctx.actor(), id, body).await)
}

pub async fn delete_document(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Response {
    let id: DocumentId = match common::parse_id(&id, "document") {
        Ok(v) => v,
        Err(r) => return r,
    };
    common::respond_deleted(services.gateways.documents.delete(ctx.actor(), id).await)
}
