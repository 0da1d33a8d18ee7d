use std::str::FromStr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use condohub_infra::gateways::GatewayResult;

use crate::app::errors;

/// Parse a path id, answering `400 invalid_id` on failure.
pub fn parse_id<T: FromStr>(raw: &str, what: &'static str) -> Result<T, Response> {
    raw.trim()
        .parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}

pub fn respond<T: Serialize>(status: StatusCode, result: GatewayResult<T>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

/// Lists are wrapped as `{"items": [...]}`.
pub fn respond_items<T: Serialize>(result: GatewayResult<Vec<T>>) -> Response {
    match result {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub fn respond_deleted(result: GatewayResult<()>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}
