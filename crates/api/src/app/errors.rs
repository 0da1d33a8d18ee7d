use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use condohub_auth::AuthzError;
use condohub_core::DomainError;
use condohub_infra::{GatewayError, IdentityError, StoreError};

pub fn gateway_error_to_response(err: GatewayError) -> axum::response::Response {
    match err {
        GatewayError::Domain(e) => domain_error_to_response(e),
        GatewayError::Forbidden(e) => authz_error_to_response(e),
        GatewayError::Store(e) => store_error_to_response(e),
        GatewayError::Password(e) => {
            tracing::error!(error = %e, "password hashing failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}

pub fn identity_error_to_response(err: IdentityError) -> axum::response::Response {
    match err {
        IdentityError::InvalidCredentials | IdentityError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", err.to_string())
        }
        IdentityError::NoMembership(_) => json_error(StatusCode::FORBIDDEN, "tenant_isolation", err.to_string()),
        IdentityError::NoEnterprise => json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string()),
        IdentityError::AmbiguousEnterprise => {
            json_error(StatusCode::BAD_REQUEST, "enterprise_required", err.to_string())
        }
        IdentityError::Domain(e) => domain_error_to_response(e),
        IdentityError::Store(e) => store_error_to_response(e),
        IdentityError::Password(e) => {
            tracing::error!(error = %e, "stored password hash rejected");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvariantViolation(msg) => json_error(StatusCode::BAD_REQUEST, "invariant_violation", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    match err {
        AuthzError::TenantMismatch | AuthzError::MembershipMismatch => {
            json_error(StatusCode::FORBIDDEN, "tenant_isolation", err.to_string())
        }
        _ => json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string()),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::DuplicateKey { .. } => json_error(StatusCode::CONFLICT, "conflict", err.to_string()),
        StoreError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        StoreError::MissingTable(_) | StoreError::Schema { .. } => {
            tracing::error!(error = %err, "store schema error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
        }
        StoreError::Backend(_) => {
            tracing::error!(error = %err, "store backend error");
            json_error(StatusCode::BAD_GATEWAY, "backend_unavailable", err.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
