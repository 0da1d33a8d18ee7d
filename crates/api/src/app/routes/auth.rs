use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use condohub_auth::{Module, affordances};
use condohub_infra::identity::UserSummary;

use crate::app::dto::{LoginRequest, MeResponse, MembershipView};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::SessionContext;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> Response {
    match services.identity.login(&body.email, &body.password).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => errors::identity_error_to_response(e),
    }
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> Response {
    services.identity.logout(session.token());
    tracing::info!(user_id = %session.user_id(), "logged out");
    StatusCode::NO_CONTENT.into_response()
}

/// Current user, every membership and its module affordances.
pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> Response {
    let user = match services.identity.user(session.user_id()).await {
        Ok(u) => u,
        Err(e) => return errors::identity_error_to_response(e),
    };
    let memberships = match services.identity.memberships_for(session.user_id()).await {
        Ok(m) => m,
        Err(e) => return errors::identity_error_to_response(e),
    };

    let memberships = memberships
        .into_iter()
        .map(|membership| MembershipView {
            affordances: Module::ALL.into_iter().map(|m| affordances(&membership, m)).collect(),
            membership,
        })
        .collect();

    (
        StatusCode::OK,
        Json(MeResponse {
            user: UserSummary::from(&user),
            memberships,
        }),
    )
        .into_response()
}
