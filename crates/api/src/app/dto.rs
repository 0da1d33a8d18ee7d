use serde::{Deserialize, Serialize};

use condohub_auth::{Affordances, Membership};
use condohub_infra::identity::UserSummary;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AddPhotoRequest {
    pub url: String,
}

/// `?days=N` lookahead window.
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub days: Option<u32>,
}

impl WindowQuery {
    pub const DEFAULT_DAYS: u32 = 30;

    pub fn days(&self) -> u32 {
        self.days.unwrap_or(Self::DEFAULT_DAYS)
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipView {
    #[serde(flatten)]
    pub membership: Membership,
    pub affordances: Vec<Affordances>,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserSummary,
    pub memberships: Vec<MembershipView>,
}
