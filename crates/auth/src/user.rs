//! User accounts (global identities; enterprise access comes from memberships).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use condohub_core::{DomainError, DomainResult, EnterpriseId, Entity, Record, UserId, text};

/// A stored user account.
///
/// # Invariants
/// - `email` is trimmed, lowercased and contains `@`.
/// - `password_hash` is an Argon2id PHC string; the plaintext is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new account, before hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserAccount {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

impl NewUserAccount {
    pub const MIN_PASSWORD_LEN: usize = 8;

    pub fn new(email: &str, display_name: &str, password: &str) -> DomainResult<Self> {
        let email = normalize_email(email)?;
        let display_name = text::required("display name", display_name)?;
        if password.chars().count() < Self::MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {} characters",
                Self::MIN_PASSWORD_LEN
            )));
        }

        Ok(Self {
            email,
            display_name,
            password: password.to_string(),
        })
    }

    /// Build the stored account from an already computed hash.
    pub fn into_account(self, password_hash: String, now: DateTime<Utc>) -> UserAccount {
        UserAccount {
            id: UserId::new(),
            email: self.email,
            display_name: self.display_name,
            password_hash,
            created_at: now,
        }
    }
}

/// Trim + lowercase an email, rejecting obviously malformed input.
pub fn normalize_email(email: &str) -> DomainResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(email)
}

impl Entity for UserAccount {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for UserAccount {
    const TABLE: &'static str = "users";

    fn key(&self) -> uuid::Uuid {
        *self.id.as_uuid()
    }

    fn enterprise_id(&self) -> Option<EnterpriseId> {
        None
    }
}
