//! Login, sessions and membership resolution.
//!
//! Sessions are opaque tokens held in process memory. They expire after the
//! configured TTL, are dropped on logout and do not survive a restart.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use condohub_auth::user::normalize_email;
use condohub_auth::{
    Actor, Membership, NewUserAccount, NotificationMap, PasswordError, PermissionMap, Role, Session,
    UserAccount, hash_password, validate_session, verify_password,
};
use condohub_core::{DomainError, EnterpriseId, UserId};

use crate::config::BootstrapSettings;
use crate::enterprise::Enterprise;
use crate::store::{Query, StoreError, Table};
use crate::tables::Tables;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// Unknown email or wrong password; the two are not distinguished.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("missing, expired or revoked session")]
    Unauthenticated,

    #[error("no membership in enterprise {0}")]
    NoMembership(EnterpriseId),

    #[error("user does not belong to any enterprise")]
    NoEnterprise,

    #[error("user has several memberships; select one with the X-Enterprise-Id header")]
    AmbiguousEnterprise,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub session: Session,
    pub user: UserSummary,
    pub memberships: Vec<Membership>,
}

/// Account fields safe to return to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
}

impl From<&UserAccount> for UserSummary {
    fn from(u: &UserAccount) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            display_name: u.display_name.clone(),
        }
    }
}

pub struct IdentityService {
    users: Table<UserAccount>,
    memberships: Table<Membership>,
    enterprises: Table<Enterprise>,
    sessions: RwLock<HashMap<String, Session>>,
    pepper: Option<String>,
    ttl: Duration,
}

impl IdentityService {
    pub fn new(tables: &Tables, pepper: Option<String>, ttl: Duration) -> Self {
        Self {
            users: tables.users.clone(),
            memberships: tables.memberships.clone(),
            enterprises: tables.enterprises.clone(),
            sessions: RwLock::new(HashMap::new()),
            pepper,
            ttl,
        }
    }

    fn pepper(&self) -> Option<&str> {
        self.pepper.as_deref()
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, IdentityError> {
        let email = normalize_email(email)?;
        let found = self.users.find(&Query::all().eq("email", email)).await?;
        Ok(found.into_iter().next())
    }

    pub async fn user(&self, user_id: UserId) -> Result<UserAccount, IdentityError> {
        Ok(self.users.get(None, *user_id.as_uuid()).await?)
    }

    /// Every membership of the user, across enterprises.
    pub async fn memberships_for(&self, user_id: UserId) -> Result<Vec<Membership>, IdentityError> {
        Ok(self
            .memberships
            .find(&Query::all().eq("userId", user_id.to_string()))
            .await?)
    }

    /// The user's membership in one enterprise, if any.
    pub async fn membership(
        &self,
        user_id: UserId,
        enterprise_id: EnterpriseId,
    ) -> Result<Option<Membership>, IdentityError> {
        let found = self
            .memberships
            .find(&Query::scoped(enterprise_id).eq("userId", user_id.to_string()))
            .await?;
        Ok(found.into_iter().next())
    }

    /// Create an account. Fails with a conflict when the email is taken.
    pub async fn register_account(&self, input: NewUserAccount) -> Result<UserAccount, IdentityError> {
        if self.find_user_by_email(&input.email).await?.is_some() {
            return Err(DomainError::conflict(format!("email '{}' is already registered", input.email)).into());
        }
        let hash = hash_password(&input.password, self.pepper())?;
        let account = input.into_account(hash, Utc::now());
        self.users.insert(&account).await?;
        tracing::info!(user_id = %account.id, "user account created");
        Ok(account)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, IdentityError> {
        let user = match self.find_user_by_email(email).await {
            Ok(Some(user)) => user,
            Ok(None) | Err(IdentityError::Domain(_)) => return Err(IdentityError::InvalidCredentials),
            Err(e) => return Err(e),
        };
        if !verify_password(password, &user.password_hash, self.pepper())? {
            tracing::info!(user_id = %user.id, "login rejected");
            return Err(IdentityError::InvalidCredentials);
        }

        let now = Utc::now();
        let session = Session::issue(user.id, user.email.clone(), now, self.ttl);
        let memberships = self.memberships_for(user.id).await?;
        {
            let mut sessions = self
                .sessions
                .write()
                .map_err(|_| StoreError::Backend("session table lock poisoned".to_string()))?;
            let before = sessions.len();
            sessions.retain(|_, s| validate_session(s, now).is_ok());
            if sessions.len() < before {
                tracing::debug!(pruned = before - sessions.len(), "expired sessions removed");
            }
            sessions.insert(session.token.as_str().to_string(), session.clone());
        }

        tracing::info!(user_id = %user.id, memberships = memberships.len(), "login succeeded");
        Ok(LoginOutcome {
            session,
            user: UserSummary::from(&user),
            memberships,
        })
    }

    /// Number of sessions currently held, expired ones included.
    pub fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Drop a session. Returns whether it existed.
    pub fn logout(&self, token: &str) -> bool {
        self.sessions
            .write()
            .map(|mut s| s.remove(token).is_some())
            .unwrap_or(false)
    }

    /// Resolve a bearer token to a live session. Expired sessions are removed.
    pub fn authenticate(&self, token: &str) -> Result<Session, IdentityError> {
        let session = self
            .sessions
            .read()
            .map_err(|_| IdentityError::Unauthenticated)?
            .get(token)
            .cloned()
            .ok_or(IdentityError::Unauthenticated)?;

        if validate_session(&session, Utc::now()).is_err() {
            self.logout(token);
            return Err(IdentityError::Unauthenticated);
        }
        Ok(session)
    }

    /// Bind the session's user to an enterprise.
    ///
    /// Without an explicit enterprise the user's only membership is used; a
    /// user with several memberships must choose.
    pub async fn actor_for(
        &self,
        session: &Session,
        enterprise_id: Option<EnterpriseId>,
    ) -> Result<Actor, IdentityError> {
        let membership = match enterprise_id {
            Some(e) => self
                .membership(session.user_id, e)
                .await?
                .ok_or(IdentityError::NoMembership(e))?,
            None => {
                let mut all = self.memberships_for(session.user_id).await?;
                match all.len() {
                    1 => all.remove(0),
                    0 => return Err(IdentityError::NoEnterprise),
                    _ => return Err(IdentityError::AmbiguousEnterprise),
                }
            }
        };
        let enterprise_id = membership.enterprise_id;
        Actor::new(session.user_id, session.email.clone(), membership)
            .map_err(|_| IdentityError::NoMembership(enterprise_id))
    }

    /// Create the first enterprise and its administrator when none exist.
    pub async fn bootstrap(&self, settings: &BootstrapSettings) -> Result<Option<Enterprise>, IdentityError> {
        if !self.enterprises.find(&Query::all()).await?.is_empty() {
            return Ok(None);
        }

        let now = Utc::now();
        let enterprise = Enterprise::create(&settings.enterprise_name, None, now)?;
        self.enterprises.insert(&enterprise).await?;

        let admin = match self.find_user_by_email(&settings.admin_email).await? {
            Some(existing) => existing,
            None => {
                let input = NewUserAccount::new(
                    &settings.admin_email,
                    &settings.admin_name,
                    &settings.admin_password,
                )?;
                self.register_account(input).await?
            }
        };

        let membership = Membership::provision(
            admin.id,
            enterprise.id,
            Role::Admin,
            PermissionMap::new(),
            NotificationMap::filled(true),
            now,
        );
        self.memberships.insert(&membership).await?;

        tracing::info!(
            enterprise_id = %enterprise.id,
            admin = %admin.email,
            "bootstrapped first enterprise"
        );
        Ok(Some(enterprise))
    }
}

impl core::fmt::Debug for IdentityService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdentityService")
            .field("sessions", &self.session_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}
