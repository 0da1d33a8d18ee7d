use condohub_auth::{Actor, Session};
use condohub_core::{EnterpriseId, UserId};

/// Authenticated session for a request.
///
/// Present on every route behind the session middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    session: Session,
}

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn user_id(&self) -> UserId {
        self.session.user_id
    }

    pub fn token(&self) -> &str {
        self.session.token.as_str()
    }
}

/// The session's user bound to the active enterprise.
///
/// Immutable; must be present for all module routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    actor: Actor,
}

impl ActorContext {
    pub fn new(actor: Actor) -> Self {
        Self { actor }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn enterprise_id(&self) -> EnterpriseId {
        self.actor.enterprise_id()
    }
}
