//! Session-backed identity provider
//!
//! Holds the signed-in user for the lifetime of the client. Sign-in and
//! sign-out come from the auth flow; the feed only ever reads.

use std::sync::{PoisonError, RwLock};

use crate::domain::entities::UserId;
use crate::domain::ports::IdentityProvider;

#[derive(Debug, Default)]
pub struct SessionIdentity {
    current: RwLock<Option<UserId>>,
}

impl SessionIdentity {
    /// An anonymous session
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: UserId) -> Self {
        Self {
            current: RwLock::new(Some(user_id)),
        }
    }

    pub fn sign_in(&self, user_id: UserId) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(user_id);
        tracing::info!(%user_id, "Signed in");
    }

    pub fn sign_out(&self) {
        if let Some(user_id) = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            tracing::info!(%user_id, "Signed out");
        }
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_identity(&self) -> Option<UserId> {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }
}
