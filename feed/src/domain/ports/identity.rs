//! Identity port
//!
//! Supplies the currently authenticated user. Reads are synchronous and never
//! suspend, so the feed can consult it at the moment an operation starts.

use crate::domain::entities::UserId;

pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, or `None` for an anonymous viewer
    fn current_identity(&self) -> Option<UserId>;
}
