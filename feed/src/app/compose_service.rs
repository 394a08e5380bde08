//! Compose service
//!
//! Publishes new lines on behalf of the signed-in user.

use std::sync::Arc;

use crate::app::hydrate::hydrate;
use crate::domain::entities::{Line, LineText, NewLine};
use crate::domain::ports::{IdentityProvider, LineStore};
use crate::error::{FeedError, StoreError};

/// Service for posting new lines
pub struct ComposeService<LS, IP>
where
    LS: LineStore,
    IP: IdentityProvider,
{
    store: Arc<LS>,
    identity: Arc<IP>,
}

impl<LS, IP> ComposeService<LS, IP>
where
    LS: LineStore,
    IP: IdentityProvider,
{
    pub fn new(store: Arc<LS>, identity: Arc<IP>) -> Self {
        Self { store, identity }
    }

    /// Validate and publish `text` as the current user.
    ///
    /// The feed is not touched; callers refresh it to pick the line up.
    pub async fn publish(&self, text: &str) -> Result<Line, FeedError> {
        let author_id = self
            .identity
            .current_identity()
            .ok_or(FeedError::Unauthenticated)?;
        let text: LineText = text.parse().map_err(FeedError::Validation)?;

        let record = self
            .store
            .insert_line(&NewLine { author_id, text })
            .await?;
        tracing::info!(line_id = %record.id, %author_id, "Line published");

        let lines = hydrate(self.store.as_ref(), vec![record], Some(&author_id)).await;
        lines.into_iter().next().ok_or_else(|| {
            StoreError::Deserialization("published line was not returned".to_string()).into()
        })
    }
}
