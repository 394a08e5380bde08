//! Line store port
//!
//! The hosted backend of record for lines, author profiles and the per-user
//! like/bookmark relation rows. Implementations are provided by adapters
//! (e.g., the REST row API).

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::domain::entities::{LineId, LineRecord, NewLine, TimeWindow, UserId};
use crate::error::StoreError;

#[async_trait]
pub trait LineStore: Send + Sync {
    /// Fetch up to `limit` lines starting at `offset`, newest first with the
    /// larger id winning ties, optionally constrained to `window`.
    /// Each record carries its raw like/bookmark relation rows.
    async fn query_lines(
        &self,
        offset: usize,
        limit: usize,
        window: Option<&TimeWindow>,
    ) -> Result<Vec<LineRecord>, StoreError>;

    /// Look up display names for a batch of authors.
    /// Unknown ids are simply absent from the result.
    async fn resolve_author_names(
        &self,
        author_ids: &HashSet<UserId>,
    ) -> Result<HashMap<UserId, String>, StoreError>;

    /// Insert (`present = true`) or delete the like relation row for `(line_id, user_id)`
    async fn set_like_relation(
        &self,
        line_id: &LineId,
        user_id: &UserId,
        present: bool,
    ) -> Result<(), StoreError>;

    /// Insert (`present = true`) or delete the bookmark relation row for `(line_id, user_id)`
    async fn set_bookmark_relation(
        &self,
        line_id: &LineId,
        user_id: &UserId,
        present: bool,
    ) -> Result<(), StoreError>;

    /// Create a new line and return the stored record
    async fn insert_line(&self, line: &NewLine) -> Result<LineRecord, StoreError>;

    /// The line with the highest like count created within `window`, if any
    async fn top_liked_line(&self, window: &TimeWindow) -> Result<Option<LineRecord>, StoreError>;
}
