//! Record hydration
//!
//! Turns raw store records into feed lines: one batched author lookup, then
//! per-viewer relation flags. Shared by every service that reads lines.

use std::collections::HashSet;

use crate::domain::entities::{Line, LineRecord, UserId, UNKNOWN_AUTHOR};
use crate::domain::ports::LineStore;

/// Resolve authors and annotate `records` for `viewer`, preserving order.
///
/// A failed author lookup does not fail the read: every author falls back to
/// `UNKNOWN_AUTHOR`.
pub async fn hydrate<LS>(store: &LS, records: Vec<LineRecord>, viewer: Option<&UserId>) -> Vec<Line>
where
    LS: LineStore + ?Sized,
{
    if records.is_empty() {
        return Vec::new();
    }

    let author_ids: HashSet<UserId> = records.iter().map(|r| r.author_id).collect();
    let names = match store.resolve_author_names(&author_ids).await {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!(
                authors = author_ids.len(),
                error = %e,
                "Author lookup failed, falling back to unknown"
            );
            Default::default()
        }
    };

    records
        .into_iter()
        .map(|record| {
            let name = names
                .get(&record.author_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
            record.into_line(name, viewer)
        })
        .collect()
}
