//! Highlight service
//!
//! Picks the "line of the day": the most-liked line from yesterday, or from
//! the past week when yesterday was quiet. Failures only ever hide the
//! highlight, they never surface as errors.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::app::feed_controller::FeedSettings;
use crate::app::hydrate::hydrate;
use crate::domain::entities::{DayFilter, Line, LineRecord, TimeWindow};
use crate::domain::ports::{IdentityProvider, LineStore};

/// How far back to look when yesterday has no lines
const FALLBACK_DAYS: i64 = 7;

pub struct HighlightService<LS, IP>
where
    LS: LineStore,
    IP: IdentityProvider,
{
    store: Arc<LS>,
    identity: Arc<IP>,
    settings: FeedSettings,
}

impl<LS, IP> HighlightService<LS, IP>
where
    LS: LineStore,
    IP: IdentityProvider,
{
    pub fn new(store: Arc<LS>, identity: Arc<IP>, settings: FeedSettings) -> Self {
        Self {
            store,
            identity,
            settings,
        }
    }

    /// The line of the day as of `now`, annotated for the current viewer
    pub async fn line_of_the_day(&self, now: DateTime<Utc>) -> Option<Line> {
        let yesterday = DayFilter::containing(now, self.settings.utc_offset)
            .previous()
            .map(|day| day.window(self.settings.utc_offset));

        let mut record = match yesterday {
            Some(window) => self.top_liked(&window).await,
            None => None,
        };
        if record.is_none() {
            let week = TimeWindow::since(now - Duration::days(FALLBACK_DAYS));
            record = self.top_liked(&week).await;
        }

        let record = record?;
        let viewer = self.identity.current_identity();
        hydrate(self.store.as_ref(), vec![record], viewer.as_ref())
            .await
            .into_iter()
            .next()
    }

    async fn top_liked(&self, window: &TimeWindow) -> Option<LineRecord> {
        match self.store.top_liked_line(window).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, start = %window.start, "Line of the day lookup failed");
                None
            }
        }
    }
}
