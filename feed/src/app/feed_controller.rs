//! Feed controller
//!
//! Owns one feed view's state: paginated loading under an optional day filter,
//! refresh invalidation through a generation counter, and optimistic
//! like/bookmark toggles reconciled against the line store.
//!
//! The controller is shared behind `Arc` and every operation takes `&self`.
//! State sits behind a mutex that is never held across an `.await`, so a slow
//! response can land after a newer generation has started; it is discarded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{FixedOffset, Offset, Utc};
use serde::Serialize;

use crate::app::hydrate::hydrate;
use crate::domain::entities::{DayFilter, Line, LineId, RelationKind, TimeWindow, UserId};
use crate::domain::ports::{IdentityProvider, LineStore};
use crate::error::{FeedError, StoreError};

/// Lines requested per page
pub const PAGE_SIZE: usize = 15;

/// What to do with an optimistic toggle when the store rejects the mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePolicy {
    /// Keep the local flip; the next refresh reconciles with the store
    #[default]
    KeepOptimistic,
    /// Undo the local flip if the line still shows it
    Revert,
}

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub page_size: usize,
    /// Viewer's offset from UTC, used to turn a day filter into a time window
    pub utc_offset: FixedOffset,
    pub reconcile: ReconcilePolicy,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            utc_offset: Utc.fix(),
            reconcile: ReconcilePolicy::default(),
        }
    }
}

/// Position of a feed in its load lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedPhase {
    /// Never initialized
    #[default]
    Empty,
    LoadingInitial,
    Populated,
    EmptyResult,
    Errored,
    LoadingMore,
    PopulatedMore,
    PopulatedNoMore,
    ErroredMore,
}

/// Snapshot of a feed, as read by the view
#[derive(Debug, Clone, Serialize)]
pub struct FeedState {
    /// Lines in feed order (newest first, larger id first on ties)
    pub items: Vec<Line>,
    /// Number of rows already fetched under the current filter
    pub cursor: usize,
    pub is_loading_initial: bool,
    pub is_loading_more: bool,
    pub has_more: bool,
    pub date_filter: Option<DayFilter>,
    /// Bumped on every initialize/refresh; fetches from older generations are dropped
    pub generation: u64,
    pub phase: FeedPhase,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
            is_loading_initial: false,
            is_loading_more: false,
            has_more: true,
            date_filter: None,
            generation: 0,
            phase: FeedPhase::Empty,
        }
    }
}

impl FeedState {
    pub fn find(&self, line_id: &LineId) -> Option<&Line> {
        self.items.iter().find(|l| l.id == *line_id)
    }
}

/// Result of a page load that reached the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// A non-empty page was applied
    Loaded { fetched: usize, has_more: bool },
    /// The store returned no rows; pagination is over
    Exhausted,
    /// The request was dropped (load in flight, no more pages, or a day filter is set)
    Skipped,
}

/// Result of a like/bookmark toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The toggle was applied and confirmed by the store
    Applied(Line),
    /// The line is not in the current feed; nothing happened
    NotInFeed,
}

struct PageRequest {
    generation: u64,
    offset: usize,
    window: Option<TimeWindow>,
    is_initial: bool,
}

/// Controller for a single feed view
pub struct FeedController<LS, IP>
where
    LS: LineStore,
    IP: IdentityProvider,
{
    store: Arc<LS>,
    identity: Arc<IP>,
    settings: FeedSettings,
    state: Mutex<FeedState>,
}

impl<LS, IP> FeedController<LS, IP>
where
    LS: LineStore,
    IP: IdentityProvider,
{
    pub fn new(store: Arc<LS>, identity: Arc<IP>, settings: FeedSettings) -> Self {
        Self {
            store,
            identity,
            settings,
            state: Mutex::new(FeedState::default()),
        }
    }

    pub fn settings(&self) -> &FeedSettings {
        &self.settings
    }

    /// Copy of the current feed state
    pub fn snapshot(&self) -> FeedState {
        self.state().clone()
    }

    /// Reset the feed under `date_filter` and load its first page.
    ///
    /// Supersedes any load still in flight from an earlier generation.
    pub async fn initialize(
        &self,
        date_filter: Option<DayFilter>,
    ) -> Result<PageOutcome, FeedError> {
        let request = {
            let mut state = self.state();
            state.generation += 1;
            state.items.clear();
            state.cursor = 0;
            state.has_more = true;
            state.date_filter = date_filter;
            state.is_loading_initial = true;
            state.is_loading_more = false;
            state.phase = FeedPhase::LoadingInitial;

            PageRequest {
                generation: state.generation,
                offset: 0,
                window: date_filter.map(|day| day.window(self.settings.utc_offset)),
                is_initial: true,
            }
        };

        tracing::debug!(
            generation = request.generation,
            date_filter = ?date_filter,
            "Initializing feed"
        );
        self.load_page(request).await
    }

    /// Reload from the top, keeping the current day filter
    pub async fn refresh(&self) -> Result<PageOutcome, FeedError> {
        let date_filter = self.state().date_filter;
        self.initialize(date_filter).await
    }

    /// Load the next page, if there is one and nothing else is loading.
    ///
    /// Day-filtered feeds are single-shot and never paginate.
    pub async fn request_more(&self) -> Result<PageOutcome, FeedError> {
        let request = {
            let mut state = self.state();
            if state.phase == FeedPhase::Empty
                || !state.has_more
                || state.is_loading_initial
                || state.is_loading_more
                || state.date_filter.is_some()
            {
                return Ok(PageOutcome::Skipped);
            }
            state.is_loading_more = true;
            state.phase = FeedPhase::LoadingMore;

            PageRequest {
                generation: state.generation,
                offset: state.cursor,
                window: None,
                is_initial: false,
            }
        };

        self.load_page(request).await
    }

    pub async fn toggle_like(&self, line_id: &LineId) -> Result<ToggleOutcome, FeedError> {
        self.toggle(RelationKind::Like, line_id).await
    }

    pub async fn toggle_bookmark(&self, line_id: &LineId) -> Result<ToggleOutcome, FeedError> {
        self.toggle(RelationKind::Bookmark, line_id).await
    }

    async fn load_page(&self, request: PageRequest) -> Result<PageOutcome, FeedError> {
        let viewer = self.identity.current_identity();
        let fetched = self.fetch(&request, viewer.as_ref()).await;

        let mut state = self.state();
        if state.generation != request.generation {
            tracing::debug!(
                generation = request.generation,
                current = state.generation,
                "Discarding stale page"
            );
            return Err(FeedError::StaleResponse {
                generation: request.generation,
            });
        }

        if request.is_initial {
            state.is_loading_initial = false;
        } else {
            state.is_loading_more = false;
        }

        match fetched {
            Ok(lines) => Ok(self.apply_page(&mut state, &request, lines)),
            Err(e) => {
                if request.is_initial {
                    tracing::warn!(error = %e, "Initial feed load failed");
                    state.items.clear();
                    state.cursor = 0;
                    state.has_more = false;
                    state.phase = FeedPhase::Errored;
                } else {
                    tracing::warn!(
                        error = %e,
                        offset = request.offset,
                        "Loading more lines failed"
                    );
                    state.phase = FeedPhase::ErroredMore;
                }
                Err(FeedError::StoreUnavailable(e))
            }
        }
    }

    async fn fetch(
        &self,
        request: &PageRequest,
        viewer: Option<&UserId>,
    ) -> Result<Vec<Line>, StoreError> {
        let records = self
            .store
            .query_lines(
                request.offset,
                self.settings.page_size,
                request.window.as_ref(),
            )
            .await?;

        Ok(hydrate(self.store.as_ref(), records, viewer).await)
    }

    fn apply_page(&self, state: &mut FeedState, request: &PageRequest, lines: Vec<Line>) -> PageOutcome {
        let fetched = lines.len();

        if fetched == 0 {
            state.has_more = false;
            if request.is_initial {
                state.items.clear();
                state.phase = FeedPhase::EmptyResult;
            } else {
                state.phase = FeedPhase::PopulatedNoMore;
            }
            return PageOutcome::Exhausted;
        }

        if request.is_initial {
            state.items.clear();
        }

        // Offset paging drifts when lines are inserted between pages; drop
        // anything that does not sort strictly after the current tail.
        let mut dropped = 0;
        for line in lines {
            match state.items.last() {
                Some(tail) if !tail.precedes(&line) => dropped += 1,
                _ => state.items.push(line),
            }
        }
        if dropped > 0 {
            tracing::debug!(dropped, "Dropped out-of-order lines from page");
        }

        state.cursor += fetched;
        state.has_more = fetched == self.settings.page_size && state.date_filter.is_none();
        state.phase = match (request.is_initial, state.has_more) {
            (true, _) => FeedPhase::Populated,
            (false, true) => FeedPhase::PopulatedMore,
            (false, false) => FeedPhase::PopulatedNoMore,
        };

        PageOutcome::Loaded {
            fetched,
            has_more: state.has_more,
        }
    }

    async fn toggle(&self, kind: RelationKind, line_id: &LineId) -> Result<ToggleOutcome, FeedError> {
        let viewer = self
            .identity
            .current_identity()
            .ok_or(FeedError::Unauthenticated)?;

        let updated = {
            let mut state = self.state();
            let Some(slot) = state.items.iter_mut().find(|l| l.id == *line_id) else {
                tracing::debug!(%line_id, %kind, "Toggle on a line outside the feed");
                return Ok(ToggleOutcome::NotInFeed);
            };
            let updated = slot.with_relation(kind, !slot.has_relation(kind));
            *slot = updated.clone();
            updated
        };

        let present = updated.has_relation(kind);
        let result = match kind {
            RelationKind::Like => self.store.set_like_relation(line_id, &viewer, present).await,
            RelationKind::Bookmark => {
                self.store
                    .set_bookmark_relation(line_id, &viewer, present)
                    .await
            }
        };

        match result {
            Ok(()) => Ok(ToggleOutcome::Applied(updated)),
            Err(e) => {
                tracing::warn!(%line_id, %kind, present, error = %e, "Relation update failed");
                if self.settings.reconcile == ReconcilePolicy::Revert {
                    self.revert(kind, line_id, present);
                }
                Err(FeedError::StoreUnavailable(e))
            }
        }
    }

    fn revert(&self, kind: RelationKind, line_id: &LineId, optimistic: bool) {
        let mut state = self.state();
        if let Some(slot) = state.items.iter_mut().find(|l| l.id == *line_id) {
            // A later toggle or refresh may already have moved the line on
            if slot.has_relation(kind) == optimistic {
                *slot = slot.with_relation(kind, !optimistic);
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
