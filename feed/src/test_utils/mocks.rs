//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior, inject
//! failures, and hold individual calls in flight with a `Gate`.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::Notify;

use crate::domain::entities::{LineId, LineRecord, NewLine, TimeWindow, UserId};
use crate::domain::ports::LineStore;
use crate::error::StoreError;

// ============================================================================
// Gate
// ============================================================================

/// Holds one store call in flight until the test releases it
#[derive(Default)]
pub struct Gate {
    entered: Notify,
    released: Notify,
}

impl Gate {
    /// Wait until the gated call has started
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Let the gated call continue
    pub fn release(&self) {
        self.released.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.released.notified().await;
    }
}

// ============================================================================
// In-Memory Line Store
// ============================================================================

#[derive(Default)]
pub struct InMemoryLineStore {
    lines: RwLock<Vec<LineRecord>>,
    profiles: RwLock<HashMap<UserId, String>>,
    likes: RwLock<HashSet<(LineId, UserId)>>,
    bookmarks: RwLock<HashSet<(LineId, UserId)>>,
    query_calls: AtomicUsize,
    profile_calls: AtomicUsize,
    mutation_calls: AtomicUsize,
    fail_queries: AtomicBool,
    fail_profiles: AtomicBool,
    fail_mutations: AtomicBool,
    query_gates: Mutex<VecDeque<Arc<Gate>>>,
    mutation_gates: Mutex<VecDeque<Arc<Gate>>>,
}

impl InMemoryLineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with lines for testing
    pub fn with_lines(self, records: Vec<LineRecord>) -> Self {
        self.lines.write().unwrap().extend(records);
        self
    }

    pub fn with_profile(self, user_id: UserId, username: &str) -> Self {
        self.profiles
            .write()
            .unwrap()
            .insert(user_id, username.to_string());
        self
    }

    pub fn with_like(self, line_id: LineId, user_id: UserId) -> Self {
        self.apply_relation(&self.likes, &line_id, &user_id, true, true);
        self
    }

    pub fn with_bookmark(self, line_id: LineId, user_id: UserId) -> Self {
        self.apply_relation(&self.bookmarks, &line_id, &user_id, true, false);
        self
    }

    /// Add a line after construction (e.g., someone posting mid-scroll)
    pub fn push_line(&self, record: LineRecord) {
        self.lines.write().unwrap().push(record);
    }

    /// Line ids in insertion order
    pub fn line_ids(&self) -> Vec<LineId> {
        self.lines.read().unwrap().iter().map(|r| r.id).collect()
    }

    pub fn has_like(&self, line_id: &LineId, user_id: &UserId) -> bool {
        self.likes.read().unwrap().contains(&(*line_id, *user_id))
    }

    pub fn has_bookmark(&self, line_id: &LineId, user_id: &UserId) -> bool {
        self.bookmarks.read().unwrap().contains(&(*line_id, *user_id))
    }

    pub fn likes_count(&self, line_id: &LineId) -> Option<i64> {
        self.lines
            .read()
            .unwrap()
            .iter()
            .find(|r| r.id == *line_id)
            .map(|r| r.likes_count)
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_profiles(&self, fail: bool) {
        self.fail_profiles.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    /// Hold the next line query (`query_lines`/`top_liked_line`) until released
    pub fn gate_next_query(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.query_gates.lock().unwrap().push_back(gate.clone());
        gate
    }

    /// Hold the next relation mutation until released
    pub fn gate_next_mutation(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.mutation_gates.lock().unwrap().push_back(gate.clone());
        gate
    }

    async fn enter_query(&self) -> Result<(), StoreError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.query_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected query failure".to_string()));
        }
        Ok(())
    }

    async fn enter_mutation(&self) -> Result<(), StoreError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.mutation_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 503,
                message: "injected mutation failure".to_string(),
            });
        }
        Ok(())
    }

    /// Insert or delete a relation row; likes also keep `likes_count` in step,
    /// the way the backend's trigger does.
    fn apply_relation(
        &self,
        rows: &RwLock<HashSet<(LineId, UserId)>>,
        line_id: &LineId,
        user_id: &UserId,
        present: bool,
        counts_likes: bool,
    ) {
        let changed = {
            let mut rows = rows.write().unwrap();
            if present {
                rows.insert((*line_id, *user_id))
            } else {
                rows.remove(&(*line_id, *user_id))
            }
        };
        if changed && counts_likes {
            let mut lines = self.lines.write().unwrap();
            if let Some(record) = lines.iter_mut().find(|r| r.id == *line_id) {
                record.likes_count += if present { 1 } else { -1 };
            }
        }
    }

    fn annotated(&self, mut record: LineRecord) -> LineRecord {
        let likes = self.likes.read().unwrap();
        let bookmarks = self.bookmarks.read().unwrap();
        record.liked_by = likes
            .iter()
            .filter(|(line, _)| *line == record.id)
            .map(|(_, user)| *user)
            .collect();
        record.bookmarked_by = bookmarks
            .iter()
            .filter(|(line, _)| *line == record.id)
            .map(|(_, user)| *user)
            .collect();
        record
    }
}

#[async_trait]
impl LineStore for InMemoryLineStore {
    async fn query_lines(
        &self,
        offset: usize,
        limit: usize,
        window: Option<&TimeWindow>,
    ) -> Result<Vec<LineRecord>, StoreError> {
        self.enter_query().await?;

        let mut matching: Vec<LineRecord> = self
            .lines
            .read()
            .unwrap()
            .iter()
            .filter(|r| window.map_or(true, |w| w.contains(r.created_at)))
            .cloned()
            .collect();
        matching.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|r| self.annotated(r))
            .collect())
    }

    async fn resolve_author_names(
        &self,
        author_ids: &HashSet<UserId>,
    ) -> Result<HashMap<UserId, String>, StoreError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_profiles.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected profile failure".to_string()));
        }
        let profiles = self.profiles.read().unwrap();
        Ok(author_ids
            .iter()
            .filter_map(|id| profiles.get(id).map(|name| (*id, name.clone())))
            .collect())
    }

    async fn set_like_relation(
        &self,
        line_id: &LineId,
        user_id: &UserId,
        present: bool,
    ) -> Result<(), StoreError> {
        self.enter_mutation().await?;
        self.apply_relation(&self.likes, line_id, user_id, present, true);
        Ok(())
    }

    async fn set_bookmark_relation(
        &self,
        line_id: &LineId,
        user_id: &UserId,
        present: bool,
    ) -> Result<(), StoreError> {
        self.enter_mutation().await?;
        self.apply_relation(&self.bookmarks, line_id, user_id, present, false);
        Ok(())
    }

    async fn insert_line(&self, line: &NewLine) -> Result<LineRecord, StoreError> {
        self.enter_mutation().await?;
        let record = LineRecord {
            id: LineId::new(),
            text: line.text.as_str().to_string(),
            author_id: line.author_id,
            likes_count: 0,
            created_at: Utc::now(),
            liked_by: vec![],
            bookmarked_by: vec![],
        };
        self.lines.write().unwrap().push(record.clone());
        Ok(record)
    }

    async fn top_liked_line(&self, window: &TimeWindow) -> Result<Option<LineRecord>, StoreError> {
        self.enter_query().await?;

        let best = self
            .lines
            .read()
            .unwrap()
            .iter()
            .filter(|r| window.contains(r.created_at))
            .max_by(|a, b| {
                (a.likes_count, a.created_at, a.id).cmp(&(b.likes_count, b.created_at, b.id))
            })
            .cloned();
        Ok(best.map(|r| self.annotated(r)))
    }
}
