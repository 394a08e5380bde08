//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{LineId, LineRecord, UserId};

/// Fixed author used by the seeded stores
pub fn test_author() -> UserId {
    UserId(Uuid::from_u128(0xada))
}

/// A fresh signed-in viewer
pub fn test_viewer() -> UserId {
    UserId::new()
}

/// The calendar day most fixtures post on
pub fn test_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Create a line record with no likes or relation rows
pub fn test_record(author_id: UserId, created_at: DateTime<Utc>) -> LineRecord {
    LineRecord {
        id: LineId::new(),
        text: format!("a line posted at {}", created_at.format("%H:%M:%S")),
        author_id,
        likes_count: 0,
        created_at,
        liked_by: vec![],
        bookmarked_by: vec![],
    }
}

/// `count` lines posted on `day` (UTC), ten seconds apart counting back from noon
pub fn records_on_day(day: NaiveDate, count: usize, author_id: UserId) -> Vec<LineRecord> {
    let noon = day
        .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap())
        .and_utc();
    (0..count)
        .map(|i| test_record(author_id, noon - Duration::seconds(10 * i as i64)))
        .collect()
}
