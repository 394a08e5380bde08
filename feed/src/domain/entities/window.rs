//! Time windows used to constrain line queries

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Creation times from `start` (inclusive) up to `end` (exclusive); an open end
/// means "up to now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn since(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && self.end.map_or(true, |end| at < end)
    }
}

/// A single calendar day in the viewer's local time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayFilter(pub NaiveDate);

impl DayFilter {
    /// The day's window in UTC: local midnight up to, not including, the next
    /// local midnight
    pub fn window(&self, offset: FixedOffset) -> TimeWindow {
        let local_midnight = self.0.and_time(NaiveTime::MIN);
        let start_utc = local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()));
        let start = Utc.from_utc_datetime(&start_utc);

        TimeWindow {
            start,
            end: Some(start + Duration::days(1)),
        }
    }

    /// The calendar day containing `at`, as seen from `offset`
    pub fn containing(at: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self(at.with_timezone(&offset).date_naive())
    }

    /// The day before this one, if representable
    pub fn previous(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }
}

impl From<NaiveDate> for DayFilter {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl std::fmt::Display for DayFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl std::str::FromStr for DayFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|e| format!("Invalid date '{}': {}. Use YYYY-MM-DD", s, e))
    }
}
