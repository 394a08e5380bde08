//! Line domain entity
//!
//! A line is a single short post. The store hands back raw `LineRecord`s with
//! their relation rows; the feed works with viewer-annotated `Line`s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display name used when an author cannot be resolved
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Maximum length of a line, in characters
pub const MAX_LINE_CHARS: usize = 100;

/// Unique identifier for a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineId(pub Uuid);

impl LineId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LineId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for LineId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a user (author or viewer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of per-user relation a viewer can hold on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Like,
    Bookmark,
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationKind::Like => write!(f, "like"),
            RelationKind::Bookmark => write!(f, "bookmark"),
        }
    }
}

/// A line as returned by the store, before author resolution and viewer annotation
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    pub id: LineId,
    pub text: String,
    pub author_id: UserId,
    /// Server-maintained aggregate; may be missing or stale, so it is not trusted to be >= 0
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
    /// Users holding a like relation on this line
    pub liked_by: Vec<UserId>,
    /// Users holding a bookmark relation on this line
    pub bookmarked_by: Vec<UserId>,
}

impl LineRecord {
    /// Resolve into a feed line for `viewer`.
    ///
    /// Viewer flags are always false when there is no viewer.
    pub fn into_line(self, author_display_name: String, viewer: Option<&UserId>) -> Line {
        let viewer_has_liked = viewer.is_some_and(|v| self.liked_by.contains(v));
        let viewer_has_bookmarked = viewer.is_some_and(|v| self.bookmarked_by.contains(v));

        Line {
            id: self.id,
            text: self.text,
            author_id: self.author_id,
            author_display_name,
            like_count: u32::try_from(self.likes_count.max(0)).unwrap_or(u32::MAX),
            created_at: self.created_at,
            viewer_has_liked,
            viewer_has_bookmarked,
        }
    }
}

/// A viewer-annotated line as shown in the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub id: LineId,
    pub text: String,
    pub author_id: UserId,
    pub author_display_name: String,
    pub like_count: u32,
    pub created_at: DateTime<Utc>,
    pub viewer_has_liked: bool,
    pub viewer_has_bookmarked: bool,
}

impl Line {
    /// Feed ordering key: newest first, ties broken by the larger id
    pub fn sort_key(&self) -> (DateTime<Utc>, LineId) {
        (self.created_at, self.id)
    }

    /// True when `self` sorts strictly before `other` in the feed
    pub fn precedes(&self, other: &Line) -> bool {
        self.sort_key() > other.sort_key()
    }

    pub fn has_relation(&self, kind: RelationKind) -> bool {
        match kind {
            RelationKind::Like => self.viewer_has_liked,
            RelationKind::Bookmark => self.viewer_has_bookmarked,
        }
    }

    /// Copy of this line with the viewer's relation set to `present`.
    ///
    /// Setting a like that changes state moves `like_count` by one, floored at 0.
    pub fn with_relation(&self, kind: RelationKind, present: bool) -> Line {
        let mut line = self.clone();
        if self.has_relation(kind) == present {
            return line;
        }
        match kind {
            RelationKind::Like => {
                line.viewer_has_liked = present;
                line.like_count = if present {
                    self.like_count.saturating_add(1)
                } else {
                    self.like_count.saturating_sub(1)
                };
            }
            RelationKind::Bookmark => line.viewer_has_bookmarked = present,
        }
        line
    }
}

/// Validated text of a new line: non-blank and at most `MAX_LINE_CHARS` characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineText(String);

impl LineText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for LineText {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("line text cannot be empty".to_string());
        }
        let chars = s.chars().count();
        if chars > MAX_LINE_CHARS {
            return Err(format!(
                "line text is {} characters, maximum is {}",
                chars, MAX_LINE_CHARS
            ));
        }
        Ok(Self(s.to_string()))
    }
}

/// Data needed to create a new line
#[derive(Debug, Clone)]
pub struct NewLine {
    pub author_id: UserId,
    pub text: LineText,
}
