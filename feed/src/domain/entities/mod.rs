//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! Raw store rows are kept separate from the viewer-annotated lines the feed shows.

pub mod line;
pub mod window;

pub use line::{
    Line, LineId, LineRecord, LineText, NewLine, RelationKind, UserId, MAX_LINE_CHARS,
    UNKNOWN_AUTHOR,
};
pub use window::{DayFilter, TimeWindow};
