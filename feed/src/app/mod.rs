//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities and ports.

pub mod compose_service;
pub mod feed_controller;
pub mod highlight_service;
pub mod hydrate;

pub use compose_service::ComposeService;
pub use feed_controller::{
    FeedController, FeedPhase, FeedSettings, FeedState, PageOutcome, ReconcilePolicy,
    ToggleOutcome, PAGE_SIZE,
};
pub use highlight_service::HighlightService;
