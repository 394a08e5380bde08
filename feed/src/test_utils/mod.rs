//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//! The in-memory store can fail on demand and hold single calls in flight,
//! which is what the generation and optimistic-update tests rely on.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
