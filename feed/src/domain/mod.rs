//! Domain layer
//!
//! Contains pure business logic with no external dependencies.
//! - `entities`: Domain models (lines, relations, time windows)
//! - `ports`: Trait definitions for the line store and identity provider

pub mod entities;
pub mod ports;
