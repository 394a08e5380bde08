//! Hosted row API adapter
//!
//! Implements the LineStore port over the backend's PostgREST-style interface.

pub mod client;

pub use client::RestLineStore;
