//! oneline feed core
//!
//! Client-side core of a short-line posting app backed by a hosted row API:
//! a paginated, date-filterable feed with optimistic like/bookmark toggles.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod feed;

#[cfg(test)]
mod test_utils;
