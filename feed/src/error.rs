//! Unified error types for the feed core
//!
//! This module defines error types for each layer:
//! - `StoreError`: failures talking to the hosted row API
//! - `FeedError`: controller/service errors surfaced to the feed view
//! - `ConfigError`: invalid or missing environment configuration

use thiserror::Error;

/// Line store errors - transport and backend failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Unauthorized - invalid or expired credentials")]
    Unauthorized,

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Feed layer errors - recoverable conditions reported to the caller
#[derive(Debug, Error)]
pub enum FeedError {
    /// An interaction was attempted without a signed-in identity
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Line store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// A fetch completed after its generation was superseded
    #[error("Stale response from generation {generation}")]
    StaleResponse { generation: u64 },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl FeedError {
    /// Whether the feed view should show this error to the user.
    ///
    /// Stale responses are an internal bookkeeping outcome and are dropped.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, FeedError::StaleResponse { .. })
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_response_is_silent() {
        assert!(!FeedError::StaleResponse { generation: 3 }.is_user_visible());
        assert!(FeedError::Unauthenticated.is_user_visible());
        assert!(
            FeedError::StoreUnavailable(StoreError::Unavailable("down".to_string()))
                .is_user_visible()
        );
    }

    #[test]
    fn store_error_converts_into_feed_error() {
        let err: FeedError = StoreError::RateLimited.into();
        assert!(matches!(err, FeedError::StoreUnavailable(StoreError::RateLimited)));
        assert_eq!(err.to_string(), "Line store unavailable: Rate limited");
    }
}
