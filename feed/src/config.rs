use std::env;

use chrono::FixedOffset;

use crate::app::{FeedSettings, ReconcilePolicy, PAGE_SIZE};
use crate::domain::entities::UserId;
use crate::error::ConfigError;

#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the hosted backend (the row API lives under `/rest/v1`)
    pub store_url: String,
    /// Public API key sent with every request
    pub store_api_key: String,
    /// Session token of the signed-in user, if any
    pub store_access_token: Option<String>,
    /// Identity to annotate the feed for
    pub viewer_id: Option<UserId>,
    pub page_size: usize,
    /// Viewer's offset from UTC in minutes, used to compute calendar days
    pub utc_offset_minutes: i32,
    pub revert_on_failure: bool,
    /// Pages the inspection binary walks through before stopping
    pub max_pages: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let viewer_id = match env::var("VIEWER_ID").ok() {
            Some(raw) => Some(raw.parse::<UserId>().map_err(|_| ConfigError::Invalid {
                key: "VIEWER_ID",
                value: raw,
            })?),
            None => None,
        };

        Ok(Self {
            store_url: env::var("STORE_URL").map_err(|_| ConfigError::Missing("STORE_URL"))?,
            store_api_key: env::var("STORE_API_KEY")
                .map_err(|_| ConfigError::Missing("STORE_API_KEY"))?,
            store_access_token: env::var("STORE_ACCESS_TOKEN").ok(),
            viewer_id,
            page_size: parse_var("FEED_PAGE_SIZE", PAGE_SIZE)?,
            utc_offset_minutes: parse_var("FEED_UTC_OFFSET_MINUTES", 0)?,
            revert_on_failure: parse_var("FEED_REVERT_ON_FAILURE", false)?,
            max_pages: parse_var("FEED_MAX_PAGES", 3)?,
        })
    }

    /// Controller settings derived from this configuration
    pub fn feed_settings(&self) -> Result<FeedSettings, ConfigError> {
        let utc_offset = self
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::Invalid {
                key: "FEED_UTC_OFFSET_MINUTES",
                value: self.utc_offset_minutes.to_string(),
            })?;
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "FEED_PAGE_SIZE",
                value: "0".to_string(),
            });
        }

        Ok(FeedSettings {
            page_size: self.page_size,
            utc_offset,
            reconcile: if self.revert_on_failure {
                ReconcilePolicy::Revert
            } else {
                ReconcilePolicy::KeepOptimistic
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}
