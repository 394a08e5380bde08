//! oneline feed inspector
//!
//! Loads the feed from the configured backend and prints it to stdout.
//!
//! Usage: `oneline-feed [YYYY-MM-DD]`

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oneline_feed::adapters::{RestLineStore, SessionIdentity};
use oneline_feed::app::{FeedController, HighlightService, PageOutcome};
use oneline_feed::config::Config;
use oneline_feed::domain::entities::DayFilter;
use oneline_feed::feed::render_feed;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the rendered feed
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,oneline_feed=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let date_filter = std::env::args()
        .nth(1)
        .map(|raw| raw.parse::<DayFilter>().map_err(anyhow::Error::msg))
        .transpose()?;

    let config = Config::from_env()?;
    let settings = config.feed_settings()?;

    let store = Arc::new(
        RestLineStore::new(
            &config.store_url,
            &config.store_api_key,
            config.store_access_token.as_deref(),
        )
        .context("Failed to build line store client")?,
    );
    let identity = Arc::new(SessionIdentity::new());
    if let Some(viewer) = config.viewer_id {
        identity.sign_in(viewer);
    }

    tracing::info!(store_url = %config.store_url, date_filter = ?date_filter, "Loading feed");

    let feed = FeedController::new(store.clone(), identity.clone(), settings);
    let highlights = HighlightService::new(store, identity, feed.settings().clone());

    let now = Utc::now();
    let highlight = match date_filter {
        Some(_) => None,
        None => highlights.line_of_the_day(now).await,
    };

    if let Err(e) = feed.initialize(date_filter).await {
        tracing::error!(error = %e, "Feed failed to load");
    }
    for _ in 1..config.max_pages {
        match feed.request_more().await {
            Ok(PageOutcome::Loaded { has_more: true, .. }) => continue,
            Ok(_) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Stopped paging");
                break;
            }
        }
    }

    print!("{}", render_feed(&feed.snapshot(), highlight.as_ref(), now));
    Ok(())
}
