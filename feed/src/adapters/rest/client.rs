//! Row API client implementation

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{LineId, LineRecord, NewLine, TimeWindow, UserId};
use crate::domain::ports::LineStore;
use crate::error::StoreError;

/// Columns and embedded relation rows fetched for every line
const LINE_SELECT: &str = "id,text,author_id,likes_count,created_at,likes(user_id),bookmarks(user_id)";

/// Feed order: newest first, larger id on ties
const FEED_ORDER: &str = "created_at.desc,id.desc";

/// Implementation of the LineStore port over the hosted row API
pub struct RestLineStore {
    http: Client,
    base_url: String,
}

impl RestLineStore {
    /// Create a client for `base_url`.
    ///
    /// Requests authenticate with the user's session token when there is one,
    /// otherwise with the public API key.
    pub fn new(
        base_url: &str,
        api_key: &str,
        access_token: Option<&str>,
    ) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(api_key)
                .map_err(|_| StoreError::InvalidCredentials("API key".to_string()))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", access_token.unwrap_or(api_key)))
                .map_err(|_| StoreError::InvalidCredentials("access token".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| StoreError::Deserialization(e.to_string()))
        } else {
            Err(Self::status_error(response).await)
        }
    }

    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), StoreError> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::status_error(response).await)
        }
    }

    async fn status_error(response: reqwest::Response) -> StoreError {
        match response.status() {
            StatusCode::UNAUTHORIZED => StoreError::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => StoreError::RateLimited,
            status => {
                let message = response.text().await.unwrap_or_default();
                StoreError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }

    async fn fetch_lines(&self, params: &[(&str, String)]) -> Result<Vec<LineRecord>, StoreError> {
        let resp = self
            .http
            .get(self.rest_url("lines"))
            .query(params)
            .send()
            .await?;

        let rows: Vec<LineRow> = self.handle_response(resp).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn set_relation(
        &self,
        table: &str,
        line_id: &LineId,
        user_id: &UserId,
        present: bool,
    ) -> Result<(), StoreError> {
        let resp = if present {
            self.http
                .post(self.rest_url(table))
                .json(&RelationInsert {
                    line_id: line_id.0,
                    user_id: user_id.0,
                })
                .send()
                .await?
        } else {
            self.http
                .delete(self.rest_url(table))
                .query(&relation_filter(line_id, user_id))
                .send()
                .await?
        };

        // Unique (line_id, user_id): a duplicate insert means the row is already there
        if present && resp.status() == StatusCode::CONFLICT {
            tracing::debug!(table, %line_id, "Relation row already present");
            return Ok(());
        }

        self.handle_empty_response(resp).await
    }
}

/// Request types for the row API
#[derive(Serialize)]
struct RelationInsert {
    line_id: Uuid,
    user_id: Uuid,
}

#[derive(Serialize)]
struct LineInsert<'a> {
    text: &'a str,
    author_id: Uuid,
}

/// Response types from the row API
#[derive(Deserialize)]
struct LineRow {
    id: Uuid,
    text: String,
    author_id: Uuid,
    #[serde(default)]
    likes_count: Option<i64>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    likes: Vec<RelationRow>,
    #[serde(default)]
    bookmarks: Vec<RelationRow>,
}

#[derive(Deserialize)]
struct RelationRow {
    user_id: Uuid,
}

#[derive(Deserialize)]
struct ProfileRow {
    id: Uuid,
    username: Option<String>,
}

impl From<LineRow> for LineRecord {
    fn from(row: LineRow) -> Self {
        Self {
            id: LineId(row.id),
            text: row.text,
            author_id: UserId(row.author_id),
            likes_count: row.likes_count.unwrap_or(0),
            created_at: row.created_at,
            liked_by: row.likes.into_iter().map(|r| UserId(r.user_id)).collect(),
            bookmarked_by: row.bookmarks.into_iter().map(|r| UserId(r.user_id)).collect(),
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn window_params(window: Option<&TimeWindow>) -> Vec<(&'static str, String)> {
    let Some(window) = window else {
        return Vec::new();
    };
    let mut params = vec![("created_at", format!("gte.{}", timestamp(window.start)))];
    if let Some(end) = window.end {
        params.push(("created_at", format!("lt.{}", timestamp(end))));
    }
    params
}

fn page_params(offset: usize, limit: usize, window: Option<&TimeWindow>) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("select", LINE_SELECT.to_string()),
        ("order", FEED_ORDER.to_string()),
        ("offset", offset.to_string()),
        ("limit", limit.to_string()),
    ];
    params.extend(window_params(window));
    params
}

fn top_liked_params(window: &TimeWindow) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("select", LINE_SELECT.to_string()),
        ("order", format!("likes_count.desc,{}", FEED_ORDER)),
        ("limit", "1".to_string()),
    ];
    params.extend(window_params(Some(window)));
    params
}

fn relation_filter(line_id: &LineId, user_id: &UserId) -> [(&'static str, String); 2] {
    [
        ("line_id", format!("eq.{}", line_id)),
        ("user_id", format!("eq.{}", user_id)),
    ]
}

/// Profiles without a username are left out so the caller falls back to unknown
fn profile_names(rows: Vec<ProfileRow>) -> HashMap<UserId, String> {
    rows.into_iter()
        .filter_map(|row| row.username.map(|name| (UserId(row.id), name)))
        .collect()
}

/// `in.(a,b,c)` filter over ids, sorted so requests are stable
fn in_list(ids: &HashSet<UserId>) -> String {
    let mut ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    ids.sort();
    format!("in.({})", ids.join(","))
}

#[async_trait]
impl LineStore for RestLineStore {
    async fn query_lines(
        &self,
        offset: usize,
        limit: usize,
        window: Option<&TimeWindow>,
    ) -> Result<Vec<LineRecord>, StoreError> {
        self.fetch_lines(&page_params(offset, limit, window)).await
    }

    async fn resolve_author_names(
        &self,
        author_ids: &HashSet<UserId>,
    ) -> Result<HashMap<UserId, String>, StoreError> {
        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let resp = self
            .http
            .get(self.rest_url("profiles"))
            .query(&[("select", "id,username".to_string()), ("id", in_list(author_ids))])
            .send()
            .await?;

        let rows: Vec<ProfileRow> = self.handle_response(resp).await?;
        Ok(profile_names(rows))
    }

    async fn set_like_relation(
        &self,
        line_id: &LineId,
        user_id: &UserId,
        present: bool,
    ) -> Result<(), StoreError> {
        self.set_relation("likes", line_id, user_id, present).await
    }

    async fn set_bookmark_relation(
        &self,
        line_id: &LineId,
        user_id: &UserId,
        present: bool,
    ) -> Result<(), StoreError> {
        self.set_relation("bookmarks", line_id, user_id, present)
            .await
    }

    async fn insert_line(&self, line: &NewLine) -> Result<LineRecord, StoreError> {
        let resp = self
            .http
            .post(self.rest_url("lines"))
            .header("Prefer", "return=representation")
            .query(&[("select", LINE_SELECT)])
            .json(&LineInsert {
                text: line.text.as_str(),
                author_id: line.author_id.0,
            })
            .send()
            .await?;

        let rows: Vec<LineRow> = self.handle_response(resp).await?;
        rows.into_iter()
            .next()
            .map(Into::into)
            .ok_or_else(|| StoreError::Deserialization("insert returned no rows".to_string()))
    }

    async fn top_liked_line(&self, window: &TimeWindow) -> Result<Option<LineRecord>, StoreError> {
        let lines = self.fetch_lines(&top_liked_params(window)).await?;
        Ok(lines.into_iter().next())
    }
}
