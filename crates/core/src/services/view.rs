//! Response shapes shared by the services.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use forum_common::AppResult;
use forum_db::{entities::user, repositories::UserRepository};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::vote::VoteSummary;

/// Default page size.
pub const DEFAULT_LIMIT: u64 = 10;

/// Largest page size a client may request.
pub const MAX_LIMIT: u64 = 100;

/// Author fields embedded in topics, posts and replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorSummary {
    pub id: String,
    pub name: String,
    pub image: String,
}

impl From<&user::Model> for AuthorSummary {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            image: user.image.clone(),
        }
    }
}

/// Load author summaries for a set of user IDs.
///
/// Missing users are absent from the map.
pub async fn load_authors(
    user_repo: &UserRepository,
    ids: impl IntoIterator<Item = String>,
) -> AppResult<HashMap<String, AuthorSummary>> {
    let mut ids: Vec<String> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let users = user_repo.find_by_ids(&ids).await?;
    Ok(users
        .iter()
        .map(|u| (u.id.clone(), AuthorSummary::from(u)))
        .collect())
}

/// Input for replying to a topic or post.
#[derive(Debug, Deserialize, Validate)]
pub struct ReplyInput {
    #[serde(default)]
    #[validate(length(min = 1, message = "Reply content is required"))]
    pub content: String,
}

/// A reply as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyView {
    pub id: String,
    pub content: String,
    pub author: Option<AuthorSummary>,
    #[serde(flatten)]
    pub votes: VoteSummary,
    pub created_at: DateTime<FixedOffset>,
}

/// Normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number.
    pub page: u64,
    /// Page size.
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Build from optional query values, clamping out-of-range input.
    ///
    /// `page` is capped so the offset still fits a `BIGINT`.
    #[must_use]
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let max_page = i64::MAX.unsigned_abs() / limit;
        Self {
            page: page.unwrap_or(1).clamp(1, max_page),
            limit,
        }
    }

    /// Rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Number of pages needed for `total` rows.
    #[must_use]
    pub const fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

/// Simple acknowledgement body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    /// Create a message response.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
