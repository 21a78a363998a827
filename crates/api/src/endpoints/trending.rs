//! Trending topic endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use forum_common::{AppError, AppResult};
use forum_core::{
    CreateTopicInput, DEFAULT_STATUSES, MessageResponse, Pagination, ReplyInput, ReplyView,
    TimeRange, TopicDetail, TopicPage, TopicView, TrendingQuery, UpdateTopicInput, VoteSummary,
};
use forum_db::entities::{topic::TopicStatus, vote::VoteKind};
use serde::Deserialize;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Feed query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingParams {
    pub time_range: Option<String>,
    /// Comma-separated statuses.
    pub status: Option<String>,
    pub topic: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

fn parse_statuses(raw: Option<&str>) -> AppResult<Vec<TopicStatus>> {
    let mut statuses = Vec::new();
    for part in raw.unwrap_or_default().split(',').map(str::trim) {
        if part.is_empty() {
            continue;
        }
        let status = part.parse::<TopicStatus>().map_err(AppError::BadRequest)?;
        if !statuses.contains(&status) {
            statuses.push(status);
        }
    }

    if statuses.is_empty() {
        statuses = DEFAULT_STATUSES.to_vec();
    }
    Ok(statuses)
}

impl TrendingParams {
    fn into_query(self) -> AppResult<TrendingQuery> {
        Ok(TrendingQuery {
            time_range: self
                .time_range
                .as_deref()
                .map(TimeRange::parse)
                .unwrap_or_default(),
            statuses: parse_statuses(self.status.as_deref())?,
            topic: self.topic.filter(|t| !t.trim().is_empty()),
            pagination: Pagination::new(self.page, self.limit),
        })
    }
}

/// List trending topics and rank the returned page.
async fn list(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> AppResult<ApiResponse<TopicPage>> {
    let query = params.into_query()?;
    let page = state.topic_service.list_trending(&query, viewer.id()).await?;
    Ok(ApiResponse::ok(page))
}

/// Create a topic.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateTopicInput>,
) -> AppResult<ApiResponse<TopicView>> {
    let topic = state.topic_service.create(&user.id, req).await?;
    Ok(ApiResponse::created(topic))
}

/// Get a topic with its replies.
async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<TopicDetail>> {
    let topic = state.topic_service.get_trending(&id, viewer.id()).await?;
    Ok(ApiResponse::ok(topic))
}

/// Update a topic.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTopicInput>,
) -> AppResult<ApiResponse<TopicView>> {
    let topic = state.topic_service.update(&id, &user.id, req).await?;
    Ok(ApiResponse::ok(topic))
}

/// Delete a topic.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.topic_service.delete(&id, &user.id).await?;
    Ok(ApiResponse::ok(MessageResponse::new("Trending topic removed")))
}

/// Reply to a topic.
async fn reply(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReplyInput>,
) -> AppResult<ApiResponse<ReplyView>> {
    let reply = state.topic_service.add_reply(&id, &user.id, req).await?;
    Ok(ApiResponse::ok(reply))
}

async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<TopicView>> {
    let topic = state
        .topic_service
        .toggle_vote(&id, &user.id, VoteKind::Like)
        .await?;
    Ok(ApiResponse::ok(topic))
}

async fn dislike(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<TopicView>> {
    let topic = state
        .topic_service
        .toggle_vote(&id, &user.id, VoteKind::Dislike)
        .await?;
    Ok(ApiResponse::ok(topic))
}

async fn like_reply(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((id, reply_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<VoteSummary>> {
    let votes = state
        .topic_service
        .toggle_reply_vote(&id, &reply_id, &user.id, VoteKind::Like)
        .await?;
    Ok(ApiResponse::ok(votes))
}

async fn dislike_reply(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((id, reply_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<VoteSummary>> {
    let votes = state
        .topic_service
        .toggle_reply_vote(&id, &reply_id, &user.id, VoteKind::Dislike)
        .await?;
    Ok(ApiResponse::ok(votes))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/{id}/replies", post(reply))
        .route("/{id}/like", post(like))
        .route("/{id}/dislike", post(dislike))
        .route("/{id}/replies/{reply_id}/like", post(like_reply))
        .route("/{id}/replies/{reply_id}/dislike", post(dislike_reply))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_statuses_default() {
        assert_eq!(parse_statuses(None).unwrap(), DEFAULT_STATUSES.to_vec());
        assert_eq!(parse_statuses(Some(" , ")).unwrap(), DEFAULT_STATUSES.to_vec());
    }

    #[test]
    fn test_statuses_comma_list() {
        assert_eq!(
            parse_statuses(Some("falling, archived,falling")).unwrap(),
            vec![TopicStatus::Falling, TopicStatus::Archived]
        );
    }

    #[test]
    fn test_statuses_unknown() {
        assert!(matches!(
            parse_statuses(Some("rising,viral")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_params_into_query() {
        let params = TrendingParams {
            time_range: Some("7d".to_string()),
            topic: Some("rust".to_string()),
            page: Some(3),
            ..TrendingParams::default()
        };
        let query = params.into_query().unwrap();

        assert_eq!(query.time_range, TimeRange::Week);
        assert_eq!(query.topic.as_deref(), Some("rust"));
        assert_eq!(query.pagination.offset(), 20);
    }
}
