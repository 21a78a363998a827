//! Category post endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use forum_common::{AppError, AppResult};
use forum_core::{
    CreatePostInput, MessageResponse, Pagination, PostDetail, PostPage, PostQuery, PostView,
    ReplyInput, UpdatePostInput, VoteSummary,
};
use forum_db::{
    entities::{
        post::{PostCategory, PostStatus},
        vote::VoteKind,
    },
    repositories::PostSort,
};
use serde::Deserialize;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsParams {
    pub category: Option<String>,
    pub sort: Option<String>,
    pub status: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ListPostsParams {
    fn into_query(self) -> AppResult<PostQuery> {
        let category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .map(|c| {
                c.parse::<PostCategory>()
                    .map_err(|_| AppError::BadRequest(format!("Invalid category: {c}")))
            })
            .transpose()?;
        let status = self
            .status
            .map(|s| s.parse::<PostStatus>().map_err(AppError::BadRequest))
            .transpose()?
            .unwrap_or_default();

        Ok(PostQuery {
            category,
            status,
            sort: self.sort.as_deref().map(PostSort::parse).unwrap_or_default(),
            pagination: Pagination::new(self.page, self.limit),
        })
    }
}

/// List posts.
async fn list(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListPostsParams>,
) -> AppResult<ApiResponse<PostPage>> {
    let query = params.into_query()?;
    let page = state.post_service.list(&query, viewer.id()).await?;
    Ok(ApiResponse::ok(page))
}

/// Create a post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostView>> {
    let post = state.post_service.create(&user, req).await?;
    Ok(ApiResponse::created(post))
}

/// Get a post with its replies.
async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PostDetail>> {
    let post = state.post_service.get(&id, viewer.id()).await?;
    Ok(ApiResponse::ok(post))
}

/// Update a post.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePostInput>,
) -> AppResult<ApiResponse<PostView>> {
    let post = state.post_service.update(&id, &user, req).await?;
    Ok(ApiResponse::ok(post))
}

/// Delete a post.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.post_service.delete(&id, &user.id).await?;
    Ok(ApiResponse::ok(MessageResponse::new("Post removed")))
}

/// Reply to a post.
async fn reply(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReplyInput>,
) -> AppResult<ApiResponse<PostDetail>> {
    let post = state.post_service.add_reply(&id, &user.id, req).await?;
    Ok(ApiResponse::ok(post))
}

async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<VoteSummary>> {
    let votes = state
        .post_service
        .toggle_vote(&id, &user.id, VoteKind::Like)
        .await?;
    Ok(ApiResponse::ok(votes))
}

async fn dislike(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<VoteSummary>> {
    let votes = state
        .post_service
        .toggle_vote(&id, &user.id, VoteKind::Dislike)
        .await?;
    Ok(ApiResponse::ok(votes))
}

async fn like_reply(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((id, reply_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<VoteSummary>> {
    let votes = state
        .post_service
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
        .post_service
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
    fn test_list_params_defaults() {
        let query = ListPostsParams::default().into_query().unwrap();

        assert_eq!(query.category, None);
        assert_eq!(query.status, PostStatus::Active);
        assert_eq!(query.sort, PostSort::Latest);
        assert_eq!(query.pagination, Pagination::default());
    }

    #[test]
    fn test_list_params_parse() {
        let params = ListPostsParams {
            category: Some("Sports".to_string()),
            sort: Some("mostLiked".to_string()),
            status: Some("closed".to_string()),
            page: Some(2),
            limit: Some(500),
        };
        let query = params.into_query().unwrap();

        assert_eq!(query.category, Some(PostCategory::Sports));
        assert_eq!(query.sort, PostSort::MostLiked);
        assert_eq!(query.status, PostStatus::Closed);
        assert_eq!(query.pagination.limit, 100);
    }

    #[test]
    fn test_list_params_unknown_category() {
        let params = ListPostsParams {
            category: Some("cooking".to_string()),
            ..ListPostsParams::default()
        };

        assert!(matches!(params.into_query(), Err(AppError::BadRequest(_))));
    }
}
