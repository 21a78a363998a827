//! User content endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use forum_common::AppResult;
use forum_core::{LikedItem, UserContent};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Threads and responses of a user.
async fn content(
    AuthUser(_caller): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<UserContent>> {
    let content = state.content_service.user_content(&user_id).await?;
    Ok(ApiResponse::ok(content))
}

/// Posts and replies a user liked.
async fn liked_content(
    AuthUser(_caller): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<Vec<LikedItem>>> {
    let items = state.content_service.liked_content(&user_id).await?;
    Ok(ApiResponse::ok(items))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}/content", get(content))
        .route("/{user_id}/liked-content", get(liked_content))
}
