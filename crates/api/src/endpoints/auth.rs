//! Authentication and account endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};
use forum_common::AppResult;
use forum_core::{
    AuthResponse, ChangePasswordInput, LoginInput, MessageResponse, RegisterInput,
    UpdateProfileInput,
};
use forum_db::entities::{post, user};
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Threads response.
#[derive(Serialize)]
pub struct ThreadsResponse {
    pub threads: Vec<post::Model>,
}

/// Create a new account.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterInput>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let response = state.user_service.register(req).await?;
    Ok(ApiResponse::created(response))
}

/// Sign in to an existing account.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginInput>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let response = state.user_service.login(req).await?;
    Ok(ApiResponse::ok(response))
}

/// Get the current user.
async fn me(AuthUser(user): AuthUser) -> AppResult<ApiResponse<user::Model>> {
    Ok(ApiResponse::ok(user))
}

/// Update the current user's profile.
async fn update_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<user::Model>> {
    let updated = state.user_service.update_profile(user, req).await?;
    Ok(ApiResponse::ok(updated))
}

/// Change the current user's password.
async fn change_password(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordInput>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.user_service.change_password(user, req).await?;
    Ok(ApiResponse::ok(MessageResponse::new(
        "Password updated successfully",
    )))
}

/// List posts started by the current user.
async fn threads(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ThreadsResponse>> {
    let threads = state.user_service.threads(&user.id).await?;
    Ok(ApiResponse::ok(ThreadsResponse { threads }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/profile", put(update_profile))
        .route("/change-password", put(change_password))
        .route("/threads", get(threads))
}
