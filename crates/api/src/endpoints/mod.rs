//! API endpoints.

mod auth;
mod posts;
mod trending;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
///
/// Mount under `/api` and wrap with [`crate::middleware::auth_middleware`].
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/posts", posts::router())
        .nest("/trending", trending::router())
        .nest("/users", users::router())
}
