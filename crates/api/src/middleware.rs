//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use forum_core::{ContentService, PostService, TopicService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub topic_service: TopicService,
    pub content_service: ContentService,
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` to a user and stores it in the
/// request extensions. A missing or invalid token leaves the request
/// anonymous; routes that need a user reject it through
/// [`crate::extractors::AuthUser`]. A server-side failure while resolving
/// the user ends the request with that error.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(Authorization(bearer)) = req.headers().typed_get::<Authorization<Bearer>>() {
        match state.user_service.authenticate(bearer.token()).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) if e.is_server_error() => return e.into_response(),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unusable bearer token");
            }
        }
    }

    next.run(req).await
}
