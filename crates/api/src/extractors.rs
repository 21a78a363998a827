//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use forum_common::AppError;
use forum_db::entities::user;

/// Authenticated user extractor.
///
/// Rejects with 401 when the auth middleware did not resolve a user.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional authenticated user extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl MaybeAuthUser {
    /// ID of the caller, if signed in.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.as_ref().map(|u| u.id.as_str())
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}
