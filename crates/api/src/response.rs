//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Successful JSON response with its status code.
///
/// The payload is the whole body; errors are rendered by
/// [`forum_common::AppError`] instead.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    status: StatusCode,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 response.
    pub const fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            data,
        }
    }

    /// 201 response for newly created resources.
    pub const fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.data)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiResponse::ok(1).into_response().status(), StatusCode::OK);
        assert_eq!(
            ApiResponse::created("x").into_response().status(),
            StatusCode::CREATED
        );
    }
}
