//! API response types.
//!
//! Successful responses carry the entity itself as the JSON body. Failures
//! carry an [`ErrorResponse`] with the status derived from the error.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roster_core::{ErrorResponse, RosterError};
use serde::Serialize;
use tracing::error;

/// Application error type for Axum.
#[derive(Debug)]
pub struct AppError(pub RosterError);

impl From<RosterError> for AppError {
    fn from(err: RosterError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }

        let body = Json(ErrorResponse::from_error(&self.0));
        (status, body).into_response()
    }
}

/// Result type for Axum handlers.
pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Helper to create a success response.
pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(data))
}

/// Helper to create a created (201) response.
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_status() {
        let response = AppError(RosterError::not_found("User", 7)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError(RosterError::validation("bad")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError(RosterError::internal("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_created_status() {
        let (status, Json(body)) = created("x");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, "x");
    }
}
