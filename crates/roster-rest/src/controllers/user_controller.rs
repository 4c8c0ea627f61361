//! User management controller.

use crate::{
    extractors::ValidatedJson,
    responses::{created, ok, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use roster_core::{DeletedUser, RosterError, User, UserId};
use roster_service::{CreateUserRequest, UpdateUserRequest};
use tracing::debug;

/// Creates the user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
}

/// List all users.
async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    debug!("List users request");

    let users = state.user_service.list_users().await?;
    ok(users)
}

/// Create a new user.
async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    debug!("Create user request: {}", request.email);

    let user = state.user_service.create_user(request).await?;
    Ok(created(user))
}

/// Get a user by ID.
async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    debug!("Get user request: {}", id);

    let user_id = parse_user_id(&id)?;
    let user = state.user_service.get_user(user_id).await?;
    ok(user)
}

/// Apply a partial update to a user.
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<User> {
    debug!("Update user request: {}", id);

    let user_id = parse_user_id(&id)?;
    let user = state.user_service.update_user(user_id, request).await?;
    ok(user)
}

/// Delete a user.
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeletedUser> {
    debug!("Delete user request: {}", id);

    let user_id = parse_user_id(&id)?;
    let deleted = state.user_service.delete_user(user_id).await?;
    ok(deleted)
}

/// Helper to parse user ID from path parameter.
fn parse_user_id(id: &str) -> Result<UserId, AppError> {
    UserId::parse(id)
        .map_err(|_| AppError(RosterError::validation(format!("Invalid user ID: {}", id))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id() {
        assert_eq!(parse_user_id("9").unwrap(), UserId(9));
        assert_eq!(parse_user_id(" 12 ").unwrap(), UserId(12));

        let err = parse_user_id("abc").unwrap_err();
        assert!(matches!(err.0, RosterError::Validation(_)));
        assert!(parse_user_id("-1").is_err());
    }
}
