//! User-related DTOs.

use roster_core::{NewUser, UserPatch};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(range(max = 150, message = "Age must be at most 150"))]
    pub age: u32,

    #[validate(length(min = 1, max = 32, message = "Role must be 1-32 characters"))]
    #[serde(default)]
    pub role: Option<String>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(request: CreateUserRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            age: request.age,
            role: request.role,
        }
    }
}

/// Partial update; omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[serde(default)]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    #[serde(default)]
    pub email: Option<String>,

    #[validate(range(max = 150, message = "Age must be at most 150"))]
    #[serde(default)]
    pub age: Option<u32>,

    #[validate(length(min = 1, max = 32, message = "Role must be 1-32 characters"))]
    #[serde(default)]
    pub role: Option<String>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            age: request.age,
            role: request.role,
        }
    }
}
