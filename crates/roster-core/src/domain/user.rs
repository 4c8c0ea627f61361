//! User entity, creation input, and merge patch.

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role assigned when a user is created without one.
pub const DEFAULT_ROLE: &str = "user";

/// User record as held by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned identifier, never mutated.
    pub id: UserId,

    /// Display name.
    pub name: String,

    /// Contact email.
    pub email: String,

    /// Age in years.
    pub age: u32,

    /// Free-form role label.
    pub role: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Merges the fields present in `patch` into this user.
    ///
    /// Absent fields keep their current value. The id and creation time are
    /// never touched, and `updated_at` never moves before `created_at`.
    pub fn apply_patch(&mut self, patch: UserPatch, now: DateTime<Utc>) {
        let UserPatch {
            name,
            email,
            age,
            role,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(age) = age {
            self.age = age;
        }
        if let Some(role) = role {
            self.role = role;
        }
        self.updated_at = now.max(self.created_at);
    }
}

/// Input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: u32,
    #[serde(default)]
    pub role: Option<String>,
}

impl NewUser {
    /// Builds the stored entity, stamping both timestamps with `now`.
    #[must_use]
    pub fn into_user(self, id: UserId, now: DateTime<Utc>) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            age: self.age,
            role: self.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Result of deleting a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedUser {
    pub message: String,
    pub deleted_user: User,
}

impl DeletedUser {
    /// Wraps a removed user with its confirmation message.
    #[must_use]
    pub fn new(deleted_user: User) -> Self {
        Self {
            message: format!("User with ID {} has been deleted", deleted_user.id),
            deleted_user,
        }
    }
}
