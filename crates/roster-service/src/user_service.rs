//! User service trait definition.

use crate::cache::CacheStatsSnapshot;
use crate::dto::{CreateUserRequest, UpdateUserRequest};
use async_trait::async_trait;
use roster_core::{DeletedUser, RosterResult, User, UserId};

/// User service trait.
///
/// Results are exactly what the record store produced; the cache never
/// changes what a caller observes beyond staleness bounded by the TTL.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Creates a new user.
    async fn create_user(&self, request: CreateUserRequest) -> RosterResult<User>;

    /// Lists all users in insertion order.
    async fn list_users(&self) -> RosterResult<Vec<User>>;

    /// Gets a user by ID.
    async fn get_user(&self, id: UserId) -> RosterResult<User>;

    /// Applies a partial update to a user.
    async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> RosterResult<User>;

    /// Deletes a user.
    async fn delete_user(&self, id: UserId) -> RosterResult<DeletedUser>;

    /// Name of the cache backend in use.
    fn cache_backend(&self) -> &'static str;

    /// Current cache counters.
    fn cache_stats(&self) -> CacheStatsSnapshot;
}
