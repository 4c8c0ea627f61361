//! Repository trait definitions.

use async_trait::async_trait;
use roster_core::{DeletedUser, NewUser, RosterResult, User, UserId, UserPatch};

/// Authoritative user store.
///
/// Lookups by an unknown id fail with [`roster_core::RosterError::NotFound`].
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a user with the next sequential id.
    async fn create(&self, input: NewUser) -> RosterResult<User>;

    /// Returns every live user in insertion order.
    async fn list(&self) -> RosterResult<Vec<User>>;

    /// Finds a user by id.
    async fn get(&self, id: UserId) -> RosterResult<User>;

    /// Merges `patch` into an existing user.
    async fn update(&self, id: UserId, patch: UserPatch) -> RosterResult<User>;

    /// Removes a user and returns it with a confirmation message.
    async fn delete(&self, id: UserId) -> RosterResult<DeletedUser>;

    /// Monotonic counter bumped by every successful mutation.
    async fn revision(&self) -> RosterResult<u64>;
}
