//! Cache key generators for consistent key naming.

use roster_core::UserId;

/// Prefix for all cache keys to namespace them.
const CACHE_PREFIX: &str = "roster:cache";

/// Key holding the snapshot of the full user collection.
#[must_use]
pub fn all_users() -> String {
    format!("{}:users:all", CACHE_PREFIX)
}

/// Key holding a single user by ID.
#[must_use]
pub fn user_by_id(id: UserId) -> String {
    format!("{}:user:{}", CACHE_PREFIX, id)
}
