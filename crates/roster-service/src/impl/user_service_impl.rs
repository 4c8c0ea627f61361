//! Cache-aside user service.

use crate::cache::{cache_keys, CacheExt, CacheInterface, CacheStats, CacheStatsSnapshot, DEFAULT_TTL};
use crate::dto::{CreateUserRequest, UpdateUserRequest};
use crate::user_service::UserService;
use async_trait::async_trait;
use roster_config::CacheConfig;
use roster_core::{DeletedUser, RosterResult, User, UserId, ValidateExt};
use roster_repository::UserRepository;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How the coordinator writes to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// TTL applied to every cache write.
    pub ttl: Duration,
    /// Skip or undo populates that overlapped a store mutation.
    pub guard_stale_populates: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            guard_stale_populates: false,
        }
    }
}

impl From<&CacheConfig> for CachePolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            ttl: config.ttl(),
            guard_stale_populates: config.guard_stale_populates,
        }
    }
}

/// Decision taken before a read-miss goes to the store.
#[derive(Debug, Clone, Copy)]
enum PopulateGuard {
    /// Guard disabled; always populate.
    Unguarded,
    /// Store revision observed before the read.
    Revision(u64),
    /// Revision unavailable; do not populate.
    Skip,
}

/// User service that fronts the record store with a cache.
///
/// Reads try the cache, fall back to the store on a miss and populate the
/// cache with the result. Mutations go to the store first and then delete
/// every key they could have made stale. Cache failures never reach the
/// caller: they are logged, counted and treated as misses.
pub struct CachedUserService {
    user_repository: Arc<dyn UserRepository>,
    cache: Arc<dyn CacheInterface>,
    policy: CachePolicy,
    stats: Arc<CacheStats>,
}

impl CachedUserService {
    /// Creates a service with the default policy.
    pub fn new(user_repository: Arc<dyn UserRepository>, cache: Arc<dyn CacheInterface>) -> Self {
        Self::with_policy(user_repository, cache, CachePolicy::default())
    }

    /// Creates a service with an explicit policy.
    pub fn with_policy(
        user_repository: Arc<dyn UserRepository>,
        cache: Arc<dyn CacheInterface>,
        policy: CachePolicy,
    ) -> Self {
        Self {
            user_repository,
            cache,
            policy,
            stats: Arc::new(CacheStats::new()),
        }
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Live counters shared with this service.
    #[must_use]
    pub fn stats(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    /// Serves `key` from the cache, or loads it and populates the cache.
    async fn read_through<T, F, Fut>(&self, key: &str, load: F) -> RosterResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = RosterResult<T>> + Send,
    {
        if !self.cache.is_enabled() {
            return load().await;
        }

        if let Some(value) = self.lookup::<T>(key).await {
            return Ok(value);
        }

        let guard = self.populate_guard().await;
        let value = match load().await {
            Ok(value) => value,
            Err(e) => {
                if e.is_not_found() {
                    debug!("Not caching absent entry for '{}'", key);
                }
                return Err(e);
            }
        };
        self.populate(key, &value, guard).await;
        Ok(value)
    }

    async fn lookup<T: DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        match self.cache.get::<T>(key).await {
            Ok(Some(value)) => {
                debug!("Cache hit: {}", key);
                self.stats.record_hit();
                Some(value)
            }
            Ok(None) => {
                debug!("Cache miss: {}", key);
                self.stats.record_miss();
                None
            }
            Err(e) => {
                warn!("Cache read failed for '{}', falling back to store: {}", key, e);
                self.stats.record_error("get");
                self.stats.record_miss();
                None
            }
        }
    }

    async fn populate_guard(&self) -> PopulateGuard {
        if !self.policy.guard_stale_populates {
            return PopulateGuard::Unguarded;
        }

        match self.user_repository.revision().await {
            Ok(revision) => PopulateGuard::Revision(revision),
            Err(e) => {
                warn!("Store revision unavailable, populate will be skipped: {}", e);
                PopulateGuard::Skip
            }
        }
    }

    /// True when the store has been mutated since `before` was observed.
    async fn revision_moved(&self, before: u64) -> bool {
        match self.user_repository.revision().await {
            Ok(now) => now != before,
            Err(e) => {
                warn!("Store revision unavailable: {}", e);
                true
            }
        }
    }

    async fn populate<T: Serialize + Send + Sync>(&self, key: &str, value: &T, guard: PopulateGuard) {
        let before = match guard {
            PopulateGuard::Unguarded => None,
            PopulateGuard::Revision(before) => Some(before),
            PopulateGuard::Skip => {
                self.stats.record_skipped_populate();
                return;
            }
        };

        if let Some(before) = before {
            if self.revision_moved(before).await {
                debug!("Store changed during read, not caching '{}'", key);
                self.stats.record_skipped_populate();
                return;
            }
        }

        if let Err(e) = self.cache.set(key, value, self.policy.ttl).await {
            warn!("Cache populate failed for '{}': {}", key, e);
            self.stats.record_error("set");
            return;
        }

        // The write may have landed after a concurrent invalidation. The delete
        // is unconditional, so a newer entry written meanwhile goes too; that
        // costs one extra miss.
        if let Some(before) = before {
            if self.revision_moved(before).await {
                debug!("Store changed while caching '{}', withdrawing entry", key);
                if let Err(e) = self.cache.delete(key).await {
                    warn!("Failed to withdraw stale cache entry '{}': {}", key, e);
                    self.stats.record_error("delete");
                }
                self.stats.record_skipped_populate();
                return;
            }
        }

        self.stats.record_populate();
    }

    /// Deletes the per-user key (if any) and the collection key.
    async fn invalidate(&self, id: Option<UserId>) {
        if !self.cache.is_enabled() {
            return;
        }

        if let Some(id) = id {
            self.evict(&cache_keys::user_by_id(id)).await;
        }
        self.evict(&cache_keys::all_users()).await;
    }

    async fn evict(&self, key: &str) {
        match self.cache.delete(key).await {
            Ok(existed) => {
                debug!("Invalidated '{}' (present: {})", key, existed);
                self.stats.record_invalidation();
            }
            Err(e) => {
                warn!("Cache invalidation failed for '{}': {}", key, e);
                self.stats.record_error("delete");
            }
        }
    }
}

#[async_trait]
impl UserService for CachedUserService {
    async fn create_user(&self, request: CreateUserRequest) -> RosterResult<User> {
        debug!("Creating user: {}", request.email);

        request.validate_request()?;

        let user = self.user_repository.create(request.into()).await?;
        self.invalidate(None).await;

        info!("User created: {}", user.id);
        Ok(user)
    }

    async fn list_users(&self) -> RosterResult<Vec<User>> {
        debug!("Listing users");

        let key = cache_keys::all_users();
        self.read_through(&key, || self.user_repository.list()).await
    }

    async fn get_user(&self, id: UserId) -> RosterResult<User> {
        debug!("Getting user: {}", id);

        let key = cache_keys::user_by_id(id);
        self.read_through(&key, || self.user_repository.get(id)).await
    }

    async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> RosterResult<User> {
        debug!("Updating user: {}", id);

        request.validate_request()?;

        let user = self.user_repository.update(id, request.into()).await?;
        self.invalidate(Some(id)).await;

        info!("User updated: {}", id);
        Ok(user)
    }

    async fn delete_user(&self, id: UserId) -> RosterResult<DeletedUser> {
        debug!("Deleting user: {}", id);

        let deleted = self.user_repository.delete(id).await?;
        self.invalidate(Some(id)).await;

        info!("User deleted: {}", id);
        Ok(deleted)
    }

    fn cache_backend(&self) -> &'static str {
        self.cache.backend_name()
    }

    fn cache_stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }
}

impl std::fmt::Debug for CachedUserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedUserService")
            .field("cache", &self.cache.backend_name())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
