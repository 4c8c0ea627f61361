//! Component wiring.
//!
//! Every long-lived component is built exactly once here and shared through
//! [`AppState`]. Nothing is global, so tests can build as many isolated
//! stacks as they need.

use roster_config::{AppConfig, CacheBackend};
use roster_core::RosterResult;
use roster_repository::{InMemoryUserRepository, UserRepository};
use roster_rest::AppState;
use roster_service::{
    register_metrics, CacheInterface, CachePolicy, CachedUserService, MemoryCacheService,
    RedisCacheService, UserService,
};
use std::sync::Arc;
use tracing::info;

/// Builds the cache backend selected by `cache.backend`.
pub fn build_cache(config: &AppConfig) -> RosterResult<Arc<dyn CacheInterface>> {
    let cache: Arc<dyn CacheInterface> = match config.cache.backend {
        CacheBackend::Memory => match config.cache.entry_limit() {
            Some(max) => Arc::new(MemoryCacheService::with_max_entries(max)),
            None => Arc::new(MemoryCacheService::new()),
        },
        CacheBackend::Redis => Arc::new(RedisCacheService::from_config(&config.redis)?),
        CacheBackend::Disabled => Arc::new(RedisCacheService::disabled()),
    };

    info!("Cache backend: {}", cache.backend_name());
    Ok(cache)
}

/// Builds the seeded store, the cache and the coordinator in front of them.
pub fn build_user_service(config: &AppConfig) -> RosterResult<Arc<CachedUserService>> {
    let user_repository: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::seeded());
    let cache = build_cache(config)?;
    let policy = CachePolicy::from(&config.cache);

    Ok(Arc::new(CachedUserService::with_policy(
        user_repository,
        cache,
        policy,
    )))
}

/// Builds the application state handed to the router.
pub fn build_app_state(config: &AppConfig) -> RosterResult<AppState> {
    register_metrics();

    let user_service: Arc<dyn UserService> = build_user_service(config)?;
    Ok(AppState::new(user_service))
}
