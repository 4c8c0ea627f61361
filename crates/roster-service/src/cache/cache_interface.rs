//! Backend contract used by the cache-aside coordinator.

use async_trait::async_trait;
use roster_core::RosterResult;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Key/value store with per-entry expiry that fronts the record store.
///
/// Entries are derived copies of store data: any of them may vanish at any
/// time and the coordinator must cope. Payloads cross the trait as JSON text
/// so adapters can be used as `dyn CacheInterface`.
#[async_trait]
pub trait CacheInterface: Send + Sync {
    /// Payload stored under `key`.
    ///
    /// An absent key and an expired entry are indistinguishable; both come
    /// back as `None`.
    async fn get_raw(&self, key: &str) -> RosterResult<Option<String>>;

    /// Stores `value` under `key` for `ttl`.
    ///
    /// Unconditional overwrite: an existing entry loses both its payload and
    /// its remaining lifetime.
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> RosterResult<()>;

    /// Removes `key`, reporting whether an entry was there.
    ///
    /// Idempotent; removing a missing key succeeds with `false`.
    async fn delete(&self, key: &str) -> RosterResult<bool>;

    /// `false` for a backend that never holds entries.
    fn is_enabled(&self) -> bool;

    /// Backend label for logs and `/health`.
    fn backend_name(&self) -> &'static str;
}

/// Typed access on top of [`CacheInterface`] using `serde_json`.
#[async_trait]
pub trait CacheExt: CacheInterface {
    /// Decodes the entry under `key`.
    ///
    /// A payload that does not decode as `T` is an error, not a miss; the
    /// caller decides how to treat it.
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> RosterResult<Option<T>> {
        self.get_raw(key)
            .await?
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(Into::into)
    }

    /// Encodes `value` and stores it under `key` for `ttl`.
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> RosterResult<()> {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, &json, ttl).await
    }
}

impl<C: CacheInterface + ?Sized> CacheExt for C {}
