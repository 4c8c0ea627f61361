//! Application configuration structures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Cache-aside configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Redis connection configuration.
    #[serde(default)]
    pub redis: RedisConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "roster".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server host.
    pub host: String,
    /// HTTP server port.
    pub port: u16,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Enable CORS.
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_secs: 30,
            cors_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Returns the HTTP server address.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the request timeout as a Duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Which cache backend sits behind the coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-process map.
    #[default]
    Memory,
    /// Networked Redis instance.
    Redis,
    /// No caching; every read goes to the store.
    Disabled,
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Redis => write!(f, "redis"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

/// Cache-aside configuration.
///
/// TTL is expressed in milliseconds here and handed to the coordinator as a
/// [`Duration`]; each backend converts it to its own unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Backend selection.
    pub backend: CacheBackend,
    /// Time-to-live for every cache write, in milliseconds.
    pub ttl_ms: u64,
    /// Upper bound on entries held by the in-process backend; 0 is unbounded.
    pub max_entries: usize,
    /// Skip or undo populates that raced with a store mutation.
    pub guard_stale_populates: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            ttl_ms: 300_000, // 5 minutes
            max_entries: 10,
            guard_stale_populates: false,
        }
    }
}

impl CacheConfig {
    /// Returns the cache TTL as a Duration.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Entry bound for the in-process backend, `None` when unbounded.
    #[must_use]
    pub const fn entry_limit(&self) -> Option<usize> {
        match self.max_entries {
            0 => None,
            max => Some(max),
        }
    }
}

/// Redis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis host.
    pub host: String,
    /// Redis port.
    pub port: u16,
    /// Logical database index.
    pub db: u32,
    /// Connection pool size.
    pub pool_size: usize,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
            pool_size: 10,
        }
    }
}

impl RedisConfig {
    /// Composes the connection address from host, port and database index.
    #[must_use]
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (json, pretty).
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Returns true when logs should be emitted as JSON lines.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}
