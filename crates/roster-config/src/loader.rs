//! Configuration loader with layered sources.

use crate::{AppConfig, CacheBackend};
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use config::builder::DefaultState;
use roster_core::RosterError;
use std::path::Path;
use tracing::{debug, info, warn};

/// Loads and validates the layered configuration once at startup.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: AppConfig,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Local overrides
    /// 4. Environment variables with `ROSTER__` prefix
    /// 5. `REDIS_HOST`, `REDIS_PORT`, `REDIS_DB`
    pub fn new(config_dir: impl AsRef<str>) -> Result<Self, RosterError> {
        let config = Self::load_config(config_dir.as_ref())?;
        Ok(Self { config })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, RosterError> {
        Self::new("./config")
    }

    /// Consumes the loader and returns the validated configuration.
    #[must_use]
    pub fn into_config(self) -> AppConfig {
        self.config
    }

    /// Loads configuration from the specified directory.
    fn load_config(config_dir: &str) -> Result<AppConfig, RosterError> {
        // Load .env file if present
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var("ROSTER_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{}/{}.toml", config_dir, name);
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("ROSTER")
                .separator("__")
                .try_parsing(true),
        );

        builder = apply_redis_env_overrides(builder).map_err(config_error_to_roster_error)?;

        let config = builder.build().map_err(config_error_to_roster_error)?;

        let mut app_config: AppConfig = config
            .try_deserialize()
            .map_err(config_error_to_roster_error)?;
        app_config.app.environment = environment;

        validate_config(&app_config)?;

        Ok(app_config)
    }
}

/// Plain `REDIS_*` variables override the file and `ROSTER__REDIS__*` values.
fn apply_redis_env_overrides(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let host = std::env::var("REDIS_HOST").ok().filter(|h| !h.is_empty());
    let port = parse_env_number("REDIS_PORT");
    let db = parse_env_number("REDIS_DB");

    builder
        .set_override_option("redis.host", host)?
        .set_override_option("redis.port", port)?
        .set_override_option("redis.db", db)
}

fn parse_env_number(name: &str) -> Option<i64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a number", name, raw);
            None
        }
    }
}

/// Validates the configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), RosterError> {
    if config.server.port == 0 {
        return Err(RosterError::Configuration(
            "Server port must be non-zero".to_string(),
        ));
    }

    if config.cache.ttl_ms == 0 {
        return Err(RosterError::Configuration(
            "Cache TTL must be greater than zero".to_string(),
        ));
    }

    if config.cache.backend == CacheBackend::Redis && config.redis.host.trim().is_empty() {
        return Err(RosterError::Configuration(
            "Redis host is required when the redis cache backend is selected".to_string(),
        ));
    }

    if config.app.environment == "production" && config.cache.backend == CacheBackend::Disabled {
        warn!("Cache is disabled in production; every read will hit the record store");
    }

    Ok(())
}

fn config_error_to_roster_error(err: ConfigError) -> RosterError {
    RosterError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn load(dir: &tempfile::TempDir) -> Result<AppConfig, RosterError> {
        ConfigLoader::new(dir.path().to_string_lossy()).map(ConfigLoader::into_config)
    }

    #[test]
    fn test_load_from_empty_directory_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&dir).unwrap();

        assert_eq!(config.app.name, "roster");
        assert_eq!(config.cache.ttl_ms, 300_000);
        assert_eq!(config.cache.entry_limit(), Some(10));
    }

    #[test]
    fn test_load_from_default_toml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            r#"
[server]
port = 8081

[cache]
backend = "disabled"
ttl_ms = 1500
max_entries = 0
"#,
        )
        .unwrap();

        let config = load(&dir).unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.cache.backend, CacheBackend::Disabled);
        assert_eq!(config.cache.ttl_ms, 1500);
        assert_eq!(config.cache.entry_limit(), None);
    }

    #[test]
    fn test_local_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[cache]\nttl_ms = 1000\n").unwrap();
        fs::write(dir.path().join("local.toml"), "[cache]\nttl_ms = 2000\n").unwrap();

        assert_eq!(load(&dir).unwrap().cache.ttl_ms, 2000);
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[cache]\nttl_ms = 0\n").unwrap();

        assert!(matches!(load(&dir), Err(RosterError::Configuration(_))));
    }

    #[test]
    fn test_validate_config() {
        let mut config = AppConfig::default();
        assert!(validate_config(&config).is_ok());

        config.server.port = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.cache.backend = CacheBackend::Redis;
        config.redis.host = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }
}
