//! Centralized server configuration.
//!
//! Loaded via the `config` crate from environment variables, with `__`
//! separating nested keys (e.g. `DELETION__GRACE_PERIOD_SECONDS=60`).

use chrono::Duration as ChronoDuration;
use serde::Deserialize;

/// Server configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Where integrations are stored.
    #[serde(default)]
    pub storage: StorageBackend,

    /// PostgreSQL connection URL; required for the `postgres` backend.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Background deletion settings.
    #[serde(default)]
    pub deletion: DeletionConfig,

    /// Setup pipeline session settings.
    #[serde(default)]
    pub setup: SetupConfig,
}

/// Integration storage backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process memory; for local development.
    Memory,
}

/// Settings for the deletion sweep.
#[derive(Debug, Clone, Deserialize)]
pub struct DeletionConfig {
    /// Interval between sweeps, in seconds.
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    /// How long an integration stays cancellable after deletion is
    /// requested, in seconds.
    #[serde(default = "default_grace_period_seconds")]
    pub grace_period_seconds: u64,
}

fn default_interval_seconds() -> u64 {
    60
}

fn default_grace_period_seconds() -> u64 {
    3600
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            grace_period_seconds: default_grace_period_seconds(),
        }
    }
}

impl DeletionConfig {
    /// How long a queued integration waits before it is removed.
    pub fn grace_period(&self) -> ChronoDuration {
        seconds(self.grace_period_seconds)
    }
}

/// Settings for in-flight setup sessions.
#[derive(Debug, Clone, Deserialize)]
pub struct SetupConfig {
    /// How long an abandoned setup session is kept, in minutes.
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: u64,

    /// Interval between expired session cleanups, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,
}

fn default_session_ttl_minutes() -> u64 {
    30
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            session_ttl_minutes: default_session_ttl_minutes(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
        }
    }
}

impl SetupConfig {
    pub fn session_ttl(&self) -> ChronoDuration {
        seconds(self.session_ttl_minutes.saturating_mul(60))
    }
}

fn seconds(value: u64) -> ChronoDuration {
    i64::try_from(value)
        .ok()
        .and_then(ChronoDuration::try_seconds)
        .unwrap_or(ChronoDuration::MAX)
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(
            config::Environment::default()
                .separator("__")
                .try_parsing(true),
        )
    }

    fn from_source<S>(source: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config: Self = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.storage == StorageBackend::Postgres && self.database_url.is_none() {
            return Err(config::ConfigError::NotFound("database_url".to_string()));
        }
        if self.deletion.interval_seconds == 0 || self.setup.cleanup_interval_seconds == 0 {
            return Err(config::ConfigError::Message(
                "sweep intervals must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn load(toml: &str) -> Result<ServerConfig, config::ConfigError> {
        ServerConfig::from_source(File::from_str(toml, FileFormat::Toml))
    }

    #[test]
    fn deletion_config_has_correct_defaults() {
        let config = DeletionConfig::default();
        assert_eq!(config.interval_seconds, 60);
        assert_eq!(config.grace_period_seconds, 3600);
    }

    #[test]
    fn oversized_durations_saturate() {
        let config = DeletionConfig {
            interval_seconds: 60,
            grace_period_seconds: u64::MAX,
        };
        assert_eq!(config.grace_period(), ChronoDuration::MAX);
        assert_eq!(
            SetupConfig::default().session_ttl(),
            ChronoDuration::minutes(30)
        );
    }

    #[test]
    fn postgres_requires_database_url() {
        assert!(load("").is_err());
        let config = load(r#"database_url = "postgres://localhost/switchyard""#).expect("load");
        assert_eq!(config.storage, StorageBackend::Postgres);
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let config = load(
            r#"
            storage = "memory"

            [deletion]
            grace_period_seconds = 5
            "#,
        )
        .expect("load");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.deletion.grace_period_seconds, 5);
        assert_eq!(config.deletion.interval_seconds, 60);
        assert_eq!(config.setup.session_ttl_minutes, 30);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let result = load(
            r#"
            storage = "memory"

            [deletion]
            interval_seconds = 0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn setup_sessions_are_configurable() {
        let config = load(
            r#"
            storage = "memory"

            [setup]
            session_ttl_minutes = 5
            "#,
        )
        .expect("load");
        assert_eq!(config.setup.session_ttl_minutes, 5);
        assert_eq!(config.setup.cleanup_interval_seconds, 300);
    }
}
