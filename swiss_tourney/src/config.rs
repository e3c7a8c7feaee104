//! Engine configuration loaded from environment variables.

use crate::db::DatabaseConfig;

/// Tournament manager settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// How many times a round creation that lost an optimistic race is
    /// retried against a fresh snapshot
    pub max_round_retries: u32,
}

impl ManagerConfig {
    /// Load from the environment.
    ///
    /// - `TOURNEY_MAX_ROUND_RETRIES`: retries after a concurrent round
    ///   creation (default: 3)
    pub fn from_env() -> Self {
        Self {
            max_round_retries: parse_env_or("TOURNEY_MAX_ROUND_RETRIES", 3),
        }
    }

    /// Validate loaded values
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for out-of-range values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_round_retries > 100 {
            return Err(ConfigError::Invalid {
                var: "TOURNEY_MAX_ROUND_RETRIES".to_string(),
                reason: "Must be at most 100".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_round_retries: 3,
        }
    }
}

/// Everything a process running the engine needs
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub database: DatabaseConfig,
    pub manager: ManagerConfig,
}

impl EngineConfig {
    /// Load and validate the full configuration.
    ///
    /// `database_url_override` takes precedence over `DATABASE_URL`.
    pub fn from_env(database_url_override: Option<String>) -> Result<Self, ConfigError> {
        let database = match database_url_override {
            Some(url) => DatabaseConfig::from_env_with_url(url),
            None => DatabaseConfig::from_env()?,
        };
        let config = Self {
            database,
            manager: ManagerConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.manager.validate()
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an environment variable, falling back to `default` when it is unset
/// or unparsable
pub(crate) fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "DATABASE_URL".to_string(),
            hint: "postgres://localhost/swiss".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DATABASE_URL"));
        assert!(msg.contains("postgres://localhost/swiss"));
    }

    #[test]
    fn test_manager_validation() {
        assert!(ManagerConfig::default().validate().is_ok());
        let config = ManagerConfig {
            max_round_retries: 1000,
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    #[serial]
    fn test_manager_from_env() {
        // SAFETY: serialized with every other test touching the environment
        unsafe { std::env::set_var("TOURNEY_MAX_ROUND_RETRIES", "7") };
        assert_eq!(ManagerConfig::from_env().max_round_retries, 7);

        unsafe { std::env::set_var("TOURNEY_MAX_ROUND_RETRIES", "many") };
        assert_eq!(ManagerConfig::from_env().max_round_retries, 3);

        unsafe { std::env::remove_var("TOURNEY_MAX_ROUND_RETRIES") };
        assert_eq!(ManagerConfig::from_env().max_round_retries, 3);
    }

    #[test]
    #[serial]
    fn test_engine_config_with_url_override() {
        unsafe { std::env::remove_var("DATABASE_URL") };
        let config =
            EngineConfig::from_env(Some("postgres://localhost/swiss_test".to_string())).unwrap();
        assert_eq!(config.database.database_url, "postgres://localhost/swiss_test");
    }
}
