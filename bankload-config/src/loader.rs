//! Configuration loading and environment variable handling

use crate::domains::BankloadConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "BANKLOAD".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<BankloadConfig> {
        let config = self.read_file(path)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<BankloadConfig> {
        let config = self.read_env()?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<BankloadConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Read a YAML file and apply environment overrides without validating.
    /// Callers layering further overrides must call `validate_all` themselves.
    pub fn read_file(&self, path: impl AsRef<Path>) -> ConfigResult<BankloadConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: BankloadConfig = serde_yaml::from_str(&content)?;
        self.apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Defaults plus environment overrides, not validated
    pub fn read_env(&self) -> ConfigResult<BankloadConfig> {
        let mut config = BankloadConfig::default();
        self.apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut BankloadConfig) -> ConfigResult<()> {
        self.apply_target_overrides(&mut config.target)?;
        self.apply_http_overrides(&mut config.http)?;
        self.apply_load_overrides(&mut config.load)?;
        self.apply_scenario_overrides(&mut config.scenario)?;
        self.apply_logging_overrides(&mut config.logging)?;

        Ok(())
    }

    fn apply_target_overrides(
        &self,
        config: &mut crate::domains::target::TargetConfig,
    ) -> ConfigResult<()> {
        if let Ok(host) = self.get_env_var("HOST") {
            config.host = host;
        }

        Ok(())
    }

    /// Apply HTTP config overrides
    fn apply_http_overrides(
        &self,
        config: &mut crate::domains::http::HttpConfig,
    ) -> ConfigResult<()> {
        if let Ok(timeout) = self.get_env_var("HTTP_TIMEOUT") {
            let seconds: u64 = timeout
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid HTTP_TIMEOUT: {}", e)))?;
            config.timeout = Duration::from_secs(seconds);
        }

        if let Ok(user_agent) = self.get_env_var("HTTP_USER_AGENT") {
            config.user_agent = user_agent;
        }

        if let Ok(verify_ssl) = self.get_env_var("HTTP_VERIFY_SSL") {
            config.verify_ssl = verify_ssl
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid HTTP_VERIFY_SSL: {}", e)))?;
        }

        Ok(())
    }

    fn apply_load_overrides(
        &self,
        config: &mut crate::domains::load::LoadConfig,
    ) -> ConfigResult<()> {
        if let Ok(users) = self.get_env_var("USERS") {
            config.users = users
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid USERS: {}", e)))?;
        }

        if let Ok(rate) = self.get_env_var("SPAWN_RATE") {
            config.spawn_rate = rate
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid SPAWN_RATE: {}", e)))?;
        }

        if let Ok(run_time) = self.get_env_var("RUN_TIME") {
            let seconds: u64 = run_time
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid RUN_TIME: {}", e)))?;
            config.run_time = Some(Duration::from_secs(seconds));
        }

        Ok(())
    }

    fn apply_scenario_overrides(
        &self,
        config: &mut crate::domains::scenario::ScenarioConfig,
    ) -> ConfigResult<()> {
        if let Ok(variant) = self.get_env_var("VARIANT") {
            config.variant = crate::domains::scenario::Variant::from_str(&variant)
                .map_err(|_| ConfigError::EnvError(format!("Invalid VARIANT: {}", variant)))?;
        }

        if let Ok(salary) = self.get_env_var("SALARY_CENTS") {
            config.salary_cents = salary
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid SALARY_CENTS: {}", e)))?;
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        let key = format!("{}_{}", self.prefix, name);
        let value = std::env::var(&key)?;
        log::debug!("Applying environment override {}", key);
        Ok(value)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
