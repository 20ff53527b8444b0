use serde::{Deserialize, Serialize};
use std::path::Path;

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::resolver::{ResolverConfig, MAX_DNS_MESSAGE_LENGTH};

const LOCAL_CONFIG: &str = "ferrous-lookup.toml";
const SYSTEM_CONFIG: &str = "/etc/ferrous-lookup/config.toml";

/// Main configuration structure for the resolver
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-lookup.toml in current directory
    /// 3. /etc/ferrous-lookup/config.toml
    /// 4. Default configuration
    ///
    /// CLI overrides are applied last and the result is validated.
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::get_config_path() {
                Some(found) => Self::from_file(found)?,
                None => Self::default(),
            },
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.resolver.dns_port = port;
        }
        if let Some(timeout) = overrides.query_timeout_ms {
            self.resolver.query_timeout_ms = timeout;
        }
        if let Some(max) = overrides.max_indirection {
            self.resolver.max_indirection = max;
        }
        if overrides.disable_tcp_fallback {
            self.resolver.tcp_fallback = false;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let resolver = &self.resolver;

        if resolver.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }
        if resolver.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Query timeout must be greater than 0".to_string(),
            ));
        }
        if resolver.max_query_attempts == 0 {
            return Err(ConfigError::Validation(
                "At least one query attempt is required".to_string(),
            ));
        }
        if resolver.root_servers.is_empty() {
            return Err(ConfigError::Validation(
                "No root servers configured".to_string(),
            ));
        }
        if let Some(hint) = resolver.root_servers.iter().find(|h| h.name.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "Root server {} has no name",
                hint.address
            )));
        }
        if resolver.udp_buffer_size < MAX_DNS_MESSAGE_LENGTH {
            return Err(ConfigError::Validation(format!(
                "UDP buffer must hold at least {} bytes",
                MAX_DNS_MESSAGE_LENGTH
            )));
        }
        if !super::LoggingConfig::is_valid_level(&self.logging.level) {
            return Err(ConfigError::Validation(format!(
                "Unknown log level '{}'",
                self.logging.level
            )));
        }

        Ok(())
    }

    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;
        Ok(())
    }

    /// Get the path to the configuration file that `load` would pick up
    pub fn get_config_path() -> Option<&'static str> {
        [LOCAL_CONFIG, SYSTEM_CONFIG]
            .into_iter()
            .find(|path| Path::new(path).exists())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub query_timeout_ms: Option<u64>,
    pub max_indirection: Option<i32>,
    pub disable_tcp_fallback: bool,
    pub log_level: Option<String>,
}
