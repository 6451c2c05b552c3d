//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/greengrowth/config.toml

pub mod defaults;

use crate::error::{Error, Result};
use crate::model::AnalysisKind;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analysis Service connection
    #[serde(default)]
    pub service: ServiceConfig,

    /// Session server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Place lookup settings
    #[serde(default)]
    pub geocoder: GeocoderConfig,

    /// CSV export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Defaults for one-shot commands
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Analysis Service connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL the `/analyze/*` endpoints hang off
    #[serde(default = "default_service_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Session server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Place lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Nominatim instance
    #[serde(default = "default_geocoder_url")]
    pub url: String,

    /// User-Agent sent to the geocoder
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// CSV export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory exported files are written to
    #[serde(default = "default_export_dir")]
    pub directory: String,
}

/// Defaults for one-shot commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,

    /// Comma-separated analyses run by `analyze`
    #[serde(default = "default_kinds")]
    pub kinds: String,
}

// Default value functions for serde
fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_geocoder_url() -> String {
    DEFAULT_GEOCODER_URL.to_string()
}
fn default_user_agent() -> String {
    DEFAULT_GEOCODER_USER_AGENT.to_string()
}
fn default_export_dir() -> String {
    DEFAULT_EXPORT_DIR.to_string()
}
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}
fn default_kinds() -> String {
    DEFAULT_KINDS.to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_service_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: default_geocoder_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_dir(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            kinds: default_kinds(),
        }
    }
}

/// Parse a comma-separated list of analysis kinds
pub fn parse_kinds(value: &str) -> Result<Vec<AnalysisKind>> {
    let mut kinds = Vec::new();
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let kind = AnalysisKind::from_str(part).map_err(Error::Config)?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    if kinds.is_empty() {
        return Err(Error::Config("No analysis kinds given".to_string()));
    }
    Ok(kinds)
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["service", "base_url"] => Some(self.service.base_url.clone()),
            ["service", "timeout_secs"] => Some(self.service.timeout_secs.to_string()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["geocoder", "url"] => Some(self.geocoder.url.clone()),
            ["geocoder", "user_agent"] => Some(self.geocoder.user_agent.clone()),

            ["export", "directory"] => Some(self.export.directory.clone()),

            ["defaults", "format"] => Some(self.defaults.format.clone()),
            ["defaults", "kinds"] => Some(self.defaults.kinds.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["service", "base_url"] => {
                self.service.base_url = value.to_string();
            }
            ["service", "timeout_secs"] => {
                self.service.timeout_secs = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid timeout value: {}", value)))?;
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid port value: {}", value)))?;
            }

            ["geocoder", "url"] => {
                self.geocoder.url = value.to_string();
            }
            ["geocoder", "user_agent"] => {
                self.geocoder.user_agent = value.to_string();
            }

            ["export", "directory"] => {
                self.export.directory = value.to_string();
            }

            ["defaults", "format"] => {
                if crate::format::get_formatter(value).is_none() {
                    return Err(Error::Config(format!("Unknown format: {}", value)));
                }
                self.defaults.format = value.to_string();
            }
            ["defaults", "kinds"] => {
                parse_kinds(value)?;
                self.defaults.kinds = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "service.base_url",
            "service.timeout_secs",
            "server.host",
            "server.port",
            "geocoder.url",
            "geocoder.user_agent",
            "export.directory",
            "defaults.format",
            "defaults.kinds",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Analyses run by `analyze` when none are given
    pub fn default_kinds(&self) -> Result<Vec<AnalysisKind>> {
        parse_kinds(&self.defaults.kinds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn with_temp_config<F: FnOnce()>(f: F) {
        let temp_dir = TempDir::new().unwrap();
        env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        f();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.service.base_url, "http://127.0.0.1:8000/api");
        assert_eq!(config.service.timeout_secs, 120);
        assert_eq!(config.server.port, 7878);
        assert_eq!(config.defaults.format, "text");
        assert_eq!(
            config.default_kinds().unwrap(),
            vec![AnalysisKind::Seasonal, AnalysisKind::Growth]
        );
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        config.set("service.base_url", "https://greengrowth.example.com/api").unwrap();
        assert_eq!(
            config.get("service.base_url"),
            Some("https://greengrowth.example.com/api".to_string())
        );

        config.set("service.timeout_secs", "30").unwrap();
        assert_eq!(config.service.timeout_secs, 30);

        config.set("defaults.kinds", "growth").unwrap();
        assert_eq!(config.default_kinds().unwrap(), vec![AnalysisKind::Growth]);
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_value() {
        let mut config = Config::default();
        assert!(config.set("server.port", "not_a_number").is_err());
        assert!(config.set("defaults.kinds", "history").is_err());
        assert!(config.set("defaults.format", "xml").is_err());
        assert_eq!(config.defaults.kinds, "seasonal,growth");
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!(
            parse_kinds("growth, seasonal, growth").unwrap(),
            vec![AnalysisKind::Growth, AnalysisKind::Seasonal]
        );
        assert!(parse_kinds(" , ").is_err());
    }

    #[test]
    fn test_save_and_load() {
        with_temp_config(|| {
            let mut config = Config::default();
            config.service.base_url = "http://analysis:8000/api".to_string();
            config.server.port = 9000;
            config.save().unwrap();

            let loaded = Config::load().unwrap();
            assert_eq!(loaded.service.base_url, "http://analysis:8000/api");
            assert_eq!(loaded.server.port, 9000);
        });
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: Config = toml::from_str("[server]\nport = 8080\n").unwrap();
        assert_eq!(loaded.server.port, 8080);
        assert_eq!(loaded.server.host, "127.0.0.1");
        assert_eq!(loaded.export.directory, ".");
    }

    #[test]
    fn test_serialization_format() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();

        assert!(toml.contains("[service]"));
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[geocoder]"));
        assert!(toml.contains("[export]"));
    }

    #[test]
    fn test_server_addr() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "127.0.0.1:7878");
    }

    #[test]
    fn test_available_keys() {
        let config = Config::default();
        for key in Config::available_keys() {
            assert!(config.get(key).is_some(), "missing getter for {}", key);
        }
    }
}
