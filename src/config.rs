// ABOUTME: Configuration management for dbcred
// ABOUTME: Named connection profiles in a JSON file; passwords live in the secret store only

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::ConnectionParams;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Config directory not found")]
    NoDirFound,
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),
    #[error("Cannot remove the last profile")]
    LastProfile,
}

/// Connection profile for a database server
///
/// Holds everything except the password, which is looked up by
/// (`service_name`, account) in the secret store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionProfile {
    pub service_name: String,
    pub scheme: String,
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
    pub database: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default = "default_true")]
    pub trust_certificate: bool,
}

fn default_true() -> bool {
    true
}

/// Well-known port for a scheme, if there is one
pub fn default_port(scheme: &str) -> Option<u32> {
    match scheme.to_ascii_lowercase().as_str() {
        "postgresql" | "postgres" => Some(5432),
        "mysql" | "mariadb" => Some(3306),
        "mssql" | "sqlserver" => Some(1433),
        _ => None,
    }
}

impl Default for ConnectionProfile {
    fn default() -> Self {
        Self {
            service_name: "dbcred".to_string(),
            scheme: "postgresql".to_string(),
            host: "localhost".to_string(),
            port: None,
            database: "postgres".to_string(),
            account: None,
            trust_certificate: true,
        }
    }
}

impl ConnectionProfile {
    /// Account name, falling back to the current OS user
    pub fn account_name(&self) -> String {
        self.account.clone().unwrap_or_else(whoami::username)
    }

    /// Connection parameters for the resolver
    ///
    /// A missing port takes the scheme's well-known port. Unknown schemes
    /// without a port get 0, which the descriptor builder rejects.
    pub fn params(&self) -> ConnectionParams {
        let port = self
            .port
            .or_else(|| default_port(&self.scheme))
            .unwrap_or(0);
        ConnectionParams::new(
            self.scheme.clone(),
            self.host.clone(),
            port,
            self.database.clone(),
            self.account_name(),
        )
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_active_profile")]
    pub active_profile: String,
    #[serde(default)]
    pub profiles: HashMap<String, ConnectionProfile>,
}

fn default_version() -> u32 {
    1
}

fn default_active_profile() -> String {
    "default".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert("default".to_string(), ConnectionProfile::default());

        Self {
            version: 1,
            active_profile: "default".to_string(),
            profiles,
        }
    }
}

impl AppConfig {
    /// Get the config file path based on OS
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoDirFound)?;
        Ok(config_dir.join("dbcred").join("config.json"))
    }

    /// Load config from the default location, creating it if missing
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Load config from a file, or create a default one if it does not exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No config at {}, writing defaults", path.display());
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get a profile by name
    pub fn profile(&self, name: &str) -> Result<&ConnectionProfile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }

    /// Get the active connection profile
    pub fn active_profile(&self) -> Result<&ConnectionProfile, ConfigError> {
        self.profile(&self.active_profile)
    }

    /// Add or update a profile
    pub fn set_profile(&mut self, key: String, profile: ConnectionProfile) {
        self.profiles.insert(key, profile);
    }

    /// Remove a profile (cannot remove if it's the only one)
    pub fn remove_profile(&mut self, key: &str) -> Result<(), ConfigError> {
        if !self.profiles.contains_key(key) {
            return Err(ConfigError::ProfileNotFound(key.to_string()));
        }
        if self.profiles.len() <= 1 {
            return Err(ConfigError::LastProfile);
        }
        self.profiles.remove(key);

        // If we removed the active profile, switch to another one
        if self.active_profile == key {
            if let Some(first_key) = self.profiles.keys().min() {
                self.active_profile = first_key.clone();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn chinook() -> ConnectionProfile {
        ConnectionProfile {
            service_name: "postdb_demo".to_string(),
            scheme: "postgresql".to_string(),
            host: "localhost".to_string(),
            port: Some(5432),
            database: "chinook".to_string(),
            account: Some("postgres".to_string()),
            trust_certificate: true,
        }
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.version, 1);
        assert_eq!(config.active_profile, "default");
        assert!(config.profiles.contains_key("default"));
    }

    #[test]
    fn test_load_from_missing_writes_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = AppConfig::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.active_profile().unwrap(), &ConnectionProfile::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.set_profile("chinook".to_string(), chinook());
        config.active_profile = "chinook".to_string();
        config.save_to(&path).unwrap();

        let reloaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(reloaded.active_profile, "chinook");
        assert_eq!(reloaded.active_profile().unwrap(), &chinook());
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_profile_json_has_no_password() {
        let json = serde_json::to_string(&chinook()).unwrap();
        assert!(!json.contains("password"));

        let parsed: ConnectionProfile = serde_json::from_str(
            r#"{"service_name":"s","scheme":"mssql","host":"db","database":"sales"}"#,
        )
        .unwrap();
        assert_eq!(parsed.port, None);
        assert!(parsed.trust_certificate);
    }

    #[test]
    fn test_params_from_profile() {
        let params = chinook().params();
        assert_eq!(
            params,
            ConnectionParams::new("postgresql", "localhost", 5432, "chinook", "postgres")
        );
    }

    #[test]
    fn test_params_default_port_and_account() {
        let profile = ConnectionProfile {
            scheme: "mssql".to_string(),
            port: None,
            account: None,
            ..chinook()
        };
        let params = profile.params();
        assert_eq!(params.port(), 1433);
        assert_eq!(params.account_name(), whoami::username());

        let unknown = ConnectionProfile {
            scheme: "oracle".to_string(),
            port: None,
            ..chinook()
        };
        assert_eq!(unknown.params().port(), 0);
    }

    #[test]
    fn test_remove_profile() {
        let mut config = AppConfig::default();
        assert!(matches!(
            config.remove_profile("default"),
            Err(ConfigError::LastProfile)
        ));
        assert!(matches!(
            config.remove_profile("missing"),
            Err(ConfigError::ProfileNotFound(_))
        ));

        config.set_profile("chinook".to_string(), chinook());
        config.remove_profile("default").unwrap();
        assert_eq!(config.active_profile, "chinook");
        assert!(config.active_profile().is_ok());
    }
}
