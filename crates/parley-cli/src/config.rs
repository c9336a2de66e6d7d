//! Configuration file support

use parley_api::ClientConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for parley
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat service base URL
    pub api_url: Option<String>,
    /// Identity presented to the service; a fresh one is generated per run when unset
    pub user_id: Option<String>,
    /// Request timeout in seconds (no timeout when unset)
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("parley")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for PARLEY_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("PARLEY_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    ///
    /// The generated file pins a user id so conversations survive restarts.
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            api_url: Some(parley_api::DEFAULT_BASE_URL.to_string()),
            user_id: Some(generate_user_id()),
            timeout_secs: None,
        };

        default_config.save()?;
        Ok(path)
    }

    /// Resolve client settings: CLI flag, then this file, then the environment
    pub fn client_config(&self, cli_url: Option<&str>) -> ClientConfig {
        let mut client = ClientConfig::from_env();
        if let Some(url) = cli_url.or(self.api_url.as_deref()) {
            client = client.with_base_url(url);
        }
        if let Some(secs) = self.timeout_secs {
            client = client.with_timeout(Duration::from_secs(secs));
        }
        client
    }
}

/// A fresh `user_` identity with nine random characters
pub fn generate_user_id() -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("user_{}", &random[..9])
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# parley configuration file
# Place at ~/.config/parley/config.toml (Linux/Mac) or %APPDATA%\parley\config.toml (Windows)

# Chat service base URL (PARLEY_API_URL is used when unset)
api_url = "http://localhost:8000"

# Identity presented to the service. Keep it to see your past conversations
# across runs; remove it to start anonymously each time.
# user_id = "user_abc123def"

# Request timeout in seconds (optional, waits indefinitely when unset)
# timeout_secs = 60
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses() {
        let config = Config::parse(example_config()).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.user_id, None);
        assert_eq!(config.timeout_secs, None);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_cli_url_beats_config_file() {
        let config = Config {
            api_url: Some("http://from-file:8000".into()),
            user_id: None,
            timeout_secs: Some(30),
        };

        let client = config.client_config(Some("http://from-flag:9000"));
        assert_eq!(client.base_url, "http://from-flag:9000");
        assert_eq!(client.request_timeout, Some(Duration::from_secs(30)));

        let client = config.client_config(None);
        assert_eq!(client.base_url, "http://from-file:8000");
    }

    #[test]
    fn test_generated_user_id_shape() {
        let id = generate_user_id();
        assert!(id.starts_with("user_"));
        assert_eq!(id.len(), 14);
        assert_ne!(id, generate_user_id());
    }
}
