//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Name of the key file searched in the working directory
const KEY_FILE: &str = "APIKEY.txt";

/// Configuration for quill
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API key (environment variable and key file are checked as fallbacks)
    pub api_key: Option<String>,
    /// Endpoint base URL override
    pub endpoint: Option<String>,
    /// Default model (display name or identifier)
    pub model: Option<String>,
    /// Maximum trailing messages sent per request
    pub context_limit: Option<usize>,
    /// Maximum tokens per response
    pub max_tokens: Option<u32>,
    /// Initial font scale
    pub font_size: Option<u16>,
    /// Additional models merged into the registry
    #[serde(default)]
    pub models: Vec<CustomModel>,
}

/// A user-defined model registry entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomModel {
    /// Display name shown in the selector
    pub name: String,
    /// Model identifier sent to the endpoint
    pub id: String,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quill")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for QUILL_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("QUILL_CONFIG_PATH") {
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
            Ok(content) => match toml::from_str(&content) {
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
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            model: Some("OpenRouter: Auto (Free)".to_string()),
            ..Default::default()
        };

        default_config.save()?;
        Ok(path)
    }

    /// Resolve the API key: config, then environment, then key file.
    ///
    /// `None` is a valid outcome: the app starts with submission disabled
    /// and a warning instead of failing.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
        {
            return Some(key.to_string());
        }

        if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
            let key = key.trim();
            if !key.is_empty() {
                return Some(key.to_string());
            }
        }

        read_key_file()
    }
}

/// Read the key file from the working directory, falling back to its parent
/// (for running from a build subdirectory).
fn read_key_file() -> Option<String> {
    for path in [PathBuf::from(KEY_FILE), PathBuf::from("..").join(KEY_FILE)] {
        if let Ok(content) = fs::read_to_string(&path) {
            let key = content.trim();
            if !key.is_empty() {
                return Some(key.to_string());
            }
        }
    }
    None
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# quill configuration file
# Place at ~/.config/quill/config.toml (Linux/Mac) or %APPDATA%\quill\config.toml (Windows)

# API key (or set OPENROUTER_API_KEY, or put the key in ./APIKEY.txt)
# api_key = "sk-or-..."

# Endpoint base URL (defaults to OpenRouter)
# endpoint = "https://openrouter.ai/api/v1"

# Default model: a display name from the registry or a raw model id
model = "OpenRouter: Auto (Free)"

# How many trailing messages to send with each request
# context_limit = 10

# Maximum tokens per response
# max_tokens = 4096

# Initial font scale (10-24)
# font_size = 14

# Extra models for the selector
# [[models]]
# name = "My Model"
# id = "vendor/model:tag"
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.api_key.is_none());
        assert!(config.models.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
api_key = "sk-or-test"
model = "Aurora Alpha"
context_limit = 6
font_size = 18

[[models]]
name = "Local"
id = "local/model"
"#,
        )
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-or-test"));
        assert_eq!(config.context_limit, Some(6));
        assert_eq!(config.models.len(), 1);
        assert_eq!(config.models[0].id, "local/model");
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.model.as_deref(), Some("OpenRouter: Auto (Free)"));
    }
}
