//! Application configuration.
//!
//! Loaded from a YAML file (`--config`, `$KANVAX_CONFIG`, or
//! `~/.kanvax/config.yaml`), then overridden by environment variables.
//! Everything has a sensible default so a bare `kanvax serve` works.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default port for the HTTP API.
pub const DEFAULT_PORT: u16 = 8642;

/// Default upstream model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default Generative Language API base URL.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where the store snapshot lives.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Port for the HTTP API (default: 8642).
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// API key for the generative-language service. Absent means AI
    /// features are disabled and routes answer with a structured error.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            api_base: default_api_base(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            port: default_port(),
            ai: AiConfig::default(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_data_file() -> PathBuf {
    user_dir().join("tasks.json")
}

/// User-level directory for config and data: `$KANVAX_HOME` or `~/.kanvax`.
pub fn user_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("KANVAX_HOME") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|h| h.join(".kanvax"))
        .unwrap_or_else(|| PathBuf::from(".kanvax"))
}

impl Config {
    /// Load configuration: explicit path beats `$KANVAX_CONFIG` beats the
    /// user-level file; a missing implicit file just means defaults. Env
    /// overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match Self::config_path(explicit) {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                let config: Config = serde_yaml::from_str(&text)
                    .with_context(|| format!("failed to parse config file {}", path.display()))?;
                debug!(path = %path.display(), "config loaded");
                config
            }
            Some(path) if explicit.is_some() => {
                anyhow::bail!("config file not found: {}", path.display());
            }
            _ => Config::default(),
        };
        config.apply_env();
        Ok(config)
    }

    fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var("KANVAX_CONFIG") {
            return Some(PathBuf::from(path));
        }
        Some(user_dir().join("config.yaml"))
    }

    /// Environment variable overrides (highest priority).
    fn apply_env(&mut self) {
        if let Ok(path) = std::env::var("KANVAX_DATA_FILE") {
            self.data_file = PathBuf::from(path);
        }
        if let Ok(port) = std::env::var("KANVAX_PORT")
            && let Ok(port) = port.parse()
        {
            self.port = port;
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY")
            && !key.is_empty()
        {
            self.ai.api_key = Some(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: Config = serde_yaml::from_str("port: 9000").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.ai.model, DEFAULT_MODEL);
        assert!(config.ai.api_key.is_none());
    }

    #[test]
    fn full_config_parses() {
        let yaml = r#"
data_file: /tmp/kanvax/tasks.json
port: 1234
ai:
  api_key: test-key
  model: gemini-test
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.data_file, PathBuf::from("/tmp/kanvax/tasks.json"));
        assert_eq!(config.ai.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.ai.model, "gemini-test");
        assert_eq!(config.ai.api_base, DEFAULT_API_BASE);
    }
}
