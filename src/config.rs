use std::{fs, path::Path};

use serde::Deserialize;

use crate::{FlowError, Result};

/// Default polling interval for the execution list, in milliseconds.
const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// backend api config
    #[serde(default)]
    pub api: ApiConfig,
    /// editor behaviour config
    #[serde(default)]
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// base url of the REST backend, e.g. `https://app.example.com/api`
    pub base_url: String,
    /// bearer token sent with every request
    #[serde(default)]
    pub token: Option<String>,
    /// request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    /// execution list polling interval in milliseconds, defaults to 5000
    #[serde(default = "default_poll_interval_ms")]
    pub execution_poll_interval_ms: u64,
    /// capacity of the user notice queue
    #[serde(default = "default_notice_capacity")]
    pub notice_capacity: usize,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_notice_capacity() -> usize {
    64
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            token: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            execution_poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            notice_capacity: default_notice_capacity(),
        }
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|e| FlowError::Config(format!("failed to load config file {:?}: {}", path.as_ref(), e)))?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_str)?;
        if config.api.base_url.trim().is_empty() {
            return Err(FlowError::Config("api.base_url must not be empty".to_string()));
        }
        if config.editor.execution_poll_interval_ms == 0 {
            return Err(FlowError::Config("editor.execution_poll_interval_ms must be positive".to_string()));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use crate::{Config, FlowError};

    #[test]
    fn test_config_deserialize() {
        let toml_str = r#"
        [api]
        base_url = "https://app.digisol.ai/api"
        token = "secret"
        timeout_ms = 1500

        [editor]
        execution_poll_interval_ms = 2000
        "#;
        let config = Config::load_from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "https://app.digisol.ai/api");
        assert_eq!(config.api.token.as_deref(), Some("secret"));
        assert_eq!(config.api.timeout_ms, 1500);
        assert_eq!(config.editor.execution_poll_interval_ms, 2000);
        assert_eq!(config.editor.notice_capacity, 64);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::load_from_str("").unwrap();
        assert_eq!(config.editor.execution_poll_interval_ms, 5000);
        assert!(config.api.token.is_none());
    }

    #[test]
    fn test_config_rejects_zero_interval() {
        let toml_str = r#"
        [editor]
        execution_poll_interval_ms = 0
        "#;
        assert!(matches!(Config::load_from_str(toml_str), Err(FlowError::Config(_))));
    }

    #[test]
    fn test_config_missing_file() {
        assert!(matches!(Config::create("/nonexistent/flowcanvas.toml"), Err(FlowError::Config(_))));
    }
}
