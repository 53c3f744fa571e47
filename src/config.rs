use crate::error::{PipelineError, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub sync: SyncConfig,
    #[serde(default)]
    pub transport: TransportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Full URL of the multimodal generateContent endpoint.
    pub endpoint: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Page-creation proxy endpoint for the remote calendar store.
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_max_attempts() -> usize {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Resolve the extraction API key from the configured environment
    /// variable (populated from `.env` by the host).
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.extraction.api_key_env).map_err(|_| {
            PipelineError::Config(format!(
                "Environment variable {} is not set",
                self.extraction.api_key_env
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
[extraction]
endpoint = "https://ai.example.com/v1/models/vision:generateContent"

[sync]
endpoint = "https://proxy.example.com/api/create-page"
"#;

    #[test]
    fn minimal_config_gets_transport_defaults() {
        let config = Config::from_str(MINIMAL).unwrap();
        assert_eq!(config.transport.max_attempts, 3);
        assert_eq!(config.transport.base_delay_ms, 1000);
        assert_eq!(config.transport.timeout_seconds, 30);
        assert_eq!(config.extraction.api_key_env, "GEMINI_API_KEY");
    }

    #[test]
    fn transport_overrides_are_honored() {
        let content = format!("{}\n[transport]\nmax_attempts = 5\nbase_delay_ms = 250\n", MINIMAL);
        let config = Config::from_str(&content).unwrap();
        assert_eq!(config.transport.max_attempts, 5);
        assert_eq!(config.transport.base_delay_ms, 250);
        assert_eq!(config.transport.timeout_seconds, 30);
    }

    #[test]
    fn load_from_reads_a_file_on_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let config = Config::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.sync.endpoint, "https://proxy.example.com/api/create-page");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = Config::load_from("/nonexistent/config.toml").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
