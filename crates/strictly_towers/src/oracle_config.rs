//! Oracle configuration.

use crate::llm_client::{LlmConfig, LlmProvider};
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Where oracle proposals come from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OracleProvider {
    /// OpenAI chat completions with tool calling.
    #[value(name = "openai")]
    OpenAI,
    /// Anthropic messages with tool use.
    Anthropic,
    /// Offline: the optimal planner, continued from the live state.
    Planner,
}

/// Configuration for an oracle-driven session.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct OracleConfig {
    /// Oracle provider.
    #[serde(default = "default_provider")]
    provider: OracleProvider,

    /// Model name, passed through to the provider unchanged.
    #[serde(default = "default_model")]
    #[setters(into)]
    model: String,

    /// Maximum tokens per oracle reply.
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,

    /// Iteration budget for a session.
    #[serde(default = "default_max_iterations")]
    max_iterations: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,

    /// Override for the provider's API base URL.
    #[serde(default)]
    #[setters(strip_option, into)]
    base_url: Option<String>,
}

fn default_provider() -> OracleProvider {
    OracleProvider::OpenAI
}

fn default_model() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_max_tokens() -> u32 {
    256
}

fn default_max_iterations() -> u32 {
    100
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            max_iterations: default_max_iterations(),
            request_timeout_secs: default_request_timeout_secs(),
            base_url: None,
        }
    }
}

impl OracleConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        info!(provider = %config.provider, model = %config.model, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::new(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::new(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Creates LLM configuration from this oracle config.
    ///
    /// Requires OPENAI_API_KEY or ANTHROPIC_API_KEY depending on the provider.
    /// Fails for the offline planner provider.
    #[instrument(skip(self), fields(provider = %self.provider, model = %self.model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        debug!("Creating LLM config");

        let (provider, key_var) = match self.provider {
            OracleProvider::OpenAI => (LlmProvider::OpenAI, "OPENAI_API_KEY"),
            OracleProvider::Anthropic => (LlmProvider::Anthropic, "ANTHROPIC_API_KEY"),
            OracleProvider::Planner => {
                return Err(ConfigError::new(
                    "The planner provider does not use an LLM".to_string(),
                ));
            }
        };

        let api_key = std::env::var(key_var)
            .map_err(|_| ConfigError::new(format!("{key_var} environment variable not set")))?;

        Ok(LlmConfig::new(
            provider,
            api_key,
            self.model.clone(),
            self.max_tokens,
            self.base_url.clone(),
            self.request_timeout(),
        ))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OracleConfig::default();
        assert_eq!(*config.provider(), OracleProvider::OpenAI);
        assert_eq!(config.model(), "gpt-4.1-mini");
        assert_eq!(*config.max_iterations(), 100);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: OracleConfig = toml::from_str(
            r#"
            provider = "anthropic"
            model = "claude-3-5-haiku-20241022"
            "#,
        )
        .unwrap();
        assert_eq!(*config.provider(), OracleProvider::Anthropic);
        assert_eq!(*config.max_tokens(), 256);
        assert_eq!(*config.base_url(), None);
    }

    #[test]
    fn test_setters_override() {
        let config = OracleConfig::default()
            .with_provider(OracleProvider::Planner)
            .with_model("local")
            .with_base_url("http://localhost:8080");
        assert_eq!(*config.provider(), OracleProvider::Planner);
        assert_eq!(config.model(), "local");
        assert_eq!(config.base_url().as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_planner_has_no_llm_config() {
        let config = OracleConfig::default().with_provider(OracleProvider::Planner);
        assert!(config.create_llm_config().is_err());
    }

    #[test]
    fn test_zero_iterations_invalid() {
        let config = OracleConfig::default().with_max_iterations(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_error_records_location() {
        let err = ConfigError::new("boom".to_string());
        assert!(err.file.ends_with("oracle_config.rs"));
        assert!(err.to_string().contains("boom"));
    }
}
