//! Configuration management for loglens
//!
//! Settings are loaded from environment variables with sensible defaults and
//! may then be overridden field by field (the CLI does this from its flags).
//!
//! # Environment Variables
//!
//! - `LOGLENS_PROVIDER`: openai|ollama|claude|gemini|grok|groq - default: "openai"
//! - `LOGLENS_MODEL`: model name - default depends on the provider ("gpt-3.5-turbo" for OpenAI)
//! - `LOGLENS_BATCH_SIZE`: entries per request - default: "10"
//! - `LOGLENS_MAX_ENTRY_CHARS`: per-entry character cap - default: "1000"
//! - `LOGLENS_TEMPERATURE`: sampling temperature - default: "0.3"
//! - `LOGLENS_MAX_TOKENS`: response token cap - default: "500"
//! - `LOGLENS_REQUEST_DELAY_MS`: pause after each request - default: "1000"
//! - `LOGLENS_REQUEST_TIMEOUT`: request timeout in seconds - default: "60"
//! - `LOGLENS_OUTPUT_FORMAT`: json|text - default: "json"
//! - `LOGLENS_RESULT_MODE`: paired|per-batch - default: "paired"
//! - `LOGLENS_OUTPUT_DIR`: directory for result files - default: "."
//! - `LOGLENS_THREAT_FRAMEWORK`: framework to map entries to, e.g. "MITRE ATT&CK" - default: unset
//! - `LOGLENS_LOG_LEVEL`: logging level - default: "info"
//!
//! Provider credentials are never part of this struct. They are read by the
//! `genai` crate from the provider's standard variable (`OPENAI_API_KEY`,
//! `ANTHROPIC_API_KEY`, `GEMINI_API_KEY`, `XAI_API_KEY`, `GROQ_API_KEY`).

use crate::llm::{BackendError, GenAIClient, LLMClient};
use crate::pipeline::{AnalysisSettings, OutputFormat, ResultMode, RunSettings};
use genai::adapter::AdapterKind;
use std::env;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5:7b";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_BATCH_SIZE: usize = crate::pipeline::batcher::DEFAULT_BATCH_SIZE;
const DEFAULT_MAX_ENTRY_CHARS: usize = crate::pipeline::normalizer::DEFAULT_MAX_ENTRY_CHARS;
const DEFAULT_TEMPERATURE: f32 = crate::pipeline::analysis::DEFAULT_TEMPERATURE;
const DEFAULT_MAX_TOKENS: u32 = crate::pipeline::analysis::DEFAULT_MAX_TOKENS;
const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

const MAX_BATCH_SIZE: usize = 1000;
const MAX_REQUEST_DELAY_MS: u64 = 600_000;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 3600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid provider: {0}. Valid options: openai, ollama, claude, gemini, grok, groq")]
    InvalidProvider(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Backend initialization failed: {0}")]
    BackendInitError(#[from] BackendError),
}

/// Parses a provider name as accepted by `LOGLENS_PROVIDER` and `--provider`.
pub fn parse_provider(name: &str) -> Result<AdapterKind, ConfigError> {
    match name.to_lowercase().as_str() {
        "openai" => Ok(AdapterKind::OpenAI),
        "ollama" => Ok(AdapterKind::Ollama),
        "claude" | "anthropic" => Ok(AdapterKind::Anthropic),
        "gemini" => Ok(AdapterKind::Gemini),
        "grok" | "xai" => Ok(AdapterKind::Xai),
        "groq" => Ok(AdapterKind::Groq),
        _ => Err(ConfigError::InvalidProvider(name.to_string())),
    }
}

/// Model used when none is configured for `provider`
pub fn default_model(provider: AdapterKind) -> &'static str {
    match provider {
        AdapterKind::Ollama => DEFAULT_OLLAMA_MODEL,
        AdapterKind::Anthropic => "claude-3-5-haiku-latest",
        AdapterKind::Gemini => "gemini-1.5-flash",
        AdapterKind::Xai => "grok-2-latest",
        AdapterKind::Groq => "llama-3.1-8b-instant",
        _ => DEFAULT_OPENAI_MODEL,
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}

#[derive(Debug, Clone)]
pub struct LoglensConfig {
    pub provider: AdapterKind,
    pub model: String,
    pub batch_size: usize,
    pub max_entry_chars: usize,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub output_format: OutputFormat,
    pub result_mode: ResultMode,
    pub output_dir: PathBuf,
    pub threat_framework: Option<String>,
    pub log_level: String,
}

impl Default for LoglensConfig {
    fn default() -> Self {
        let provider = env::var("LOGLENS_PROVIDER")
            .ok()
            .and_then(|s| parse_provider(&s).ok())
            .unwrap_or(AdapterKind::OpenAI);

        let model = env::var("LOGLENS_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| default_model(provider).to_string());

        let output_dir = env::var("LOGLENS_OUTPUT_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let threat_framework = env::var("LOGLENS_THREAT_FRAMEWORK")
            .ok()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());

        let log_level = env::var("LOGLENS_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            provider,
            model,
            batch_size: env_parsed("LOGLENS_BATCH_SIZE").unwrap_or(DEFAULT_BATCH_SIZE),
            max_entry_chars: env_parsed("LOGLENS_MAX_ENTRY_CHARS")
                .unwrap_or(DEFAULT_MAX_ENTRY_CHARS),
            temperature: env_parsed("LOGLENS_TEMPERATURE").unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: env_parsed("LOGLENS_MAX_TOKENS").unwrap_or(DEFAULT_MAX_TOKENS),
            request_delay_ms: env_parsed("LOGLENS_REQUEST_DELAY_MS")
                .unwrap_or(DEFAULT_REQUEST_DELAY_MS),
            request_timeout_secs: env_parsed("LOGLENS_REQUEST_TIMEOUT")
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            output_format: env_parsed("LOGLENS_OUTPUT_FORMAT").unwrap_or_default(),
            result_mode: env_parsed("LOGLENS_RESULT_MODE").unwrap_or_default(),
            output_dir,
            threat_framework,
            log_level,
        }
    }
}

impl LoglensConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ValidationFailed(
                "Batch size must be at least 1".to_string(),
            ));
        }
        if self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::ValidationFailed(format!(
                "Batch size cannot exceed {}",
                MAX_BATCH_SIZE
            )));
        }

        if self.max_entry_chars == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max entry length must be at least 1 character".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationFailed(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max tokens must be at least 1".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 1 hour".to_string(),
            ));
        }

        if self.request_delay_ms > MAX_REQUEST_DELAY_MS {
            return Err(ConfigError::ValidationFailed(
                "Request delay cannot exceed 10 minutes".to_string(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Model name must not be empty".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn run_settings(&self) -> Result<RunSettings, ConfigError> {
        let batch_size = NonZeroUsize::new(self.batch_size).ok_or_else(|| {
            ConfigError::ValidationFailed("Batch size must be at least 1".to_string())
        })?;

        Ok(RunSettings {
            batch_size,
            max_entry_chars: self.max_entry_chars,
            result_mode: self.result_mode,
            output_format: self.output_format,
            output_dir: self.output_dir.clone(),
        })
    }

    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            threat_framework: self.threat_framework.clone(),
        }
    }

    /// Name of the credential variable the provider needs but that is unset.
    pub fn missing_credential(&self) -> Option<&'static str> {
        self.provider
            .default_key_env_name()
            .filter(|var| env::var(var).map(|v| v.trim().is_empty()).unwrap_or(true))
    }

    /// Creates the production completion client for the configured provider.
    pub fn create_client(&self) -> Result<Arc<dyn LLMClient>, ConfigError> {
        let client = GenAIClient::new(self.provider, self.model.clone(), self.request_timeout())?;
        Ok(Arc::new(client))
    }
}
