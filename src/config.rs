use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::analysis::AnalyzerConfig;
use crate::llm_client::retry::RetryPolicy;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Application configuration loaded from environment variables.
/// The provider API key is required; everything else has defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_api_url: String,
    /// Candidate models in preference order: primary first, then fallbacks.
    pub models: Vec<String>,
    pub max_retries: u32,
    pub initial_retry_delay: Duration,
    pub max_retry_delay: Duration,
    pub request_timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
    pub chunk_words: usize,
    /// Independent of `max_retries`: bounds tolerated per-chunk failures
    /// during document analysis, not per-call retry attempts.
    pub max_chunk_failures: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_api_url: env_or("OPENAI_API_URL", DEFAULT_API_URL),
            models: model_preference_list(
                env_or("OPENAI_MODEL", DEFAULT_MODEL),
                std::env::var("OPENAI_FALLBACK_MODELS").ok().as_deref(),
            ),
            max_retries: parse_env("LLM_MAX_RETRIES", 3)?,
            initial_retry_delay: Duration::from_millis(parse_env(
                "LLM_INITIAL_RETRY_DELAY_MS",
                1_000,
            )?),
            max_retry_delay: Duration::from_millis(parse_env("LLM_MAX_RETRY_DELAY_MS", 8_000)?),
            request_timeout: Duration::from_secs(parse_env("LLM_REQUEST_TIMEOUT_SECS", 30)?),
            temperature: parse_env("LLM_TEMPERATURE", 0.7)?,
            max_tokens: parse_env("LLM_MAX_TOKENS", 2_000)?,
            chunk_words: parse_env("ANALYSIS_CHUNK_WORDS", 1_000)?,
            max_chunk_failures: parse_env("ANALYSIS_MAX_CHUNK_FAILURES", 3)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: self.initial_retry_delay,
            max_delay: self.max_retry_delay,
            ..RetryPolicy::default()
        }
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            chunk_words: self.chunk_words,
            max_chunk_failures: self.max_chunk_failures,
        }
    }
}

/// Builds the ordered candidate-model list from the primary model and an
/// optional comma-separated fallback list.
fn model_preference_list(primary: String, fallbacks: Option<&str>) -> Vec<String> {
    let mut models = vec![primary];
    if let Some(raw) = fallbacks {
        models.extend(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
        );
    }
    models
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
