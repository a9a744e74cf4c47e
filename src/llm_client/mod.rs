//! Completion client — the single point of entry for all LLM calls.
//!
//! ARCHITECTURAL RULE: no other module may talk to the completion provider
//! directly. Every structured generator goes through [`CompletionClient`],
//! which owns retry, backoff, and model-fallback policy and guarantees that
//! any returned text parses as a JSON object.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod retry;

use retry::{FailReason, RetryClass, RetryPolicy, RetryState, Step};

/// Classified outcome of a single provider call.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("rate limited by provider")]
    RateLimited,

    #[error("request timed out")]
    Timeout,

    #[error("connection to provider failed: {0}")]
    Connection(String),

    #[error("provider server error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("model '{model}' is unavailable")]
    ModelUnavailable { model: String },

    #[error("provider rejected request (status {status}): {message}")]
    BadRequest { status: u16, message: String },

    #[error("provider returned empty content")]
    EmptyContent,

    #[error("unexpected provider error: {0}")]
    Unexpected(String),
}

impl ProviderError {
    /// How the retry loop should treat this failure; `None` means the
    /// error is terminal and must surface immediately.
    fn retry_class(&self) -> Option<RetryClass> {
        match self {
            ProviderError::RateLimited | ProviderError::Server { .. } => Some(RetryClass::Backoff),
            ProviderError::Timeout | ProviderError::EmptyContent => Some(RetryClass::ShortDelay),
            ProviderError::Connection(_) => Some(RetryClass::LongDelay),
            ProviderError::ModelUnavailable { .. } => Some(RetryClass::NextModel),
            ProviderError::BadRequest { .. } | ProviderError::Unexpected(_) => None,
        }
    }
}

/// Terminal outcome of an [`CompletionClient::execute`] call.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("retries exhausted after {attempts} attempts: {last}")]
    ExhaustedRetries { attempts: u32, last: ProviderError },

    #[error("provider error: {0}")]
    Terminal(ProviderError),

    #[error("invalid response from provider: {0}")]
    InvalidResponse(String),
}

/// One fully-specified provider call. Immutable once built. Carries the
/// single model already selected for this attempt; iteration over the
/// candidate-model preference list happens upstream in [`RetryState`].
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

/// Boundary to the completion provider. The production implementation is
/// [`OpenAiProvider`]; tests inject scripted fakes.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Executes exactly one call and classifies its failure, performing
    /// no retries of its own.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}

// ---------------------------------------------------------------------------
// OpenAI-compatible wire protocol
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// Production provider speaking the OpenAI chat-completions protocol with
/// JSON-object response mode.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl OpenAiProvider {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        OpenAiProvider {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();

        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited);
        }
        if status.is_server_error() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Server {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(classify_client_error(status.as_u16(), &raw, &request.model));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unexpected(format!("malformed provider response: {e}")))?;

        match parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
        {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(ProviderError::EmptyContent),
        }
    }
}

fn classify_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else if err.is_connect() {
        ProviderError::Connection(err.to_string())
    } else {
        ProviderError::Unexpected(err.to_string())
    }
}

/// Distinguishes "this model does not exist" from every other 4xx so the
/// retry loop can advance to a fallback model without consuming a retry.
fn classify_client_error(status: u16, raw_body: &str, model: &str) -> ProviderError {
    let parsed = serde_json::from_str::<ApiError>(raw_body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .unwrap_or_else(|| raw_body.to_string());
    let code = parsed.and_then(|e| e.error.code);

    let model_missing = code.as_deref() == Some("model_not_found")
        || (message.contains(model)
            && (message.contains("does not exist") || message.contains("not found")));
    if model_missing {
        ProviderError::ModelUnavailable {
            model: model.to_string(),
        }
    } else {
        ProviderError::BadRequest { status, message }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// The completion client shared by all generators. Constructed once at
/// startup and passed by reference; holds no per-call state, so it is
/// freely shareable.
#[derive(Clone)]
pub struct CompletionClient {
    provider: Arc<dyn CompletionProvider>,
    models: Vec<String>,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    policy: RetryPolicy,
}

impl CompletionClient {
    pub fn new(config: &crate::config::Config) -> Self {
        let provider = OpenAiProvider::new(
            config.openai_api_url.clone(),
            config.openai_api_key.clone(),
        );
        CompletionClient {
            provider: Arc::new(provider),
            models: config.models.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: config.request_timeout,
            policy: config.retry_policy(),
        }
    }

    /// Seam for tests and alternative providers.
    pub fn with_provider(
        provider: Arc<dyn CompletionProvider>,
        models: Vec<String>,
        policy: RetryPolicy,
    ) -> Self {
        CompletionClient {
            provider,
            models,
            temperature: 0.7,
            max_tokens: 2_000,
            timeout: Duration::from_secs(30),
            policy,
        }
    }

    pub fn primary_model(&self) -> &str {
        &self.models[0]
    }

    /// Executes one logical "generate a JSON object from this prompt"
    /// operation with the configured retry budget.
    pub async fn execute(&self, prompt: &str) -> Result<String, LlmError> {
        self.execute_with_retries(prompt, self.policy.max_retries).await
    }

    /// Like [`execute`](Self::execute) but with an explicit retry budget.
    /// `max_retries` counts retries on top of the initial attempt.
    pub async fn execute_with_retries(
        &self,
        prompt: &str,
        max_retries: u32,
    ) -> Result<String, LlmError> {
        let policy = RetryPolicy {
            max_retries,
            ..self.policy.clone()
        };
        let mut state = RetryState::new(self.models.clone(), policy);

        loop {
            let request = CompletionRequest {
                model: state.current_model().to_string(),
                prompt: prompt.to_string(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                timeout: self.timeout,
            };

            let failure = match self.provider.complete(&request).await {
                Ok(content) => return validate_json_object(content),
                Err(e) => e,
            };

            let Some(class) = failure.retry_class() else {
                warn!(model = %request.model, error = %failure, "terminal provider error");
                return Err(LlmError::Terminal(failure));
            };

            match state.on_failure(class) {
                Step::Backoff(delay) => {
                    warn!(
                        model = %request.model,
                        error = %failure,
                        delay_ms = delay.as_millis() as u64,
                        attempts_left = state.attempts_left(),
                        "provider call failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Step::NextModel => {
                    warn!(
                        unavailable = %request.model,
                        next = state.current_model(),
                        "model unavailable, advancing to fallback"
                    );
                }
                Step::Fail(FailReason::RetriesExhausted) => {
                    return Err(match failure {
                        // An exhausted empty-content budget means the provider
                        // kept answering with nothing usable.
                        ProviderError::EmptyContent => LlmError::InvalidResponse(
                            "provider returned empty content on every attempt".to_string(),
                        ),
                        last => LlmError::ExhaustedRetries {
                            attempts: max_retries + 1,
                            last,
                        },
                    });
                }
                Step::Fail(FailReason::CandidatesExhausted) => {
                    return Err(LlmError::Terminal(failure));
                }
            }
        }
    }
}

/// Accepts only a syntactically valid JSON *object*; shape validation
/// beyond that is the caller's job.
fn validate_json_object(content: String) -> Result<String, LlmError> {
    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(serde_json::Value::Object(_)) => {
            debug!(bytes = content.len(), "completion accepted");
            Ok(content)
        }
        Ok(_) => Err(LlmError::InvalidResponse(
            "response is not a JSON object".to_string(),
        )),
        Err(e) => Err(LlmError::InvalidResponse(format!(
            "invalid JSON response: {e}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------
