/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported LLM providers:
 * - DashScope: Alibaba Cloud Qwen text-generation API
 * - OpenAI: any OpenAI-compatible chat completions endpoint
 * - Mock: scripted provider used by the test suite
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

pub mod dashscope;
pub mod mock;
pub mod openai;

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// Provider-agnostic completion request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Ordered conversation, normally one system and one user message
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: None,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Content of the last user message
    pub fn user_text(&self) -> &str {
        self.messages.iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

/// Provider-agnostic completion response
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    /// Generated text
    pub text: String,
    /// Prompt tokens, when reported
    pub prompt_tokens: Option<u64>,
    /// Completion tokens, when reported
    pub completion_tokens: Option<u64>,
}

/// Common trait for all LLM providers
///
/// Providers perform exactly one network exchange per `complete` call;
/// pacing and retries belong to the translation client.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Complete a request using this provider
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError>;
}

/// Build the HTTP client shared by the network providers
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_default()
}

/// Read a failed response body and classify it
pub(crate) async fn error_from_response(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    log::error!("Provider API error ({}): {}", status, body);
    ProviderError::from_status(status, body)
}

/// Construct the configured provider.
///
/// A missing credential is a construction-time failure.
pub fn build_provider(config: &TranslationConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config.get_api_key();
    if api_key.trim().is_empty() {
        return Err(ProviderError::MissingCredential(format!(
            "no API key for {} (set it in the config or via {})",
            config.provider.display_name(),
            config.provider.credential_env_vars().join(" / ")
        )));
    }

    let endpoint = config.get_endpoint();
    let model = config.get_model();
    let timeout = config.get_timeout_secs();

    let provider: Arc<dyn Provider> = match config.provider {
        TranslationProvider::DashScope => {
            Arc::new(dashscope::DashScope::new(api_key, endpoint, model, timeout)?)
        }
        TranslationProvider::OpenAI => {
            Arc::new(openai::OpenAI::new(api_key, endpoint, model, timeout)?)
        }
    };
    Ok(provider)
}
