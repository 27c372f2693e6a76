/*!
 * Core translation client.
 *
 * `TranslationClient` turns one text plus a job's preferences into one
 * provider call, gated by the shared `RateGate` and wrapped in an explicit
 * retry loop.
 */

use log::{debug, warn};
use std::sync::Arc;

use crate::app_config::Config;
use crate::errors::{ProviderError, TranslationError};
use crate::providers::{build_provider, ChatRequest, Provider};

use super::preferences::TranslationPreferences;
use super::prompts::PromptTemplate;
use super::rate_gate::{RateGate, RateGateConfig};
use super::retry::{RetryDecision, RetryPolicy};

/// Tunables for a `TranslationClient`
#[derive(Debug, Clone)]
pub struct TranslationOptions {
    /// Sampling temperature passed to the provider
    pub temperature: f32,
    /// Concurrency and pacing limits
    pub gate: RateGateConfig,
    /// Attempt budget and backoff
    pub retry: RetryPolicy,
    /// Default chunk size for batch translation
    pub chunk_size: usize,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            gate: RateGateConfig::default(),
            retry: RetryPolicy::default(),
            chunk_size: 10,
        }
    }
}

impl TranslationOptions {
    pub fn from_config(config: &Config) -> Self {
        let common = &config.translation.common;
        Self {
            temperature: common.temperature,
            gate: common.rate_gate_config(),
            retry: common.retry_policy(),
            chunk_size: common.chunk_size.max(1),
        }
    }
}

/// Translation client shared by every unit of a job
#[derive(Clone, Debug)]
pub struct TranslationClient {
    provider: Arc<dyn Provider>,
    gate: Arc<RateGate>,
    template: PromptTemplate,
    pub(crate) options: TranslationOptions,
}

impl TranslationClient {
    /// Create a client around an already constructed provider
    pub fn new(provider: Arc<dyn Provider>, options: TranslationOptions) -> Self {
        Self {
            provider,
            gate: Arc::new(RateGate::new(options.gate)),
            template: PromptTemplate::default(),
            options,
        }
    }

    /// Create a client for the configured provider.
    ///
    /// Fails with `ProviderError::MissingCredential` when no API key is
    /// available from the config or the environment.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let provider = build_provider(&config.translation)?;
        Ok(Self::new(provider, TranslationOptions::from_config(config)))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn gate(&self) -> &RateGate {
        &self.gate
    }

    pub fn options(&self) -> &TranslationOptions {
        &self.options
    }

    /// Render the system instruction for a job
    pub fn system_prompt(&self, preferences: &TranslationPreferences) -> String {
        self.template.render(preferences)
    }

    /// Translate one text.
    ///
    /// Blank input is returned unchanged without calling the provider.
    pub async fn translate(
        &self,
        text: &str,
        preferences: &TranslationPreferences,
    ) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let request = ChatRequest::new(self.system_prompt(preferences), text)
            .temperature(self.options.temperature);
        let policy = &self.options.retry;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let result = {
                let _permit = self.gate.acquire().await;
                self.provider.complete(&request).await
            };

            let error = match result {
                Ok(response) => {
                    let translated = response.text.trim();
                    if translated.is_empty() {
                        return Err(TranslationError::EmptyResponse);
                    }
                    debug!(
                        "Translated {} chars with {} (attempt {})",
                        text.chars().count(),
                        self.provider.name(),
                        attempt
                    );
                    return Ok(translated.to_string());
                }
                Err(error) => error,
            };

            if RetryPolicy::classify(&error) == RetryDecision::Fail {
                warn!("Provider {} failed permanently: {}", self.provider.name(), error);
                return Err(TranslationError::Provider(error));
            }

            if !policy.has_attempts_left(attempt) {
                warn!(
                    "Provider {} failed after {} attempts: {}",
                    self.provider.name(),
                    attempt,
                    error
                );
                return Err(TranslationError::RetriesExhausted { attempts: attempt, last: error });
            }

            let delay = policy.delay_for(attempt);
            warn!(
                "Transient provider error: {} - attempt {}/{}, retrying in {:?}",
                error, attempt, policy.max_attempts, delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}
