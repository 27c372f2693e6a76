use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{ChatMessage, ChatRequest, ChatResponse, Provider};
use crate::errors::ProviderError;

/// Client for OpenAI-compatible chat completion endpoints
#[derive(Debug)]
pub struct OpenAI {
    client: Client,
    api_key: String,
    url: Url,
    model: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

impl OpenAI {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl AsRef<str>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let base = endpoint.as_ref().trim_end_matches('/').to_string() + "/";
        let url = Url::parse(&base)
            .and_then(|u| u.join("chat/completions"))
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid OpenAI endpoint '{}': {}", base, e)))?;

        Ok(Self {
            client: super::http_client(timeout_secs),
            api_key: api_key.into(),
            url,
            model: model.into(),
        })
    }
}

#[async_trait]
impl Provider for OpenAI {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
        };

        let response = self.client.post(self.url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        if !response.status().is_success() {
            return Err(super::error_from_response(response).await);
        }

        let completion = response.json::<CompletionResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse OpenAI response: {}", e)))?;

        let choice = completion.choices.into_iter().next()
            .ok_or_else(|| ProviderError::ParseError("OpenAI response contained no choices".to_string()))?;

        Ok(ChatResponse {
            text: choice.message.content,
            prompt_tokens: completion.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens: completion.usage.as_ref().map(|u| u.completion_tokens),
        })
    }
}
