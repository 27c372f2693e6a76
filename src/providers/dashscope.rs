use async_trait::async_trait;
use log::debug;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{ChatMessage, ChatRequest, ChatResponse, Provider};
use crate::errors::ProviderError;

/// DashScope client for the Qwen text-generation API
#[derive(Debug)]
pub struct DashScope {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Generation endpoint
    url: Url,
    /// Model name, e.g. `qwen-max`
    model: String,
}

/// DashScope generation request
#[derive(Debug, Serialize)]
pub struct GenerationRequest {
    /// The model to use
    model: String,

    /// Conversation input
    input: GenerationInput,

    /// Generation parameters
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationInput {
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    /// `message` makes the API answer with chat-style choices
    result_format: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// DashScope generation response
#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    pub output: GenerationOutput,
    #[serde(default)]
    pub usage: Option<GenerationUsage>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerationOutput {
    #[serde(default)]
    pub choices: Vec<GenerationChoice>,
    /// Present when the request used `result_format = text`
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerationChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Deserialize)]
pub struct GenerationUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

/// Error body returned with non-success statuses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl GenerationRequest {
    fn from_chat(model: &str, request: &ChatRequest) -> Self {
        Self {
            model: model.to_string(),
            input: GenerationInput { messages: request.messages.clone() },
            parameters: GenerationParameters {
                result_format: "message".to_string(),
                temperature: request.temperature,
            },
        }
    }
}

impl GenerationResponse {
    /// Extract the generated text
    pub fn text(&self) -> Option<&str> {
        self.output.choices.first()
            .map(|c| c.message.content.as_str())
            .or(self.output.text.as_deref())
    }
}

impl DashScope {
    /// Create a new DashScope client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl AsRef<str>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let base = endpoint.as_ref().trim_end_matches('/').to_string() + "/";
        let url = Url::parse(&base)
            .and_then(|u| u.join("services/aigc/text-generation/generation"))
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid DashScope endpoint '{}': {}", base, e)))?;

        Ok(Self {
            client: super::http_client(timeout_secs),
            api_key: api_key.into(),
            url,
            model: model.into(),
        })
    }
}

#[async_trait]
impl Provider for DashScope {
    fn name(&self) -> &str {
        "dashscope"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let body = GenerationRequest::from_chat(&self.model, request);

        let response = self.client.post(self.url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let code = status.as_u16();
            let text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorBody>(&text) {
                Ok(body) => format!("{}: {}", body.code, body.message),
                Err(_) => text,
            };
            log::error!("DashScope API error ({}): {}", code, message);
            return Err(ProviderError::from_status(code, message));
        }

        let generation = response.json::<GenerationResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse DashScope response: {}", e)))?;

        let text = generation.text()
            .ok_or_else(|| ProviderError::ParseError("DashScope response contained no choices".to_string()))?
            .to_string();

        if let Some(id) = &generation.request_id {
            debug!("DashScope request {} completed", id);
        }

        Ok(ChatResponse {
            text,
            prompt_tokens: generation.usage.as_ref().map(|u| u.input_tokens),
            completion_tokens: generation.usage.as_ref().map(|u| u.output_tokens),
        })
    }
}
