//! OpenAI-style chat completions backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GenerativeError;
use crate::models::config::AiConfig;

use super::{http_client, GenerativeBackend};

/// Backend for any server implementing `POST /v1/chat/completions`.
#[derive(Clone)]
pub struct OpenAiBackend {
    http_client: Client,
    url: String,
    model: String,
    api_key: String,
}

impl OpenAiBackend {
    pub fn new(http_client: Client, url: &str, model: &str, api_key: &str) -> Self {
        Self {
            http_client,
            url: url.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Build from configuration. Fails when no API key is set.
    pub fn from_config(config: &AiConfig) -> Result<Self, GenerativeError> {
        let api_key = config
            .openai
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GenerativeError::NotConfigured("openai".to_string()))?;

        Ok(Self::new(
            http_client(config)?,
            &config.openai.url,
            &config.openai.model,
            api_key,
        ))
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

#[async_trait]
impl GenerativeBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String, GenerativeError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http_client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerativeError::Api { status, body });
        }

        let completion: ChatCompletionResponse = response.json().await?;

        if let Some(usage) = &completion.usage {
            debug!(
                "OpenAI tokens used - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerativeError::EmptyResponse)
    }
}
