//! Gemini-style generate-content backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::GenerativeError;
use crate::models::config::{AiConfig, GeminiConfig};

use super::{http_client, GenerativeBackend};

/// Backend for `POST {base}/models/{model}:{endpoint}?key=...`.
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    config: GeminiConfig,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(http_client: Client, config: GeminiConfig, api_key: &str) -> Self {
        Self {
            http_client,
            config,
            api_key: api_key.to_string(),
        }
    }

    /// Build from configuration. Fails when no API key is set.
    pub fn from_config(config: &AiConfig) -> Result<Self, GenerativeError> {
        let api_key = config
            .gemini
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GenerativeError::NotConfigured("gemini".to_string()))?;

        Ok(Self::new(http_client(config)?, config.gemini.clone(), api_key))
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            self.config.endpoint
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> Result<String, GenerativeError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        let response = self
            .http_client
            .post(self.endpoint_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerativeError::Api { status, body });
        }

        let generated: GenerateContentResponse = response.json().await?;
        generated
            .into_text()
            .filter(|text| !text.trim().is_empty())
            .ok_or(GenerativeError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        let config = GeminiConfig {
            base_url: "https://example.test/v1beta/".to_string(),
            ..GeminiConfig::default()
        };
        let backend = GeminiBackend::new(Client::new(), config, "k");
        assert_eq!(
            backend.endpoint_url(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_missing_key_is_not_configured() {
        assert!(matches!(
            GeminiBackend::from_config(&AiConfig::default()),
            Err(GenerativeError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: "olá" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.5,
                top_p: 0.5,
                top_k: 40,
                max_output_tokens: 2048,
            },
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "contents": [{"parts": [{"text": "olá"}]}],
                "generationConfig": {
                    "temperature": 0.5,
                    "topP": 0.5,
                    "topK": 40,
                    "maxOutputTokens": 2048
                }
            })
        );
    }

    #[test]
    fn test_response_text() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "{\"number\": \"1\"}"}], "role": "model"}}]}"#;
        let generated: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(generated.into_text().as_deref(), Some(r#"{"number": "1"}"#));

        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert_eq!(blocked.into_text(), None);
    }
}
