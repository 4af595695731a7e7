//! Configuration structures for the extraction engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the fiscal engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rule-based extraction configuration.
    pub extraction: ExtractionConfig,

    /// Generative backend configuration.
    pub ai: AiConfig,

    /// Pattern rule configuration.
    pub rules: RulesConfig,
}

/// Rule-based extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Shorter texts are sent back for OCR instead of being extracted.
    pub min_text_length: usize,

    /// Drop issuer ids that fail the CPF/CNPJ checksum.
    pub discard_invalid_issuer_id: bool,

    /// Region used when a document does not carry one.
    pub default_region: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_text_length: 20,
            discard_invalid_issuer_id: true,
            default_region: crate::expense::ruleset::DEFAULT_REGION.to_string(),
        }
    }
}

/// Generative provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// OpenAI-style chat completions.
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    /// Gemini-style generate-content.
    Gemini,
    /// Canned responses, for tests and offline runs.
    Mock,
}

impl std::fmt::Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AiProvider::OpenAi => "openai",
            AiProvider::Gemini => "gemini",
            AiProvider::Mock => "mock",
        })
    }
}

impl std::str::FromStr for AiProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "open_ai" => Ok(AiProvider::OpenAi),
            "gemini" => Ok(AiProvider::Gemini),
            "mock" => Ok(AiProvider::Mock),
            other => Err(format!("unknown AI provider: {other}")),
        }
    }
}

/// Generative backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Provider used when a tenant policy does not name one.
    pub provider: AiProvider,

    /// OpenAI-style endpoint.
    pub openai: OpenAiConfig,

    /// Gemini-style endpoint.
    pub gemini: GeminiConfig,

    /// TCP connect timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Whole-response timeout in milliseconds.
    pub response_timeout_ms: u64,

    /// Document text is truncated to this many characters before prompting.
    pub max_input_chars: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            openai: OpenAiConfig::default(),
            gemini: GeminiConfig::default(),
            connect_timeout_ms: 3_000,
            response_timeout_ms: 5_000,
            max_input_chars: 65_500,
        }
    }
}

/// OpenAI-style chat completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Full chat completions URL.
    pub url: String,

    pub model: String,

    /// Bearer key. Overridden by `OPENAI_API_KEY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
        }
    }
}

/// Gemini-style generate-content endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL, without the model path.
    pub base_url: String,

    pub model: String,

    /// Endpoint verb appended to the model path.
    pub endpoint: String,

    /// Query-string key. Overridden by `GEMINI_API_KEY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            endpoint: "generateContent".to_string(),
            api_key: None,
            temperature: 0.2,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

/// Pattern rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// JSON rule file layered over the built-in DEFAULT rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl EngineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Apply API keys from `OPENAI_API_KEY` and `GEMINI_API_KEY`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                self.ai.openai.api_key = Some(key);
            }
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                self.ai.gemini.api_key = Some(key);
            }
        }
        self
    }
}
