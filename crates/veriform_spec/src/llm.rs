//! LLM-backed specification extractor.
//!
//! Supports OpenAI and Anthropic APIs, selected via environment variables.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SpecError, SpecResult};
use crate::extractor::SpecExtractor;
use crate::models::InfrastructureSpec;

/// LLM provider type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAI,
    Anthropic,
}

/// System prompt constraining the model to the extraction schema.
///
/// The rules mirror what an exact extraction requires: only components the
/// user explicitly asked for, zero for everything unmentioned.
const SYSTEM_INSTRUCTIONS: &str = "\
You are an expert cloud architect. Analyse the user's request and respond \
with ONLY a JSON object, no prose and no code fences.\n\
Schema: {\"provider\": \"aws|azure|gcp|openstack\", \"servers\": int, \
\"databases\": int, \"networks\": int, \"load_balancers\": int, \
\"security_groups\": int, \"requests\": {\"public_database\": bool, \
\"unencrypted_storage\": bool, \"open_ssh\": bool}}\n\
For a multi-cloud request respond with {\"providers\": [ ... ]} instead.\n\
Strict rules:\n\
- If the user does NOT mention a database, set databases to 0.\n\
- If the user does NOT mention a load balancer, set load_balancers to 0.\n\
- Never add components that were not requested.\n\
- Set a flag in \"requests\" only when the user explicitly asks for that \
risky configuration (public database, unencrypted data, SSH open to all).";

/// Extractor backed by a chat-completions API.
pub struct LlmExtractor {
    provider: LlmProvider,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl LlmExtractor {
    /// Create a new extractor with explicit configuration.
    pub fn new(provider: LlmProvider, api_key: String, model: Option<String>) -> Self {
        let default_model = match provider {
            LlmProvider::OpenAI => "gpt-5-mini".to_string(),
            LlmProvider::Anthropic => "claude-sonnet-4.5".to_string(),
        };

        Self {
            provider,
            api_key,
            model: model.unwrap_or(default_model),
            client: reqwest::Client::new(),
        }
    }

    /// Create an extractor from environment variables.
    ///
    /// Checks in order:
    /// 1. OPENAI_API_KEY
    /// 2. ANTHROPIC_API_KEY
    pub fn from_env() -> SpecResult<Self> {
        let custom_model = std::env::var("VERIFORM_LLM_MODEL").ok();

        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            if !api_key.is_empty() {
                return Ok(Self::new(LlmProvider::OpenAI, api_key, custom_model));
            }
        }

        if let Ok(api_key) = std::env::var("ANTHROPIC_API_KEY") {
            if !api_key.is_empty() {
                return Ok(Self::new(LlmProvider::Anthropic, api_key, custom_model));
            }
        }

        Err(SpecError::NotConfigured(
            "set OPENAI_API_KEY or ANTHROPIC_API_KEY".to_string(),
        ))
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete_openai(&self, description: &str) -> SpecResult<String> {
        let url = "https://api.openai.com/v1/chat/completions";

        let request = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: SYSTEM_INSTRUCTIONS.to_string(),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: description.to_string(),
                },
            ],
            max_completion_tokens: Some(1024),
        };

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| SpecError::Llm(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpecError::Llm(format!("OpenAI API error {}: {}", status, body)));
        }

        let result: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| SpecError::Llm(format!("Failed to parse response: {}", e)))?;

        result
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| SpecError::Llm("No response from OpenAI".to_string()))
    }

    async fn complete_anthropic(&self, description: &str) -> SpecResult<String> {
        let url = "https://api.anthropic.com/v1/messages";

        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            system: Some(SYSTEM_INSTRUCTIONS.to_string()),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: description.to_string(),
            }],
        };

        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| SpecError::Llm(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpecError::Llm(format!(
                "Anthropic API error {}: {}",
                status, body
            )));
        }

        let result: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| SpecError::Llm(format!("Failed to parse response: {}", e)))?;

        result
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| SpecError::Llm("No response from Anthropic".to_string()))
    }

    /// Strip markdown code fences models sometimes wrap JSON in.
    fn strip_fences(content: &str) -> &str {
        let trimmed = content.trim();
        let without_open = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .unwrap_or(trimmed);
        without_open.strip_suffix("```").unwrap_or(without_open).trim()
    }
}

#[async_trait]
impl SpecExtractor for LlmExtractor {
    async fn extract(&self, description: &str) -> SpecResult<InfrastructureSpec> {
        debug!("Extracting specification via {:?} ({})", self.provider, self.model);

        let content = match self.provider {
            LlmProvider::OpenAI => self.complete_openai(description).await?,
            LlmProvider::Anthropic => self.complete_anthropic(description).await?,
        };

        InfrastructureSpec::from_extractor_json(Self::strip_fences(&content))
    }
}

// OpenAI API types
#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: String,
}

// Anthropic API types
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences() {
        assert_eq!(
            LlmExtractor::strip_fences("```json\n{\"provider\": \"aws\"}\n```"),
            "{\"provider\": \"aws\"}"
        );
        assert_eq!(
            LlmExtractor::strip_fences("{\"provider\": \"aws\"}"),
            "{\"provider\": \"aws\"}"
        );
    }

    #[test]
    fn test_default_models() {
        let extractor = LlmExtractor::new(LlmProvider::Anthropic, "key".to_string(), None);
        assert_eq!(extractor.model(), "claude-sonnet-4.5");

        let custom = LlmExtractor::new(
            LlmProvider::OpenAI,
            "key".to_string(),
            Some("gpt-custom".to_string()),
        );
        assert_eq!(custom.model(), "gpt-custom");
    }
}
