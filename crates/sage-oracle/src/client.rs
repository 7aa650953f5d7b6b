//! OpenAI-compatible chat-completions client.
//!
//! Non-streaming by design: the core only needs the final structured
//! signal, so the request is a single bounded-timeout POST. A configured
//! fallback endpoint is tried once when the primary transport fails,
//! mirroring a primary/fallback model setup.

use async_trait::async_trait;
use sage_core::error::OracleError;
use sage_core::traits::{RecommendationOracle, RecommendationRequest};
use sage_core::types::Signal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::parser::{parse_signal, strip_think_blocks};
use crate::prompt::PromptBuilder;

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that uses step-by-step reasoning to solve problems.";

/// Fallback endpoint, tried once when the primary transport fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackSettings {
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
}

/// Chat-completions client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    pub model: String,
    pub base_url: String,
    /// Environment variable holding the API key; empty key sends no auth
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub fallback: Option<FallbackSettings>,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            model: "deepseek-r1:14b".to_string(),
            base_url: "http://localhost:11434/v1".to_string(),
            api_key_env: "COINSAGE_ORACLE_API_KEY".to_string(),
            timeout_secs: 120,
            max_tokens: 4000,
            fallback: None,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

/// The reasoning oracle backed by a hosted chat model.
pub struct ChatOracle {
    settings: OracleSettings,
    http: reqwest::Client,
    prompt: PromptBuilder,
}

impl ChatOracle {
    pub fn new(
        symbol: &str,
        timeframe: &str,
        settings: OracleSettings,
    ) -> Result<Self, OracleError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| OracleError::Request(e.to_string()))?;

        Ok(Self {
            settings,
            http,
            prompt: PromptBuilder::new(symbol, timeframe),
        })
    }

    async fn complete(
        &self,
        base_url: &str,
        model: &str,
        api_key_env: &str,
        prompt: &str,
    ) -> Result<String, OracleError> {
        let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.settings.max_tokens,
            stream: false,
        };

        let mut request = self.http.post(&url).json(&body);
        if let Ok(api_key) = std::env::var(api_key_env) {
            if !api_key.is_empty() {
                request = request.bearer_auth(api_key);
            }
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                OracleError::Timeout(self.settings.timeout_secs)
            } else {
                OracleError::Request(e.to_string())
            }
        })?;
        let response = response
            .error_for_status()
            .map_err(|e| OracleError::Request(e.to_string()))?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Request(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(OracleError::EmptyResponse)
    }
}

#[async_trait]
impl RecommendationOracle for ChatOracle {
    async fn recommend(
        &self,
        request: &RecommendationRequest<'_>,
    ) -> Result<Signal, OracleError> {
        let prompt = self.prompt.build(request);
        debug!(chars = prompt.len(), "sending analysis prompt");

        let primary = self
            .complete(
                &self.settings.base_url,
                &self.settings.model,
                &self.settings.api_key_env,
                &prompt,
            )
            .await;

        let text = match (primary, &self.settings.fallback) {
            (Ok(text), _) => text,
            (Err(e), Some(fallback)) => {
                warn!(error = %e, "primary model unavailable, trying fallback");
                self.complete(
                    &fallback.base_url,
                    &fallback.model,
                    &fallback.api_key_env,
                    &prompt,
                )
                .await?
            }
            (Err(e), None) => return Err(e),
        };

        let cleaned = strip_think_blocks(&text);
        if cleaned.is_empty() {
            return Err(OracleError::EmptyResponse);
        }

        parse_signal(&cleaned).map_err(OracleError::Malformed)
    }

    fn name(&self) -> &str {
        &self.settings.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = OracleSettings::default();
        assert_eq!(settings.timeout_secs, 120);
        assert!(settings.fallback.is_none());
    }

    #[test]
    fn test_chat_request_wire_shape() {
        let body = ChatRequest {
            model: "test-model",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
            max_tokens: 100,
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "test-model");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_chat_response_parses_without_content() {
        let json = r#"{"choices":[{"message":{"role":"assistant"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content, "");
    }
}
