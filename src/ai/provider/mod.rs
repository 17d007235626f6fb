//! LLM Provider Abstraction
//!
//! Defines the `LlmProvider` trait used by the digest and document generators.
//! Structured requests return parsed JSON; text requests return the raw completion.

mod openai;

pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::ai::validation::extract_json_from_response;
use crate::types::Result;

// =============================================================================
// Requests and Responses
// =============================================================================

/// One chat-style completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    /// User message, normally a serialized JSON payload
    pub user: String,
    /// Output token cap; provider default when `None`
    pub max_tokens: Option<usize>,
    /// Ask for a JSON object matching this schema
    pub schema: Option<Value>,
}

/// LLM completion with usage metrics
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub usage: TokenUsage,
    pub model: String,
}

/// Token usage metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Shared LLM provider type
pub type SharedProvider = Arc<dyn LlmProvider>;

// =============================================================================
// LLM Provider Trait
// =============================================================================

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one completion
    async fn complete(&self, request: CompletionRequest) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model identifier in use
    fn model(&self) -> &str;

    /// Completion that must parse as JSON
    async fn complete_structured(
        &self,
        system: &str,
        payload: &Value,
        schema: &Value,
        max_tokens: Option<usize>,
    ) -> Result<Value> {
        let response = self
            .complete(CompletionRequest {
                system: system.to_string(),
                user: serde_json::to_string(payload)?,
                max_tokens,
                schema: Some(schema.clone()),
            })
            .await?;
        log_usage(self.name(), &response);
        extract_json_from_response(&response.content)
    }

    /// Free-text completion
    async fn complete_text(
        &self,
        system: &str,
        payload: &Value,
        max_tokens: Option<usize>,
    ) -> Result<String> {
        let response = self
            .complete(CompletionRequest {
                system: system.to_string(),
                user: serde_json::to_string(payload)?,
                max_tokens,
                schema: None,
            })
            .await?;
        log_usage(self.name(), &response);
        Ok(response.content)
    }
}

fn log_usage(provider: &str, response: &LlmResponse) {
    info!(
        "{} completion ({}): {} tokens in, {} out",
        provider, response.model, response.usage.input_tokens, response.usage.output_tokens
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DriftError;

    struct EchoProvider {
        reply: String,
    }

    #[async_trait]
    impl LlmProvider for EchoProvider {
        async fn complete(&self, request: CompletionRequest) -> Result<LlmResponse> {
            if request.user.is_empty() {
                return Err(DriftError::llm("empty payload", "echo"));
            }
            Ok(LlmResponse {
                content: self.reply.clone(),
                usage: TokenUsage {
                    input_tokens: 3,
                    output_tokens: 4,
                },
                model: "echo-1".to_string(),
            })
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-1"
        }
    }

    #[tokio::test]
    async fn test_structured_completion_parses_fenced_json() {
        let provider = EchoProvider {
            reply: "```json\n{\"repoPurpose\": \"demo\"}\n```".to_string(),
        };
        let value = provider
            .complete_structured("sys", &serde_json::json!({"a": 1}), &serde_json::json!({}), None)
            .await
            .unwrap();
        assert_eq!(value["repoPurpose"], "demo");
    }

    #[tokio::test]
    async fn test_structured_completion_rejects_prose() {
        let provider = EchoProvider {
            reply: "I cannot help with that.".to_string(),
        };
        let result = provider
            .complete_structured("sys", &serde_json::json!({}), &serde_json::json!({}), None)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_text_completion() {
        let provider = EchoProvider {
            reply: "# Title".to_string(),
        };
        let text = provider
            .complete_text("sys", &serde_json::json!({"x": true}), Some(10))
            .await
            .unwrap();
        assert_eq!(text, "# Title");
        assert_eq!(TokenUsage { input_tokens: 3, output_tokens: 4 }.total(), 7);
    }
}
