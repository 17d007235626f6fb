//! OpenAI API Provider
//!
//! LLM provider using OpenAI's Chat Completions API (or any compatible endpoint).
//! Failed responses are classified by HTTP status so the digest generator can
//! recognise request-size rate limits.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{CompletionRequest, LlmProvider, LlmResponse, TokenUsage};
use crate::config::LlmConfig;
use crate::types::{DriftError, ErrorClassifier, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const PROVIDER_NAME: &str = "openai";

/// OpenAI API Provider with secure API key handling
pub struct OpenAiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(config: &LlmConfig, api_key: SecretString) -> Result<Self> {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DriftError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            api_base,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        let system_content = match &request.schema {
            None => request.system.clone(),
            Some(schema) => {
                let schema_str = match serde_json::to_string_pretty(schema) {
                    Ok(s) => s,
                    Err(e) => {
                        warn!("Failed to pretty-print schema, using compact format: {}", e);
                        serde_json::to_string(schema).unwrap_or_else(|_| "{}".to_string())
                    }
                };
                format!(
                    "{}\n\nRespond ONLY with valid JSON matching this schema:\n\n```json\n{}\n```",
                    request.system, schema_str
                )
            }
        };

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_content,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user.clone(),
                },
            ],
            temperature: self.temperature,
            max_tokens: Some(request.max_tokens.unwrap_or(self.max_tokens)),
            response_format: request.schema.as_ref().map(|_| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<LlmResponse> {
        let start_time = Instant::now();
        let body = self.build_request(&request);
        let url = format!("{}/chat/completions", self.api_base);

        debug!(
            "Sending request to OpenAI (model: {}, max_tokens: {:?})",
            self.model, body.max_tokens
        );

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                DriftError::Llm(ErrorClassifier::classify(
                    &format!("OpenAI request failed: {}", e),
                    PROVIDER_NAME,
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(DriftError::Llm(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &message,
                PROVIDER_NAME,
            )));
        }

        let response_body: ChatCompletionResponse = response.json().await.map_err(|e| {
            DriftError::llm(format!("Failed to parse OpenAI response: {}", e), PROVIDER_NAME)
        })?;

        let usage = response_body
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        let content = response_body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DriftError::llm("No content in OpenAI response", PROVIDER_NAME))?;

        debug!("OpenAI responded in {:?}", start_time.elapsed());

        Ok(LlmResponse {
            content,
            usage,
            model: self.model.clone(),
        })
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
