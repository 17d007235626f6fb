//! AI Integration Layer
//!
//! Optional LLM access for the digest and document generators. A missing API
//! key is not an error: scans fall back to template generation.

pub mod prompt;
pub mod provider;
pub mod timeout;
pub mod validation;

pub use prompt::{PromptBuilder, PromptTemplates, README_SECTIONS};
pub use provider::{
    CompletionRequest, LlmProvider, LlmResponse, OpenAiProvider, SharedProvider, TokenUsage,
};
pub use timeout::{with_optional_timeout, with_timeout};
pub use validation::{JsonRepairer, extract_json_from_response, strip_code_fences};

use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::LlmConfig;
use crate::types::{DriftError, Result};

/// Build the configured provider, or `None` when no API key is available
pub fn create_provider(config: &LlmConfig) -> Result<Option<SharedProvider>> {
    let Some(api_key) = config
        .api_key
        .clone()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .filter(|key| !key.trim().is_empty())
    else {
        debug!("No LLM API key configured; using built-in generator");
        return Ok(None);
    };

    match config.provider.as_str() {
        "openai" => {
            let provider = OpenAiProvider::new(config, SecretString::from(api_key))?;
            info!("Using LLM provider openai ({})", config.model);
            Ok(Some(Arc::new(provider)))
        }
        other => Err(DriftError::Config(format!(
            "Unknown LLM provider '{}'. Supported: openai",
            other
        ))),
    }
}
