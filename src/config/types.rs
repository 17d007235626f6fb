//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Secrets are never serialized and are redacted from `Debug` output.

use serde::{Deserialize, Serialize};

use crate::constants::{budget, digest, network, progress};
use crate::types::{DocTarget, DriftError, RawDocTarget, Result, normalize_targets};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Git hosting API settings
    pub host: HostConfig,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Scan budgets and pacing
    pub scan: ScanConfig,

    /// Documentation targets and generation constraints
    pub project: ProjectSettings,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(DriftError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 || self.host.timeout_secs == 0 {
            return Err(DriftError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.max_tokens == 0 {
            return Err(DriftError::Config(
                "LLM max_tokens must be greater than 0".to_string(),
            ));
        }

        let scan = &self.scan;
        for (name, value) in [
            ("max_files", scan.max_files),
            ("max_file_bytes", scan.max_file_bytes as usize),
            ("max_total_chars", scan.max_total_chars),
            ("excerpt_chars", scan.excerpt_chars),
            ("total_excerpt_chars", scan.total_excerpt_chars),
        ] {
            if value == 0 {
                return Err(DriftError::Config(format!(
                    "scan.{} must be greater than 0",
                    name
                )));
            }
        }

        if scan.timeout_secs == Some(0) {
            return Err(DriftError::Config(
                "scan.timeout_secs must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Host Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// REST API base URL (GitHub Enterprise uses `https://host/api/v3`)
    pub api_base: String,

    /// Access token; falls back to `GITHUB_TOKEN`
    #[serde(skip_serializing)]
    pub token: Option<String>,

    pub timeout_secs: u64,

    pub user_agent: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            token: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            user_agent: network::USER_AGENT.to_string(),
        }
    }
}

impl std::fmt::Debug for HostConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostConfig")
            .field("api_base", &self.api_base)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name; only "openai" (and compatible endpoints) is supported
    pub provider: String,

    /// Model identifier, also reported as the scan's model label
    pub model: String,

    /// API key; falls back to `OPENAI_API_KEY`. Without one, no LLM is used.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Custom API base URL for compatible endpoints
    pub api_base: Option<String>,

    pub timeout_secs: u64,

    pub temperature: f32,

    /// Default output token cap for document generation
    pub max_tokens: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            api_base: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.2,
            max_tokens: crate::constants::generation::MAX_OUTPUT_TOKENS,
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

// =============================================================================
// Scan Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum files in the read set
    pub max_files: usize,

    /// Files larger than this (bytes, as listed) are never read
    pub max_file_bytes: u64,

    /// Character budget across the whole read set
    pub max_total_chars: usize,

    /// Existing document content passed to the LLM (chars)
    pub existing_doc_max_chars: usize,

    /// Per-file digest excerpt cap (chars)
    pub excerpt_chars: usize,

    /// Total digest excerpt budget (chars)
    pub total_excerpt_chars: usize,

    /// Minimum spacing between forwarded progress events
    pub progress_interval_ms: u64,

    /// Overall deadline for one scan; unlimited when unset
    pub timeout_secs: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_files: budget::MAX_FILES,
            max_file_bytes: budget::MAX_FILE_BYTES,
            max_total_chars: budget::MAX_TOTAL_CHARS,
            existing_doc_max_chars: budget::EXISTING_DOC_MAX_CHARS,
            excerpt_chars: digest::EXCERPT_CHARS,
            total_excerpt_chars: digest::TOTAL_EXCERPT_CHARS,
            progress_interval_ms: progress::MIN_INTERVAL_MS,
            timeout_secs: None,
        }
    }
}

// =============================================================================
// Project Settings
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Documentation targets as configured
    pub targets: Vec<RawDocTarget>,

    /// Free-text instructions passed to the generator
    pub constraints: Option<String>,
}

impl ProjectSettings {
    /// Canonical targets, in configuration order
    pub fn doc_targets(&self) -> Result<Vec<DocTarget>> {
        normalize_targets(self.targets.clone())
    }
}
