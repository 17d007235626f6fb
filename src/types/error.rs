//! Unified Error Type System
//!
//! Centralized error types for the scan engine.
//! Classifies LLM failures so the pipeline can decide between a single
//! reduced-budget retry and silent degradation.
//!
//! ## Error Categories
//!
//! - **RateLimit**: API rate limiting (request-size limits get one smaller retry)
//! - **TokenLimit**: Context too large
//! - **Auth**: Authentication failures
//! - **Network**: Connectivity issues
//! - **Unavailable**: Provider or resource unavailable
//!
//! Hosting API failures are never classified for retry: they abort the scan.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories used for retry and degradation decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited
    RateLimit,
    /// Context/token limit exceeded
    TokenLimit,
    /// Authentication failed
    Auth,
    /// Network/connectivity issues
    Network,
    /// Provider unavailable
    Unavailable,
    /// Invalid request
    BadRequest,
    /// Parsing LLM response failed
    ParseError,
    /// Temporary server issues
    Transient,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::TokenLimit => write!(f, "TOKEN_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// LLM error with category, context, and retry hints
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category for routing decisions
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }

    /// Rate limit caused by the size of the request rather than request frequency.
    ///
    /// Providers report this as a 429 whose body mentions the request size or the
    /// per-minute token allowance.
    pub fn is_request_too_large(&self) -> bool {
        if self.category != ErrorCategory::RateLimit {
            return false;
        }
        let lower = self.message.to_lowercase();
        lower.contains("request too large")
            || lower.contains("tokens per min")
            || lower.contains("reduce the length")
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Error classifier for LLM responses
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error message from any provider
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();

        if lower.contains("rate limit")
            || lower.contains("429")
            || lower.contains("too many requests")
            || lower.contains("quota exceeded")
        {
            return LlmError::with_provider(ErrorCategory::RateLimit, message, provider);
        }

        if lower.contains("token")
            && (lower.contains("limit") || lower.contains("exceed") || lower.contains("maximum"))
            || lower.contains("context length")
            || lower.contains("context too long")
        {
            return LlmError::with_provider(ErrorCategory::TokenLimit, message, provider);
        }

        if lower.contains("401")
            || lower.contains("403")
            || lower.contains("api key")
            || lower.contains("unauthorized")
        {
            return LlmError::with_provider(ErrorCategory::Auth, message, provider);
        }

        if lower.contains("connection")
            || lower.contains("dns")
            || lower.contains("timeout")
            || lower.contains("timed out")
        {
            return LlmError::with_provider(ErrorCategory::Network, message, provider);
        }

        if lower.contains("parse") || lower.contains("json") {
            return LlmError::with_provider(ErrorCategory::ParseError, message, provider);
        }

        LlmError::with_provider(ErrorCategory::Unknown, message, provider)
    }

    /// Classify HTTP status code directly (more accurate than string matching)
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        match status {
            429 => LlmError::with_provider(ErrorCategory::RateLimit, message, provider),
            401 | 403 => LlmError::with_provider(ErrorCategory::Auth, message, provider),
            400 | 422 => LlmError::with_provider(ErrorCategory::BadRequest, message, provider),
            413 => LlmError::with_provider(ErrorCategory::TokenLimit, message, provider),
            500 | 502 | 503 | 504 => {
                LlmError::with_provider(ErrorCategory::Transient, message, provider)
            }
            404 => LlmError::with_provider(ErrorCategory::Unavailable, message, provider),
            _ => LlmError::with_provider(ErrorCategory::Unknown, message, provider),
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum DriftError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Hosting API Errors (fatal for a scan)
    // -------------------------------------------------------------------------
    /// Non-success response from the hosting API
    #[error("Hosting API error ({status}) for {resource}: {message}")]
    Host {
        status: u16,
        resource: String,
        message: String,
    },

    /// Transport failure talking to the hosting API
    #[error("Hosting API request failed: {0}")]
    HostTransport(String),

    /// Response from the hosting API could not be decoded
    #[error("Invalid hosting API payload for {resource}: {message}")]
    HostPayload { resource: String, message: String },

    // -------------------------------------------------------------------------
    // LLM Errors (always recovered by the pipeline)
    // -------------------------------------------------------------------------
    #[error("LLM error: {0}")]
    Llm(LlmError),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },
}

impl From<LlmError> for DriftError {
    fn from(err: LlmError) -> Self {
        DriftError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, DriftError>;

impl DriftError {
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create an LLM error from message with an inferred category
    pub fn llm(message: impl Into<String>, provider: &str) -> Self {
        Self::Llm(ErrorClassifier::classify(&message.into(), provider))
    }

    /// Whether this error came from the hosting API
    pub fn is_host_error(&self) -> bool {
        matches!(
            self,
            Self::Host { .. } | Self::HostTransport(_) | Self::HostPayload { .. }
        )
    }

    /// Whether a retry with a smaller request is worth attempting
    pub fn is_request_too_large(&self) -> bool {
        match self {
            Self::Llm(e) => e.is_request_too_large(),
            _ => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::TokenLimit.to_string(), "TOKEN_LIMIT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
    }

    #[test]
    fn test_classify_rate_limit() {
        let err = ErrorClassifier::classify("Rate limit exceeded, please retry", "openai");
        assert_eq!(err.category, ErrorCategory::RateLimit);
        assert!(!err.is_request_too_large());
    }

    #[test]
    fn test_request_too_large_detection() {
        let err = ErrorClassifier::classify_http_status(
            429,
            "Request too large for gpt-4o on tokens per min (TPM): Limit 30000, Requested 41234",
            "openai",
        );
        assert_eq!(err.category, ErrorCategory::RateLimit);
        assert!(err.is_request_too_large());
        assert!(DriftError::Llm(err).is_request_too_large());
    }

    #[test]
    fn test_size_message_without_rate_limit_is_not_retryable() {
        let err = ErrorClassifier::classify_http_status(400, "Request too large", "openai");
        assert!(!err.is_request_too_large());
    }

    #[test]
    fn test_frequency_limit_mentioning_max_tokens_is_not_size() {
        let err = ErrorClassifier::classify_http_status(
            429,
            "Rate limit reached for requests per min; max_tokens 4096 is too large a share",
            "openai",
        );
        assert!(!err.is_request_too_large());
        assert!(!DriftError::Llm(err).is_request_too_large());
    }

    #[test]
    fn test_classify_auth() {
        let err = ErrorClassifier::classify("Invalid API key provided", "openai");
        assert_eq!(err.category, ErrorCategory::Auth);
    }

    #[test]
    fn test_classify_http_status() {
        assert_eq!(
            ErrorClassifier::classify_http_status(401, "Unauthorized", "t").category,
            ErrorCategory::Auth
        );
        assert_eq!(
            ErrorClassifier::classify_http_status(503, "down", "t").category,
            ErrorCategory::Transient
        );
        assert_eq!(
            ErrorClassifier::classify_http_status(418, "teapot", "t").category,
            ErrorCategory::Unknown
        );
    }

    #[test]
    fn test_host_error_flags() {
        let err = DriftError::Host {
            status: 404,
            resource: "octo/repo@main".to_string(),
            message: "Not Found".to_string(),
        };
        assert!(err.is_host_error());
        assert!(!err.is_request_too_large());
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::with_provider(ErrorCategory::RateLimit, "Too many requests", "openai");
        assert_eq!(err.to_string(), "[openai:RATE_LIMIT] Too many requests");

        let err_no_provider = LlmError::new(ErrorCategory::Network, "Connection failed");
        assert_eq!(err_no_provider.to_string(), "[NETWORK] Connection failed");
    }
}
