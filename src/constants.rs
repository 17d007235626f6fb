//! Global Constants
//!
//! Centralized constants for budgets and tuning.
//! Configuration defaults are taken from here; nothing else should hard-code them.

/// Read budgets for the candidate selector and content fetcher
pub mod budget {
    /// Maximum number of files whose content is fetched
    pub const MAX_FILES: usize = 60;

    /// Files larger than this are never read (bytes)
    pub const MAX_FILE_BYTES: u64 = 120_000;

    /// Total characters fetched across the read set
    pub const MAX_TOTAL_CHARS: usize = 200_000;

    /// Existing document content passed to the model (characters)
    pub const EXISTING_DOC_MAX_CHARS: usize = 20_000;
}

/// Digest generator limits
pub mod digest {
    /// Per-file excerpt cap (characters)
    pub const EXCERPT_CHARS: usize = 6_000;

    /// Total excerpt budget across all files (characters)
    pub const TOTAL_EXCERPT_CHARS: usize = 60_000;

    /// Output token cap for the digest request
    pub const MAX_OUTPUT_TOKENS: usize = 2_000;

    /// Output token cap for the single retry after a size rate limit
    pub const RETRY_OUTPUT_TOKENS: usize = 1_000;
}

/// Document generator limits
pub mod generation {
    /// Output token cap for a document rewrite
    pub const MAX_OUTPUT_TOKENS: usize = 4_000;

    /// Label reported when no model produced any content
    pub const BUILTIN_MODEL_LABEL: &str = "Built-in generator";
}

/// Candidate selector score weights
pub mod score {
    pub const PACKAGE_MANIFEST: i64 = 1_000;
    pub const README: i64 = 900;
    pub const FRAMEWORK_FILE: i64 = 400;
    pub const API_ROUTE: i64 = 300;
    pub const SOURCE_DIR: i64 = 50;
    pub const DOC_EXTENSION: i64 = 20;
}

/// Documentation target defaults
pub mod targets {
    /// (directory, filename) fallbacks per target kind
    pub mod fallback {
        pub const README: (&str, &str) = ("", "README.md");
        pub const API_REFERENCE: (&str, &str) = ("docs/api", "README.md");
        pub const ARCHITECTURE: (&str, &str) = ("docs/architecture", "README.md");
        pub const TUTORIAL: (&str, &str) = ("docs/tutorials", "getting-started.md");
        pub const GUIDE: (&str, &str) = ("docs/guides", "README.md");
        pub const OTHER: (&str, &str) = ("docs", "README.md");
    }
}

/// Progress reporting
pub mod progress {
    /// Minimum interval between forwarded progress events (milliseconds)
    pub const MIN_INTERVAL_MS: u64 = 400;

    /// Percent ranges per phase
    pub const LISTING: u8 = 5;
    pub const SELECTING: u8 = 8;
    pub const READ_FILES: (u8, u8) = (10, 40);
    pub const SUMMARIZING: u8 = 42;
    pub const DIGEST: (u8, u8) = (45, 55);
    pub const GENERATING: (u8, u8) = (55, 90);
    pub const DIFFING: u8 = 92;
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// User agent sent to the hosting API
    pub const USER_AGENT: &str = concat!("docdrift/", env!("CARGO_PKG_VERSION"));
}
