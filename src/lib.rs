//! docdrift - Documentation Drift Scanner
//!
//! Reads a hosted repository at a ref, builds a bounded picture of it, and proposes
//! create/update changes for the configured documentation targets.
//!
//! ## Pipeline
//!
//! - **Listing & selection**: rank every file, keep a capped read set
//! - **Budgeted fetch**: decode blobs under a global character budget
//! - **Summary & facts**: layout counts, routes, manifest, env vars
//! - **Digest**: optional structured LLM summary (degrades silently)
//! - **Generation**: LLM rewrite or deterministic templates per target
//! - **Proposals**: unified diffs, no-op changes suppressed
//!
//! ## Quick Start
//!
//! ```ignore
//! use docdrift::{ConfigLoader, RepoRef, Scanner};
//!
//! let config = ConfigLoader::load()?;
//! let scanner = Scanner::from_config(&config)?;
//! let repo: RepoRef = "octo/widgets@main".parse()?;
//! let result = scanner.scan_project(&repo, &config.project, None).await?;
//! for proposal in &result.proposals {
//!     println!("{}", proposal.diff);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`host`]: Git hosting abstraction (GitHub, in-memory)
//! - [`ai`]: LLM provider abstraction, prompts, response repair
//! - [`scan`]: Selection, fetching, summaries, progress and the [`Scanner`]
//! - [`generate`]: Digest, document generation, diffs
//! - [`config`]: Layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod generate;
pub mod host;
pub mod scan;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, HostConfig, LlmConfig, ProjectSettings, ScanConfig};

// Error Types
pub use types::error::{DriftError, ErrorCategory, LlmError, Result};

// Data Model
pub use types::{
    DocKind, DocTarget, FileAtRef, ProposalFile, ProposalOperation, RawDocTarget, RepoDigest,
    RepoFile, RepoRef, RepoSummary, ScanResult,
};

// =============================================================================
// Engine Re-exports
// =============================================================================

pub use host::{GitHubHost, InMemoryHost, RepoHost, SharedHost};
pub use scan::{ProgressEvent, ProgressSink, ScanPhase, Scanner};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{LlmProvider, LlmResponse, OpenAiProvider, SharedProvider, with_timeout};
