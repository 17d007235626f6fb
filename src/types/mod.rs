//! Core data types shared across the scan pipeline.

pub mod error;
pub mod repo;
pub mod scan;
pub mod target;

pub use error::{DriftError, ErrorCategory, ErrorClassifier, LlmError, Result};
pub use repo::{CandidateFile, DEFAULT_REF, FetchedFile, FileAtRef, RepoFile, RepoRef};
pub use scan::{
    ApiRoute, DigestEnvVar, DigestModel, DigestModule, DigestRoute, GenerationMetadata,
    GenerationStrategy, PackageManager, PackageManifest, ProposalFile, ProposalOperation,
    RepoDigest, RepoFacts, RepoSummary, ScanResult, TargetOutcome, TopLevelEntry,
};
pub use target::{DocKind, DocTarget, RawDocTarget, RawPaths, normalize_targets};
