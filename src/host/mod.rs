//! Git Hosting Abstraction
//!
//! The scan engine only needs three operations from a hosting service: a recursive
//! tree listing, raw blob bytes by handle, and single-file contents at a ref.
//!
//! ## Modules
//!
//! - `github`: GitHub REST v3 client
//! - `memory`: in-memory repository for fixtures and offline runs

mod github;
mod memory;

pub use github::GitHubHost;
pub use memory::InMemoryHost;

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::{FileAtRef, RepoFile, RepoRef, Result};

/// Hosting API consumed by the scan engine.
///
/// Errors are propagated unchanged; the engine never retries hosting calls.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Every blob in the tree at `repo.git_ref`, in listing order
    async fn list_tree(&self, repo: &RepoRef) -> Result<Vec<RepoFile>>;

    /// Raw bytes of a blob
    async fn get_blob(&self, repo: &RepoRef, handle: &str) -> Result<Vec<u8>>;

    /// Contents of `path` at `repo.git_ref`; a missing file is not an error
    async fn get_file_at_ref(&self, repo: &RepoRef, path: &str) -> Result<FileAtRef>;

    /// Host name for logging
    fn name(&self) -> &str;
}

/// Shared hosting client
pub type SharedHost = Arc<dyn RepoHost>;
