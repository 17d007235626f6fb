//! Repository references and file records produced during a scan.

use serde::{Deserialize, Serialize};

use super::error::{DriftError, Result};

/// Default ref used when none is given
pub const DEFAULT_REF: &str = "HEAD";

/// A repository at a specific ref on the hosting service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, git_ref: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            git_ref: git_ref.into(),
        }
    }

    /// `owner/repo`
    pub fn repo_id(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.git_ref)
    }
}

impl std::str::FromStr for RepoRef {
    type Err = DriftError;

    /// Parse `owner/repo` or `owner/repo@ref`
    fn from_str(s: &str) -> Result<Self> {
        let (slug, git_ref) = match s.split_once('@') {
            Some((slug, r)) if !r.trim().is_empty() => (slug, r.trim()),
            Some(_) => {
                return Err(DriftError::InvalidInput(format!(
                    "Empty ref in repository reference '{}'",
                    s
                )));
            }
            None => (s, DEFAULT_REF),
        };

        let mut parts = slug.trim().trim_matches('/').splitn(2, '/');
        match (parts.next(), parts.next()) {
            (Some(owner), Some(repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok(Self::new(owner, repo.trim_end_matches(".git"), git_ref))
            }
            _ => Err(DriftError::InvalidInput(format!(
                "Expected 'owner/repo[@ref]', got '{}'",
                s
            ))),
        }
    }
}

/// One blob in the repository tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoFile {
    /// Posix path relative to the repository root
    pub path: String,
    /// Size in bytes, when the listing reports one
    pub size: Option<u64>,
    /// Opaque handle understood by the host (blob sha for GitHub)
    pub handle: String,
}

impl RepoFile {
    pub fn new(path: impl Into<String>, size: Option<u64>, handle: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size,
            handle: handle.into(),
        }
    }
}

/// A listed file with its selection score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub file: RepoFile,
    pub score: i64,
}

/// Decoded content of one read-set entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    pub path: String,
    pub content: String,
    /// Content was cut to fit the remaining character budget
    pub truncated: bool,
}

/// Contents of a single path at a ref
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileAtRef {
    pub exists: bool,
    pub content: Option<String>,
}

impl FileAtRef {
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn found(content: impl Into<String>) -> Self {
        Self {
            exists: true,
            content: Some(content.into()),
        }
    }
}
