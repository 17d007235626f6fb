//! In-memory repository host
//!
//! Holds one repository snapshot keyed by path. Useful for tests and for running the
//! engine against content that is not on a hosting service.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::RepoHost;
use crate::types::{DriftError, FileAtRef, RepoFile, RepoRef, Result};

#[derive(Debug, Default)]
pub struct InMemoryHost {
    files: Vec<(String, Vec<u8>)>,
    blob_reads: AtomicUsize,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file; insertion order is the listing order
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let path = path.into();
        let content = content.into();
        match self.files.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = content,
            None => self.files.push((path, content)),
        }
        self
    }

    /// Number of blob fetches served so far
    pub fn blob_reads(&self) -> usize {
        self.blob_reads.load(Ordering::SeqCst)
    }

    fn find(&self, path: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, c)| c.as_slice())
    }
}

#[async_trait]
impl RepoHost for InMemoryHost {
    async fn list_tree(&self, _repo: &RepoRef) -> Result<Vec<RepoFile>> {
        Ok(self
            .files
            .iter()
            .map(|(path, content)| {
                RepoFile::new(path.clone(), Some(content.len() as u64), path.clone())
            })
            .collect())
    }

    async fn get_blob(&self, repo: &RepoRef, handle: &str) -> Result<Vec<u8>> {
        self.blob_reads.fetch_add(1, Ordering::SeqCst);
        self.find(handle)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| DriftError::Host {
                status: 404,
                resource: format!("{}:{}", repo, handle),
                message: "Not Found".to_string(),
            })
    }

    async fn get_file_at_ref(&self, _repo: &RepoRef, path: &str) -> Result<FileAtRef> {
        Ok(match self.find(path) {
            Some(bytes) => FileAtRef::found(String::from_utf8_lossy(bytes)),
            None => FileAtRef::missing(),
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}
