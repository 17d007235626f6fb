//! Content Fetching
//!
//! Reads the ranked read set one file at a time. Each file may use at most the
//! character budget still remaining, so earlier (higher ranked) files get full
//! content and later ones are truncated or skipped.

use tracing::debug;

use super::progress::{ProgressReporter, ScanPhase, interpolate};
use crate::constants::progress as progress_ranges;
use crate::host::RepoHost;
use crate::types::{CandidateFile, FetchedFile, RepoRef, Result};

/// Outcome of fetching the read set
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub files: Vec<FetchedFile>,
    /// Characters consumed from the budget
    pub chars_read: usize,
}

impl FetchOutcome {
    pub fn truncated_count(&self) -> usize {
        self.files.iter().filter(|f| f.truncated).count()
    }
}

/// Budgeted, sequential blob reader
pub struct ContentFetcher<'a> {
    host: &'a dyn RepoHost,
    max_total_chars: usize,
}

impl<'a> ContentFetcher<'a> {
    pub fn new(host: &'a dyn RepoHost, max_total_chars: usize) -> Self {
        Self {
            host,
            max_total_chars,
        }
    }

    /// Fetch candidates in order until the character budget runs out.
    ///
    /// Hosting errors abort the fetch.
    pub async fn fetch(
        &self,
        repo: &RepoRef,
        candidates: &[CandidateFile],
        progress: &ProgressReporter<'_>,
    ) -> Result<FetchOutcome> {
        let mut outcome = FetchOutcome::default();
        let total = candidates.len();

        for (index, candidate) in candidates.iter().enumerate() {
            let remaining = self.max_total_chars.saturating_sub(outcome.chars_read);
            if remaining == 0 {
                debug!(
                    "Character budget exhausted after {} of {} files",
                    index, total
                );
                break;
            }

            progress.report(
                ScanPhase::ReadFiles,
                interpolate(progress_ranges::READ_FILES, index, total),
                Some(format!("Reading {}", candidate.file.path)),
            );

            let bytes = self.host.get_blob(repo, &candidate.file.handle).await?;
            let text = String::from_utf8_lossy(&bytes);
            let (content, truncated) = truncate_chars(&text, remaining);
            let used = content.chars().count();

            outcome.chars_read += used;
            outcome.files.push(FetchedFile {
                path: candidate.file.path.clone(),
                content,
                truncated,
            });
        }

        debug!(
            "Fetched {} files ({} chars, {} truncated)",
            outcome.files.len(),
            outcome.chars_read,
            outcome.truncated_count()
        );
        Ok(outcome)
    }
}

/// First `max_chars` characters of `text` and whether anything was cut
pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (text[..byte_idx].to_string(), true),
        None => (text.to_string(), false),
    }
}
