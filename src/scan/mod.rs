//! Scan Pipeline
//!
//! Orchestrates one scan end to end:
//!
//! 1. list the tree at the ref
//! 2. rank and cap the read set
//! 3. fetch contents under the character budget
//! 4. summarize layout and extract facts
//! 5. optional LLM digest
//! 6. generate each enabled target
//! 7. diff against current content
//!
//! Hosting failures abort the scan with a `failed` progress event. LLM failures
//! never do; they only downgrade the output to the built-in generator.

pub mod classify;
pub mod fetch;
pub mod glob;
pub mod progress;
pub mod select;
pub mod summary;

pub use fetch::{ContentFetcher, FetchOutcome};
pub use glob::{GlobMatcher, any_glob_matches, infer_output_path_from_glob};
pub use progress::{ProgressEvent, ProgressReporter, ProgressSink, ScanPhase};
pub use select::CandidateSelector;

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::ai::{SharedProvider, create_provider, with_optional_timeout};
use crate::config::{Config, ProjectSettings, ScanConfig};
use crate::constants::{generation, progress as progress_ranges};
use crate::generate::{DigestGenerator, DocumentGenerator, GenerationContext, build_proposal};
use crate::host::{GitHubHost, SharedHost};
use crate::types::{
    DocTarget, FileAtRef, GenerationMetadata, GenerationStrategy, RepoRef, Result, ScanResult,
    TargetOutcome,
};

/// Scan engine; cheap to share, independent scans may run concurrently
pub struct Scanner {
    host: SharedHost,
    llm: Option<SharedProvider>,
    config: ScanConfig,
    max_output_tokens: usize,
}

impl Scanner {
    pub fn new(host: SharedHost, llm: Option<SharedProvider>, config: ScanConfig) -> Self {
        Self {
            host,
            llm,
            config,
            max_output_tokens: generation::MAX_OUTPUT_TOKENS,
        }
    }

    /// GitHub host plus the configured LLM (if an API key is available)
    pub fn from_config(config: &Config) -> Result<Self> {
        let host: SharedHost = Arc::new(GitHubHost::new(&config.host)?);
        let llm = create_provider(&config.llm)?;
        Ok(Self::new(host, llm, config.scan.clone()).with_max_output_tokens(config.llm.max_tokens))
    }

    /// Output token cap for document rewrites
    pub fn with_max_output_tokens(mut self, max_output_tokens: usize) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Scan using targets and constraints from project settings
    pub async fn scan_project(
        &self,
        repo: &RepoRef,
        project: &ProjectSettings,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<ScanResult> {
        let targets = project.doc_targets()?;
        self.scan(repo, &targets, project.constraints.as_deref(), progress)
            .await
    }

    /// Run one scan and report progress to `progress`
    pub async fn scan(
        &self,
        repo: &RepoRef,
        targets: &[DocTarget],
        constraints: Option<&str>,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<ScanResult> {
        let reporter = ProgressReporter::new(
            progress,
            Duration::from_millis(self.config.progress_interval_ms),
        );
        let scan_id = Uuid::new_v4();
        let span = info_span!("scan", %scan_id, repo = %repo);

        let deadline = self.config.timeout_secs.map(Duration::from_secs);
        let outcome = with_optional_timeout(
            deadline,
            self.run(scan_id, repo, targets, constraints, &reporter)
                .instrument(span.clone()),
            "scan",
        )
        .await;

        match &outcome {
            Ok(result) => {
                reporter.report_with_meta(
                    ScanPhase::Done,
                    100.0,
                    Some(format!("{} proposal(s)", result.proposals.len())),
                    Some(json!({"scanId": scan_id, "proposals": result.proposals.len()})),
                );
            }
            Err(e) => {
                span.in_scope(|| warn!("Scan failed: {}", e));
                reporter.report_with_meta(
                    ScanPhase::Failed,
                    100.0,
                    Some(e.to_string()),
                    Some(json!({"scanId": scan_id})),
                );
            }
        }
        outcome
    }

    async fn run(
        &self,
        scan_id: Uuid,
        repo: &RepoRef,
        targets: &[DocTarget],
        constraints: Option<&str>,
        reporter: &ProgressReporter<'_>,
    ) -> Result<ScanResult> {
        let started_at = Utc::now();
        info!("Scanning {}", repo);

        reporter.report(
            ScanPhase::ListFiles,
            progress_ranges::LISTING as f64,
            Some("Listing files".to_string()),
        );
        let files = self.host.list_tree(repo).await?;

        let candidates =
            CandidateSelector::new(self.config.max_files, self.config.max_file_bytes).select(&files);
        reporter.report_with_meta(
            ScanPhase::SelectFiles,
            progress_ranges::SELECTING as f64,
            Some(format!("Selected {} of {} files", candidates.len(), files.len())),
            Some(json!({"totalFiles": files.len(), "selected": candidates.len()})),
        );

        let fetched = ContentFetcher::new(self.host.as_ref(), self.config.max_total_chars)
            .fetch(repo, &candidates, reporter)
            .await?;

        reporter.report(
            ScanPhase::Summarize,
            progress_ranges::SUMMARIZING as f64,
            Some("Summarizing repository layout".to_string()),
        );
        let repo_summary = summary::summarize(repo, &files);
        let facts = summary::extract_facts(&files, &fetched.files);

        let digest = match &self.llm {
            Some(llm) => {
                DigestGenerator::new(
                    llm.as_ref(),
                    self.config.excerpt_chars,
                    self.config.total_excerpt_chars,
                )
                .generate(&repo_summary, &facts, &fetched.files, reporter)
                .await
            }
            None => None,
        };

        let enabled_targets: Vec<DocTarget> =
            targets.iter().filter(|t| t.enabled).cloned().collect();
        let ctx = GenerationContext {
            repo,
            files: &files,
            summary: &repo_summary,
            facts: &facts,
            digest: digest.as_ref(),
            constraints,
        };
        let documents = DocumentGenerator::new(
            self.host.as_ref(),
            self.llm.as_deref(),
            self.config.existing_doc_max_chars,
        )
        .with_max_output_tokens(self.max_output_tokens)
        .generate_all(&ctx, &enabled_targets, reporter)
        .await?;

        reporter.report(
            ScanPhase::Diff,
            progress_ranges::DIFFING as f64,
            Some("Building proposals".to_string()),
        );
        let mut proposals = Vec::new();
        let mut outcomes = Vec::with_capacity(documents.len());
        for doc in &documents {
            let proposal = build_proposal(&doc.output_path, doc.before.as_deref(), &doc.after);
            outcomes.push(TargetOutcome {
                target_type: doc.target_type.clone(),
                output_path: doc.output_path.clone(),
                strategy: doc.strategy,
                changed: proposal.is_some(),
            });
            proposals.extend(proposal);
        }

        let model_used = documents
            .iter()
            .any(|d| d.strategy == GenerationStrategy::Llm);
        let model_label = match (&self.llm, model_used) {
            (Some(llm), true) => llm.model().to_string(),
            _ => generation::BUILTIN_MODEL_LABEL.to_string(),
        };

        let files_scanned = fetched.files.len();
        info!(
            "Scan complete: {} files read, {} proposal(s), generator: {}",
            files_scanned,
            proposals.len(),
            model_label
        );

        Ok(ScanResult {
            repo_summary,
            enabled_targets,
            files_scanned,
            proposals,
            model_label,
            generation_metadata: GenerationMetadata {
                scan_id,
                started_at,
                finished_at: Utc::now(),
                digest_available: digest.is_some(),
                chars_read: fetched.chars_read,
                truncated_files: fetched.truncated_count(),
                targets: outcomes,
            },
        })
    }

    /// Whether `path` exists at the ref, with its content
    pub async fn file_exists(&self, repo: &RepoRef, path: &str) -> Result<FileAtRef> {
        let path = path.trim().trim_start_matches("./").trim_start_matches('/');
        self.host.get_file_at_ref(repo, path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::InMemoryHost;
    use std::sync::Mutex;

    fn readme_target() -> DocTarget {
        DocTarget::new("README", vec!["README.md".to_string()], true)
    }

    fn scanner(host: InMemoryHost) -> Scanner {
        let config = ScanConfig {
            progress_interval_ms: 0,
            ..ScanConfig::default()
        };
        Scanner::new(Arc::new(host), None, config)
    }

    #[tokio::test]
    async fn test_disabled_targets_are_skipped() {
        let host = InMemoryHost::new().with_file("README.md", "# Old");
        let targets = vec![
            readme_target(),
            DocTarget::new("Guide", vec!["docs/*.md".to_string()], false),
        ];
        let result = scanner(host)
            .scan(&RepoRef::new("o", "r", "main"), &targets, None, None)
            .await
            .unwrap();

        assert_eq!(result.enabled_targets, vec![readme_target()]);
        assert_eq!(result.generation_metadata.targets.len(), 1);
        assert_eq!(result.model_label, generation::BUILTIN_MODEL_LABEL);
        assert!(!result.generation_metadata.digest_available);
    }

    #[tokio::test]
    async fn test_files_scanned_respects_max_files() {
        let host = (0..20).fold(InMemoryHost::new(), |h, i| {
            h.with_file(format!("src/f{}.ts", i), "export const x = 1;")
        });
        let config = ScanConfig {
            max_files: 5,
            ..ScanConfig::default()
        };
        let result = Scanner::new(Arc::new(host), None, config)
            .scan(&RepoRef::new("o", "r", "main"), &[], None, None)
            .await
            .unwrap();
        assert_eq!(result.files_scanned, 5);
        assert_eq!(result.repo_summary.total_files, 20);
        assert!(result.proposals.is_empty());
    }

    #[tokio::test]
    async fn test_files_scanned_counts_only_fetched_files() {
        let host = Arc::new((0..5).fold(InMemoryHost::new(), |h, i| {
            h.with_file(format!("src/f{}.ts", i), "0123456789")
        }));
        let config = ScanConfig {
            max_total_chars: 10,
            ..ScanConfig::default()
        };
        let result = Scanner::new(host.clone(), None, config)
            .scan(&RepoRef::new("o", "r", "main"), &[], None, None)
            .await
            .unwrap();

        assert_eq!(result.files_scanned, 1);
        assert_eq!(result.files_scanned, host.blob_reads());
        assert_eq!(result.generation_metadata.chars_read, 10);
    }

    #[tokio::test]
    async fn test_progress_ends_with_done() {
        let host = InMemoryHost::new().with_file("README.md", "# Old");
        let events = Mutex::new(Vec::new());
        let sink = |event: ProgressEvent| events.lock().unwrap().push(event);
        scanner(host)
            .scan(&RepoRef::new("o", "r", "main"), &[readme_target()], None, Some(&sink))
            .await
            .unwrap();

        let events = events.into_inner().unwrap();
        let last = events.last().unwrap();
        assert_eq!(last.phase, ScanPhase::Done);
        assert_eq!(last.percent, 100);
        assert!(events.windows(2).all(|w| w[0].percent <= w[1].percent));
    }

    #[test]
    fn test_configured_output_cap_is_used() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-test".to_string());
        config.llm.max_tokens = 1234;
        let scanner = Scanner::from_config(&config).unwrap();
        assert!(scanner.has_llm());
        assert_eq!(scanner.max_output_tokens, 1234);
    }

    #[tokio::test]
    async fn test_file_exists_normalizes_path() {
        let host = InMemoryHost::new().with_file("docs/a.md", "# A");
        let scanner = scanner(host);
        let repo = RepoRef::new("o", "r", "main");
        assert!(scanner.file_exists(&repo, "/docs/a.md").await.unwrap().exists);
        assert!(!scanner.file_exists(&repo, "docs/b.md").await.unwrap().exists);
    }
}
