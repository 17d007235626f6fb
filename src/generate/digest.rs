//! Repository Digest
//!
//! One structured LLM request over excerpts of the read set. The digest is an
//! optional enrichment: every failure is logged and yields `None`, except a
//! request-size rate limit, which is retried exactly once with a smaller output cap.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::ai::{LlmProvider, PromptTemplates};
use crate::constants::{digest as limits, progress as progress_ranges};
use crate::scan::classify::basename;
use crate::scan::fetch::truncate_chars;
use crate::scan::progress::{ProgressReporter, ScanPhase};
use crate::types::{FetchedFile, RepoDigest, RepoFacts, RepoSummary, Result};

/// File content handed to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Excerpt {
    pub path: String,
    pub content: String,
    pub truncated: bool,
}

/// Builds the digest request and interprets the response
pub struct DigestGenerator<'a> {
    llm: &'a dyn LlmProvider,
    excerpt_chars: usize,
    total_excerpt_chars: usize,
}

impl<'a> DigestGenerator<'a> {
    pub fn new(llm: &'a dyn LlmProvider, excerpt_chars: usize, total_excerpt_chars: usize) -> Self {
        Self {
            llm,
            excerpt_chars,
            total_excerpt_chars,
        }
    }

    pub async fn generate(
        &self,
        summary: &RepoSummary,
        facts: &RepoFacts,
        fetched: &[FetchedFile],
        progress: &ProgressReporter<'_>,
    ) -> Option<RepoDigest> {
        progress.report(
            ScanPhase::Digest,
            progress_ranges::DIGEST.0 as f64,
            Some("Summarizing repository".to_string()),
        );

        let excerpts = build_excerpts(fetched, self.excerpt_chars, self.total_excerpt_chars);
        let payload = json!({
            "summary": summary,
            "facts": facts,
            "files": excerpts,
        });
        debug!("Digest request with {} excerpts", excerpts.len());

        let digest = match self.request(&payload).await {
            Ok(digest) => Some(digest),
            Err(e) => {
                warn!("Digest unavailable: {}", e);
                None
            }
        };

        progress.report(
            ScanPhase::Digest,
            progress_ranges::DIGEST.1 as f64,
            Some(if digest.is_some() {
                "Digest ready".to_string()
            } else {
                "Continuing without digest".to_string()
            }),
        );
        digest
    }

    async fn request(&self, payload: &Value) -> Result<RepoDigest> {
        let system = PromptTemplates::digest();
        let schema = digest_schema();

        let value = match self
            .llm
            .complete_structured(&system, payload, &schema, Some(limits::MAX_OUTPUT_TOKENS))
            .await
        {
            Err(e) if e.is_request_too_large() => {
                info!("Digest request too large, retrying once with a smaller output cap");
                self.llm
                    .complete_structured(&system, payload, &schema, Some(limits::RETRY_OUTPUT_TOKENS))
                    .await?
            }
            other => other?,
        };

        Ok(serde_json::from_value(value)?)
    }
}

/// Priority files first, then the rest in discovery order, within both caps.
///
/// At least one excerpt is produced whenever any file was fetched.
pub fn build_excerpts(fetched: &[FetchedFile], per_file: usize, total: usize) -> Vec<Excerpt> {
    let mut ordered: Vec<&FetchedFile> = fetched.iter().collect();
    ordered.sort_by_key(|f| priority_rank(&f.path));

    let mut excerpts = Vec::new();
    let mut used = 0usize;
    for file in ordered {
        let remaining = total.saturating_sub(used);
        if remaining == 0 && !excerpts.is_empty() {
            break;
        }
        let cap = if remaining == 0 {
            per_file.max(1)
        } else {
            per_file.min(remaining)
        };
        let (content, cut) = truncate_chars(&file.content, cap);
        used += content.chars().count();
        excerpts.push(Excerpt {
            path: file.path.clone(),
            content,
            truncated: cut || file.truncated,
        });
    }
    excerpts
}

fn priority_rank(path: &str) -> u8 {
    let name = basename(path);
    let at_root = !path.contains('/');
    match name {
        "package.json" if at_root => 0,
        "README.md" | "readme.md" if at_root => 1,
        _ if name.starts_with("next.config.")
            || name.starts_with("vite.config.")
            || name.starts_with("nuxt.config.")
            || name.starts_with("astro.config.") =>
        {
            2
        }
        "schema.prisma" => 3,
        _ => 4,
    }
}

/// JSON schema the model must follow
pub fn digest_schema() -> Value {
    let string_list = json!({"type": "array", "items": {"type": "string"}});
    json!({
        "type": "object",
        "properties": {
            "repoPurpose": {"type": "string"},
            "setup": string_list,
            "envVars": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {"name": {"type": "string"}, "purpose": {"type": "string"}},
                    "required": ["name", "purpose"]
                }
            },
            "keyModules": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {"path": {"type": "string"}, "responsibility": {"type": "string"}},
                    "required": ["path", "responsibility"]
                }
            },
            "apiRoutes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "path": {"type": "string"},
                        "methods": string_list,
                        "description": {"type": "string"}
                    },
                    "required": ["path", "methods"]
                }
            },
            "dataModels": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {"name": {"type": "string"}, "description": {"type": "string"}},
                    "required": ["name"]
                }
            },
            "gotchas": string_list
        },
        "required": ["repoPurpose", "setup", "envVars", "keyModules", "apiRoutes", "dataModels", "gotchas"]
    })
}
