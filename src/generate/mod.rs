//! Document Generation
//!
//! Per enabled target: resolve the output path, load the current document, then
//! produce new content with the LLM (only when a digest exists) or the
//! deterministic templates.
//!
//! ## Content policy
//!
//! - digest + LLM: README is regenerated against a fixed style guide; other kinds get
//!   minimal, structure-preserving edits
//! - otherwise README is templated from repository facts
//! - otherwise an existing non-README document is returned unchanged
//! - otherwise a per-kind skeleton is created

pub mod diff;
pub mod digest;
pub mod templates;

pub use diff::{build_proposal, unified_diff};
pub use digest::{DigestGenerator, Excerpt, build_excerpts, digest_schema};
pub use templates::{TemplateContext, render_readme, render_skeleton};

use serde_json::json;
use tracing::{debug, info, warn};

use crate::ai::{LlmProvider, PromptTemplates, strip_code_fences};
use crate::constants::{generation, progress as progress_ranges};
use crate::host::RepoHost;
use crate::scan::classify::extension;
use crate::scan::fetch::truncate_chars;
use crate::scan::glob::{any_glob_matches, infer_output_path_from_glob};
use crate::scan::progress::{ProgressReporter, ScanPhase, interpolate};
use crate::types::{
    DocTarget, DriftError, GenerationStrategy, RepoDigest, RepoFacts, RepoFile, RepoRef,
    RepoSummary, Result,
};

/// Read-only scan state shared by every target
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    pub repo: &'a RepoRef,
    pub files: &'a [RepoFile],
    pub summary: &'a RepoSummary,
    pub facts: &'a RepoFacts,
    pub digest: Option<&'a RepoDigest>,
    pub constraints: Option<&'a str>,
}

/// Content produced for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub target_type: String,
    pub output_path: String,
    pub before: Option<String>,
    pub after: String,
    pub strategy: GenerationStrategy,
}

pub struct DocumentGenerator<'a> {
    host: &'a dyn RepoHost,
    llm: Option<&'a dyn LlmProvider>,
    existing_doc_max_chars: usize,
    max_output_tokens: usize,
}

impl<'a> DocumentGenerator<'a> {
    pub fn new(
        host: &'a dyn RepoHost,
        llm: Option<&'a dyn LlmProvider>,
        existing_doc_max_chars: usize,
    ) -> Self {
        Self {
            host,
            llm,
            existing_doc_max_chars,
            max_output_tokens: generation::MAX_OUTPUT_TOKENS,
        }
    }

    /// Output token cap for model rewrites
    pub fn with_max_output_tokens(mut self, max_output_tokens: usize) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Generate every target in order. Hosting errors abort; LLM errors degrade.
    pub async fn generate_all(
        &self,
        ctx: &GenerationContext<'_>,
        targets: &[DocTarget],
        progress: &ProgressReporter<'_>,
    ) -> Result<Vec<GeneratedDocument>> {
        let mut documents = Vec::with_capacity(targets.len());
        for (index, target) in targets.iter().enumerate() {
            progress.report(
                ScanPhase::Generate,
                interpolate(progress_ranges::GENERATING, index, targets.len()),
                Some(format!("Generating {}", target.target_type)),
            );
            documents.push(self.generate(ctx, target).await?);
        }
        Ok(documents)
    }

    pub async fn generate(
        &self,
        ctx: &GenerationContext<'_>,
        target: &DocTarget,
    ) -> Result<GeneratedDocument> {
        let output_path = resolve_output_path(target, ctx.files);
        let existing = self.host.get_file_at_ref(ctx.repo, &output_path).await?;
        let before = existing.content.filter(|_| existing.exists);
        debug!(
            "Target '{}' -> {} (exists: {})",
            target.target_type,
            output_path,
            before.is_some()
        );

        if let (Some(llm), Some(digest)) = (self.llm, ctx.digest) {
            match self
                .rewrite(llm, ctx, digest, target, &output_path, before.as_deref())
                .await
            {
                Ok(after) => {
                    return Ok(GeneratedDocument {
                        target_type: target.target_type.clone(),
                        output_path,
                        before,
                        after,
                        strategy: GenerationStrategy::Llm,
                    });
                }
                Err(e) => warn!(
                    "LLM generation failed for '{}', using built-in generator: {}",
                    target.target_type, e
                ),
            }
        }

        let template_ctx = TemplateContext::new(ctx.summary, ctx.facts);
        let (after, strategy) = if target.is_readme() {
            (render_readme(&template_ctx), GenerationStrategy::Template)
        } else if let Some(existing) = &before {
            (existing.clone(), GenerationStrategy::Preserved)
        } else {
            (
                render_skeleton(target.kind(), &target.target_type, &template_ctx),
                GenerationStrategy::Template,
            )
        };

        Ok(GeneratedDocument {
            target_type: target.target_type.clone(),
            output_path,
            before,
            after,
            strategy,
        })
    }

    async fn rewrite(
        &self,
        llm: &dyn LlmProvider,
        ctx: &GenerationContext<'_>,
        digest: &RepoDigest,
        target: &DocTarget,
        output_path: &str,
        before: Option<&str>,
    ) -> Result<String> {
        let existing = before.map(|text| truncate_chars(text, self.existing_doc_max_chars).0);
        let system = if target.is_readme() {
            PromptTemplates::readme(ctx.constraints)
        } else {
            PromptTemplates::minimal_edit(&target.target_type, ctx.constraints)
        };
        let payload = json!({
            "targetType": target.target_type,
            "outputPath": output_path,
            "existingContent": existing,
            "digest": digest,
            "summary": ctx.summary,
            "facts": ctx.facts,
        });

        let raw = llm
            .complete_text(&system, &payload, Some(self.max_output_tokens))
            .await?;
        let content = strip_code_fences(&raw).trim();
        if content.is_empty() {
            return Err(DriftError::llm(
                "model returned an empty document",
                llm.name(),
            ));
        }

        // Whitespace-only differences are not worth a proposal
        if let Some(before) = before
            && before.trim_end() == content
        {
            info!("'{}' unchanged by model", target.target_type);
            return Ok(before.to_string());
        }
        Ok(format!("{}\n", content))
    }
}

/// Output path for a target.
///
/// The first listed Markdown file matching the target's globs wins; otherwise the
/// path is inferred from the first glob using the kind's fallback location.
pub fn resolve_output_path(target: &DocTarget, files: &[RepoFile]) -> String {
    if let Some(file) = files
        .iter()
        .find(|f| is_markdown(&f.path) && any_glob_matches(&target.paths, &f.path))
    {
        return file.path.clone();
    }

    let (dir, file) = target.kind().fallback_location();
    match target.paths.first() {
        Some(pattern) => infer_output_path_from_glob(pattern, dir, file),
        None => infer_output_path_from_glob("", dir, file),
    }
}

fn is_markdown(path: &str) -> bool {
    matches!(extension(path).as_deref(), Some("md" | "mdx" | "markdown"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{CompletionRequest, LlmResponse, TokenUsage};
    use crate::host::InMemoryHost;
    use async_trait::async_trait;

    struct FixedProvider(std::result::Result<&'static str, &'static str>);

    #[async_trait]
    impl LlmProvider for FixedProvider {
        async fn complete(&self, _request: CompletionRequest) -> Result<LlmResponse> {
            match self.0 {
                Ok(content) => Ok(LlmResponse {
                    content: content.to_string(),
                    usage: TokenUsage::default(),
                    model: "fixed".to_string(),
                }),
                Err(message) => Err(DriftError::llm(message, "fixed")),
            }
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn model(&self) -> &str {
            "fixed-1"
        }
    }

    fn listing(paths: &[&str]) -> Vec<RepoFile> {
        paths.iter().map(|p| RepoFile::new(*p, Some(10), *p)).collect()
    }

    fn target(kind: &str, paths: &[&str]) -> DocTarget {
        DocTarget::new(kind, paths.iter().map(|p| p.to_string()).collect(), true)
    }

    fn summary() -> RepoSummary {
        RepoSummary {
            repo_id: "o/r".to_string(),
            git_ref: "main".to_string(),
            total_files: 0,
            top_level: Vec::new(),
        }
    }

    #[test]
    fn test_existing_markdown_match_wins() {
        let files = listing(&["docs/arch/notes.txt", "docs/arch/overview.md", "docs/arch/z.md"]);
        let t = target("Architecture", &["docs/arch/**/*.md"]);
        assert_eq!(resolve_output_path(&t, &files), "docs/arch/overview.md");
    }

    #[test]
    fn test_inferred_paths_use_kind_fallbacks() {
        assert_eq!(
            resolve_output_path(&target("Architecture", &["**/*.md"]), &[]),
            "docs/architecture/README.md"
        );
        assert_eq!(
            resolve_output_path(&target("API Reference", &["docs/reference/*.md"]), &[]),
            "docs/reference/README.md"
        );
        assert_eq!(resolve_output_path(&target("README", &["README.md"]), &[]), "README.md");
    }

    #[tokio::test]
    async fn test_existing_non_readme_preserved_without_llm() {
        let host = InMemoryHost::new().with_file("docs/guide.md", "# Guide\nkeep me\n");
        let files = listing(&["docs/guide.md"]);
        let summary = summary();
        let facts = RepoFacts::default();
        let repo = RepoRef::new("o", "r", "main");
        let ctx = GenerationContext {
            repo: &repo,
            files: &files,
            summary: &summary,
            facts: &facts,
            digest: None,
            constraints: None,
        };

        let doc = DocumentGenerator::new(&host, None, 1000)
            .generate(&ctx, &target("Guide", &["docs/*.md"]))
            .await
            .unwrap();
        assert_eq!(doc.strategy, GenerationStrategy::Preserved);
        assert_eq!(doc.before.as_deref(), Some(doc.after.as_str()));
    }

    #[tokio::test]
    async fn test_llm_needs_digest() {
        let host = InMemoryHost::new();
        let provider = FixedProvider(Ok("# From model"));
        let summary = summary();
        let facts = RepoFacts::default();
        let repo = RepoRef::new("o", "r", "main");
        let digest = RepoDigest::default();
        let mut ctx = GenerationContext {
            repo: &repo,
            files: &[],
            summary: &summary,
            facts: &facts,
            digest: None,
            constraints: Some("be brief"),
        };
        let generator = DocumentGenerator::new(&host, Some(&provider), 1000);
        let t = target("Tutorial", &["docs/tutorials/*.md"]);

        let templated = generator.generate(&ctx, &t).await.unwrap();
        assert_eq!(templated.strategy, GenerationStrategy::Template);
        assert_eq!(templated.output_path, "docs/tutorials/getting-started.md");

        ctx.digest = Some(&digest);
        let rewritten = generator.generate(&ctx, &t).await.unwrap();
        assert_eq!(rewritten.strategy, GenerationStrategy::Llm);
        assert_eq!(rewritten.after, "# From model\n");
    }

    #[tokio::test]
    async fn test_llm_failure_falls_back_to_template() {
        let host = InMemoryHost::new().with_file("README.md", "# Old");
        let provider = FixedProvider(Err("503 service unavailable"));
        let summary = summary();
        let facts = RepoFacts::default();
        let repo = RepoRef::new("o", "r", "main");
        let digest = RepoDigest::default();
        let files = listing(&["README.md"]);
        let ctx = GenerationContext {
            repo: &repo,
            files: &files,
            summary: &summary,
            facts: &facts,
            digest: Some(&digest),
            constraints: None,
        };

        let doc = DocumentGenerator::new(&host, Some(&provider), 1000)
            .generate(&ctx, &target("README", &["README.md"]))
            .await
            .unwrap();
        assert_eq!(doc.strategy, GenerationStrategy::Template);
        assert_eq!(doc.before.as_deref(), Some("# Old"));
        assert!(doc.after.contains("## Getting Started"));
    }

    #[tokio::test]
    async fn test_fenced_model_output_is_unwrapped() {
        let host = InMemoryHost::new();
        let provider = FixedProvider(Ok("```markdown\n# API\n\n| GET | /api/x |\n```"));
        let summary = summary();
        let facts = RepoFacts::default();
        let repo = RepoRef::new("o", "r", "main");
        let digest = RepoDigest::default();
        let ctx = GenerationContext {
            repo: &repo,
            files: &[],
            summary: &summary,
            facts: &facts,
            digest: Some(&digest),
            constraints: None,
        };

        let doc = DocumentGenerator::new(&host, Some(&provider), 1000)
            .generate(&ctx, &target("API Reference", &["docs/api/**/*.md"]))
            .await
            .unwrap();
        assert_eq!(doc.after, "# API\n\n| GET | /api/x |\n");
        assert_eq!(doc.output_path, "docs/api/README.md");
    }
}
