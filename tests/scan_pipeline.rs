//! End-to-end scans against an in-memory repository.

use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};

use docdrift::ai::{CompletionRequest, LlmProvider, LlmResponse, SharedProvider, TokenUsage};
use docdrift::config::ScanConfig;
use docdrift::constants::generation::BUILTIN_MODEL_LABEL;
use docdrift::host::{InMemoryHost, RepoHost};
use docdrift::scan::{ProgressEvent, ScanPhase, Scanner};
use docdrift::types::{
    DocTarget, DriftError, ErrorCategory, FileAtRef, GenerationStrategy, LlmError,
    ProposalOperation, RepoFile, RepoRef, Result,
};

const NEXT_PACKAGE: &str = r#"{
  "name": "widgets",
  "scripts": {"dev": "next dev", "build": "next build"},
  "dependencies": {"next": "14.0.0", "react": "18.2.0"}
}"#;

const NEXT_PRISMA_PACKAGE: &str = r#"{
  "name": "widgets",
  "scripts": {"dev": "next dev"},
  "dependencies": {"next": "14.0.0", "@prisma/client": "5.0.0"},
  "devDependencies": {"prisma": "5.0.0"}
}"#;

const DIGEST: &str = r#"{
  "repoPurpose": "Inventory tracking for widgets",
  "setup": ["npm install", "npm run dev"],
  "envVars": [],
  "keyModules": [],
  "apiRoutes": [],
  "dataModels": [],
  "gotchas": []
}"#;

/// Answers structured requests from `structured` in order and text requests with `text`
struct MockProvider {
    structured: Mutex<Vec<Result<String>>>,
    text: String,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    fn new(mut structured: Vec<Result<String>>, text: &str) -> Self {
        structured.reverse();
        Self {
            structured: Mutex::new(structured),
            text: text.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn structured_calls(&self) -> Vec<Option<usize>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.schema.is_some())
            .map(|r| r.max_tokens)
            .collect()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<LlmResponse> {
        let structured = request.schema.is_some();
        self.requests.lock().unwrap().push(request);
        let content = if structured {
            self.structured
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(DriftError::llm("no scripted reply", "mock")))?
        } else {
            self.text.clone()
        };
        Ok(LlmResponse {
            content,
            usage: TokenUsage::default(),
            model: "mock-model".to_string(),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

/// Hosting API that is down
struct UnavailableHost;

#[async_trait]
impl RepoHost for UnavailableHost {
    async fn list_tree(&self, repo: &RepoRef) -> Result<Vec<RepoFile>> {
        Err(DriftError::Host {
            status: 502,
            resource: repo.to_string(),
            message: "Bad Gateway".to_string(),
        })
    }

    async fn get_blob(&self, _repo: &RepoRef, _handle: &str) -> Result<Vec<u8>> {
        unreachable!("listing fails first")
    }

    async fn get_file_at_ref(&self, _repo: &RepoRef, _path: &str) -> Result<FileAtRef> {
        unreachable!("listing fails first")
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

fn repo() -> RepoRef {
    RepoRef::new("octo", "widgets", "main")
}

fn config() -> ScanConfig {
    ScanConfig {
        progress_interval_ms: 0,
        ..ScanConfig::default()
    }
}

fn readme_target() -> DocTarget {
    DocTarget::new("README", vec!["README.md".to_string()], true)
}

fn scanner(host: impl RepoHost + 'static, llm: Option<SharedProvider>) -> Scanner {
    Scanner::new(Arc::new(host), llm, config())
}

fn size_rate_limit() -> DriftError {
    DriftError::Llm(LlmError::new(
        ErrorCategory::RateLimit,
        "Request too large for gpt-4o-mini on tokens per min (TPM)",
    ))
}

#[tokio::test]
async fn test_readme_update_without_llm() {
    let host = InMemoryHost::new()
        .with_file("package.json", NEXT_PACKAGE)
        .with_file("README.md", "# Old")
        .with_file("app/page.tsx", "export default function Page() { return null; }");

    let result = scanner(host, None)
        .scan(&repo(), &[readme_target()], None, None)
        .await
        .unwrap();

    assert_eq!(result.proposals.len(), 1);
    let proposal = &result.proposals[0];
    assert_eq!(proposal.output_path, "README.md");
    assert_eq!(proposal.operation, ProposalOperation::Update);
    assert_eq!(proposal.before.as_deref(), Some("# Old"));
    assert!(proposal.after.contains("## Getting Started"));
    assert!(proposal.after.contains("npm run dev"));
    assert!(proposal.diff.contains("-# Old"));
    assert_eq!(result.model_label, BUILTIN_MODEL_LABEL);
    assert_eq!(result.files_scanned, 3);
}

#[tokio::test]
async fn test_next_prisma_readme_has_database_setup() {
    let host = InMemoryHost::new()
        .with_file("package.json", NEXT_PRISMA_PACKAGE)
        .with_file("prisma/schema.prisma", "model User { id Int @id }");

    let result = scanner(host, None)
        .scan(&repo(), &[readme_target()], None, None)
        .await
        .unwrap();

    let proposal = &result.proposals[0];
    assert_eq!(proposal.operation, ProposalOperation::Create);
    assert!(proposal.before.is_none());
    assert!(proposal.after.contains("Database Setup"));
    assert!(proposal.after.contains("DATABASE_URL"));
}

#[tokio::test]
async fn test_existing_guide_is_left_alone_without_llm() {
    let guide = "# Deploying\n\nHand-written steps.\n";
    let host = InMemoryHost::new()
        .with_file("package.json", NEXT_PACKAGE)
        .with_file("docs/guides/deploy.md", guide);
    let target = DocTarget::new("Guide", vec!["docs/guides/*.md".to_string()], true);

    let result = scanner(host, None)
        .scan(&repo(), &[target], None, None)
        .await
        .unwrap();

    assert!(result.proposals.is_empty());
    let outcome = &result.generation_metadata.targets[0];
    assert_eq!(outcome.output_path, "docs/guides/deploy.md");
    assert_eq!(outcome.strategy, GenerationStrategy::Preserved);
    assert!(!outcome.changed);
}

#[tokio::test]
async fn test_missing_architecture_doc_is_created() {
    let host = InMemoryHost::new().with_file("package.json", NEXT_PACKAGE);
    let target = DocTarget::new("Architecture", vec!["docs/architecture/**/*.md".to_string()], true);

    let result = scanner(host, None)
        .scan(&repo(), &[target], None, None)
        .await
        .unwrap();

    assert_eq!(result.proposals.len(), 1);
    assert_eq!(result.proposals[0].output_path, "docs/architecture/README.md");
    assert_eq!(result.proposals[0].operation, ProposalOperation::Create);
}

#[tokio::test]
async fn test_unchanged_model_output_gives_no_proposal() {
    let readme = "# Widgets\n\nInventory tracking for widgets.\n";
    let host = InMemoryHost::new()
        .with_file("package.json", NEXT_PACKAGE)
        .with_file("README.md", readme);
    let provider = Arc::new(MockProvider::new(
        vec![Ok(DIGEST.to_string())],
        "```markdown\n# Widgets\n\nInventory tracking for widgets.\n```",
    ));

    let result = scanner(host, Some(provider))
        .scan(&repo(), &[readme_target()], None, None)
        .await
        .unwrap();

    assert!(result.proposals.is_empty());
    assert!(result.generation_metadata.digest_available);
    assert_eq!(result.generation_metadata.targets[0].strategy, GenerationStrategy::Llm);
    assert_eq!(result.model_label, "mock-model");
}

#[tokio::test]
async fn test_digest_retried_once_after_size_rate_limit() {
    let host = InMemoryHost::new()
        .with_file("package.json", NEXT_PACKAGE)
        .with_file("README.md", "# Old");
    let provider = Arc::new(MockProvider::new(
        vec![Err(size_rate_limit()), Ok(DIGEST.to_string())],
        "# Widgets\n\nInventory tracking for widgets.",
    ));

    let result = scanner(host, Some(provider.clone()))
        .scan(&repo(), &[readme_target()], None, None)
        .await
        .unwrap();

    assert!(result.generation_metadata.digest_available);
    assert_eq!(provider.structured_calls().len(), 2);
    let calls = provider.structured_calls();
    assert!(calls[1] < calls[0]);
    assert_eq!(result.proposals.len(), 1);
    assert_eq!(result.proposals[0].after, "# Widgets\n\nInventory tracking for widgets.\n");
}

#[tokio::test]
async fn test_llm_outage_degrades_to_builtin_generator() {
    let host = InMemoryHost::new()
        .with_file("package.json", NEXT_PACKAGE)
        .with_file("README.md", "# Old");
    let provider = Arc::new(MockProvider::new(
        vec![Err(DriftError::llm("503 service unavailable", "mock"))],
        "never used",
    ));

    let result = scanner(host, Some(provider.clone()))
        .scan(&repo(), &[readme_target()], None, None)
        .await
        .unwrap();

    assert!(!result.generation_metadata.digest_available);
    assert_eq!(result.model_label, BUILTIN_MODEL_LABEL);
    assert_eq!(provider.requests.lock().unwrap().len(), 1);
    assert!(result.proposals[0].after.contains("## Getting Started"));
}

#[tokio::test]
async fn test_constraints_reach_the_model() {
    let host = InMemoryHost::new().with_file("README.md", "# Old");
    let provider = Arc::new(MockProvider::new(vec![Ok(DIGEST.to_string())], "# New"));

    scanner(host, Some(provider.clone()))
        .scan(
            &repo(),
            &[readme_target()],
            Some("Write in British English"),
            None,
        )
        .await
        .unwrap();

    let requests = provider.requests.lock().unwrap();
    let rewrite = requests.iter().find(|r| r.schema.is_none()).unwrap();
    assert!(rewrite.system.contains("Write in British English"));
    let payload: serde_json::Value = serde_json::from_str(&rewrite.user).unwrap();
    assert_eq!(payload["existingContent"], json!("# Old"));
}

#[tokio::test]
async fn test_host_failure_aborts_with_failed_event() {
    let events = Mutex::new(Vec::<ProgressEvent>::new());
    let sink = |event: ProgressEvent| events.lock().unwrap().push(event);

    let err = scanner(UnavailableHost, None)
        .scan(&repo(), &[readme_target()], None, Some(&sink))
        .await
        .unwrap_err();

    assert!(err.is_host_error());
    let events = events.into_inner().unwrap();
    let last = events.last().unwrap();
    assert_eq!(last.phase, ScanPhase::Failed);
    assert!(last.message.as_deref().unwrap().contains("502"));
    assert!(last.meta.as_ref().unwrap().get("scanId").is_some());
}

#[tokio::test]
async fn test_configured_output_cap_reaches_rewrite_request() {
    let host = InMemoryHost::new().with_file("README.md", "# Old");
    let provider = Arc::new(MockProvider::new(vec![Ok(DIGEST.to_string())], "# New"));

    Scanner::new(Arc::new(host), Some(provider.clone()), config())
        .with_max_output_tokens(1234)
        .scan(&repo(), &[readme_target()], None, None)
        .await
        .unwrap();

    let requests = provider.requests.lock().unwrap();
    let rewrite = requests.iter().find(|r| r.schema.is_none()).unwrap();
    assert_eq!(rewrite.max_tokens, Some(1234));
}
