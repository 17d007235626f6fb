//! Scan outputs: summaries, digest, proposals and the final result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::target::DocTarget;

// =============================================================================
// Repository Summary
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopLevelEntry {
    pub name: String,
    pub count: usize,
}

/// Structural summary of the whole listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSummary {
    pub repo_id: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub total_files: usize,
    /// At most 12 entries, largest first
    pub top_level: Vec<TopLevelEntry>,
}

/// Route handler discovered in the read set
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRoute {
    pub api_path: String,
    pub methods: Vec<String>,
}

impl ApiRoute {
    /// Scheduled-job endpoints live under a `cron` segment
    pub fn is_cron(&self) -> bool {
        self.api_path.split('/').any(|seg| seg.eq_ignore_ascii_case("cron"))
    }
}

/// The subset of `package.json` the generators use
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageManifest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub license: Option<String>,
    pub scripts: BTreeMap<String, String>,
    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Runtime or dev dependency
    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }

    /// All dependency names, runtime first
    pub fn all_dependencies(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .keys()
            .chain(self.dev_dependencies.keys())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    pub fn install_command(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm install",
            PackageManager::Yarn => "yarn install",
            PackageManager::Pnpm => "pnpm install",
            PackageManager::Bun => "bun install",
        }
    }

    pub fn run_command(&self, script: &str) -> String {
        match self {
            PackageManager::Npm => format!("npm run {}", script),
            PackageManager::Yarn => format!("yarn {}", script),
            PackageManager::Pnpm => format!("pnpm {}", script),
            PackageManager::Bun => format!("bun run {}", script),
        }
    }

    pub fn exec_command(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npx",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm exec",
            PackageManager::Bun => "bunx",
        }
    }
}

/// Facts derived from the listing and the read set, used by the generators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoFacts {
    pub api_routes: Vec<ApiRoute>,
    /// App-router page paths such as `/dashboard/[id]`
    pub page_routes: Vec<String>,
    pub manifest: Option<PackageManifest>,
    pub package_manager: PackageManager,
    pub has_dockerfile: bool,
    pub has_compose: bool,
    pub has_prisma_schema: bool,
    pub has_license_file: bool,
    /// Variable names declared in `.env.example`-style files
    pub env_example_vars: Vec<String>,
}

// =============================================================================
// Digest
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestEnvVar {
    pub name: String,
    pub purpose: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestModule {
    pub path: String,
    pub responsibility: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestRoute {
    pub path: String,
    pub methods: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestModel {
    pub name: String,
    pub description: String,
}

/// Structured, model-derived summary of a repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepoDigest {
    pub repo_purpose: String,
    pub setup: Vec<String>,
    pub env_vars: Vec<DigestEnvVar>,
    pub key_modules: Vec<DigestModule>,
    pub api_routes: Vec<DigestRoute>,
    pub data_models: Vec<DigestModel>,
    pub gotchas: Vec<String>,
}

// =============================================================================
// Proposals
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalOperation {
    Create,
    Update,
}

impl std::fmt::Display for ProposalOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProposalOperation::Create => write!(f, "create"),
            ProposalOperation::Update => write!(f, "update"),
        }
    }
}

/// One file-level change suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalFile {
    pub output_path: String,
    pub operation: ProposalOperation,
    pub before: Option<String>,
    pub after: String,
    pub diff: String,
}

// =============================================================================
// Scan Result
// =============================================================================

/// How a target's content was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStrategy {
    /// Model rewrite
    Llm,
    /// Deterministic template
    Template,
    /// Existing content returned unchanged
    Preserved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetOutcome {
    #[serde(rename = "type")]
    pub target_type: String,
    pub output_path: String,
    pub strategy: GenerationStrategy,
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub scan_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub digest_available: bool,
    pub chars_read: usize,
    pub truncated_files: usize,
    pub targets: Vec<TargetOutcome>,
}

/// Everything a scan produces; the caller owns persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub repo_summary: RepoSummary,
    pub enabled_targets: Vec<DocTarget>,
    pub files_scanned: usize,
    pub proposals: Vec<ProposalFile>,
    pub model_label: String,
    pub generation_metadata: GenerationMetadata,
}
