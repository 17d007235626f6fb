//! Candidate Selection
//!
//! Ranks the listed files and keeps a bounded read set. Under a hard read budget the
//! manifest, existing docs and API route handlers explain a system better than
//! arbitrary source files, so they are scored first.

use super::classify::{basename, is_doc_like, is_ignored_path, is_probably_text_file};
use crate::constants::score;
use crate::types::{CandidateFile, RepoFile};

/// Top-level directories that usually hold application source
const SOURCE_DIRS: &[&str] = &[
    "src/", "app/", "lib/", "pages/", "components/", "server/", "api/", "packages/", "apps/",
    "prisma/",
];

/// Basenames (lowercase) describing framework setup, schema or runtime environment
const FRAMEWORK_FILES: &[&str] = &[
    "schema.prisma",
    "dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
    ".env.example",
    ".env.sample",
    ".env.template",
    "vercel.json",
    "tsconfig.json",
    "cargo.toml",
    "pyproject.toml",
    "go.mod",
];

/// Basename prefixes (lowercase) of framework config files
const FRAMEWORK_CONFIG_PREFIXES: &[&str] = &[
    "next.config.",
    "vite.config.",
    "nuxt.config.",
    "astro.config.",
    "svelte.config.",
    "tailwind.config.",
    "drizzle.config.",
];

/// Selects the read set under file-count and per-file size budgets
#[derive(Debug, Clone)]
pub struct CandidateSelector {
    max_files: usize,
    max_file_bytes: u64,
}

impl CandidateSelector {
    pub fn new(max_files: usize, max_file_bytes: u64) -> Self {
        Self {
            max_files,
            max_file_bytes,
        }
    }

    /// Filter, score, stable-sort by descending score, and truncate
    pub fn select(&self, files: &[RepoFile]) -> Vec<CandidateFile> {
        let mut candidates: Vec<CandidateFile> = files
            .iter()
            .filter(|f| self.is_readable(f))
            .map(|f| CandidateFile {
                file: f.clone(),
                score: score_path(&f.path),
            })
            .collect();

        // sort_by is stable: equal scores keep discovery order
        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        candidates.truncate(self.max_files);
        candidates
    }

    fn is_readable(&self, file: &RepoFile) -> bool {
        !is_ignored_path(&file.path)
            && is_probably_text_file(&file.path)
            && file.size.is_none_or(|size| size <= self.max_file_bytes)
    }
}

/// Heuristic signal score of a path
pub fn score_path(path: &str) -> i64 {
    let name = basename(path).to_lowercase();
    let mut total = 0;

    if path == "package.json" {
        total += score::PACKAGE_MANIFEST;
    } else if name == "package.json" {
        total += score::PACKAGE_MANIFEST / 4;
    }

    if path.eq_ignore_ascii_case("readme.md") {
        total += score::README;
    } else if name == "readme.md" {
        total += score::README / 4;
    }

    if FRAMEWORK_FILES.contains(&name.as_str())
        || FRAMEWORK_CONFIG_PREFIXES.iter().any(|p| name.starts_with(p))
    {
        total += score::FRAMEWORK_FILE;
    }

    if is_api_route_handler(path) {
        total += score::API_ROUTE;
    }

    if SOURCE_DIRS.iter().any(|dir| path.starts_with(dir)) {
        total += score::SOURCE_DIR;
    }

    if is_doc_like(path) {
        total += score::DOC_EXTENSION;
    }

    total
}

/// `.../api/.../route.<ext>` handler convention
pub fn is_api_route_handler(path: &str) -> bool {
    let segments: Vec<&str> = path.split('/').collect();
    let Some((last, dirs)) = segments.split_last() else {
        return false;
    };
    last.starts_with("route.") && dirs.contains(&"api")
}
