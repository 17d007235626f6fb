//! Repository Summarization
//!
//! Pure derivations over the listing and the read set: top-level layout, API route
//! handlers with their exported HTTP methods, page routes, and the parsed manifest.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use tracing::debug;

use super::classify::basename;
use super::select::is_api_route_handler;
use crate::types::{
    ApiRoute, FetchedFile, PackageManager, PackageManifest, RepoFacts, RepoFile, RepoRef,
    RepoSummary, TopLevelEntry,
};

/// Maximum top-level entries reported
pub const MAX_TOP_LEVEL: usize = 12;

/// Group name for files at the repository root
pub const ROOT_GROUP: &str = "(root)";

const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

static EXPORTED_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export\s+(?:async\s+)?(?:function|const|let|var)\s+(GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS)\b")
        .unwrap()
});

static EXPORT_LIST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"export\s*\{([^}]*)\}").unwrap());

static ENV_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:export\s+)?([A-Z][A-Z0-9_]*)\s*=").unwrap());

/// Top-level layout of the full listing
pub fn summarize(repo: &RepoRef, files: &[RepoFile]) -> RepoSummary {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for file in files {
        let group = match file.path.split_once('/') {
            Some((top, _)) => top,
            None => ROOT_GROUP,
        };
        *counts.entry(group).or_default() += 1;
    }

    let mut top_level: Vec<TopLevelEntry> = counts
        .into_iter()
        .map(|(name, count)| TopLevelEntry {
            name: name.to_string(),
            count,
        })
        .collect();
    // BTreeMap iteration is name-ordered, so ties stay alphabetical
    top_level.sort_by(|a, b| b.count.cmp(&a.count));
    top_level.truncate(MAX_TOP_LEVEL);

    RepoSummary {
        repo_id: repo.repo_id(),
        git_ref: repo.git_ref.clone(),
        total_files: files.len(),
        top_level,
    }
}

/// Facts used by the digest prompt and the templates
pub fn extract_facts(files: &[RepoFile], fetched: &[FetchedFile]) -> RepoFacts {
    let names: BTreeSet<String> = files
        .iter()
        .filter(|f| !f.path.contains('/'))
        .map(|f| f.path.to_lowercase())
        .collect();

    let manifest = fetched
        .iter()
        .find(|f| f.path == "package.json")
        .and_then(|f| parse_manifest(&f.content));

    let mut env_vars = BTreeSet::new();
    for file in fetched.iter().filter(|f| is_env_example(&f.path)) {
        env_vars.extend(parse_env_names(&file.content));
    }

    let facts = RepoFacts {
        api_routes: extract_api_routes(fetched),
        page_routes: extract_page_routes(files),
        manifest,
        package_manager: detect_package_manager(&names),
        has_dockerfile: files.iter().any(|f| basename(&f.path) == "Dockerfile"),
        has_compose: files.iter().any(|f| {
            matches!(
                basename(&f.path),
                "docker-compose.yml" | "docker-compose.yaml" | "compose.yml" | "compose.yaml"
            )
        }),
        has_prisma_schema: files.iter().any(|f| f.path.ends_with("schema.prisma")),
        has_license_file: names
            .iter()
            .any(|n| n == "license" || n.starts_with("license.") || n == "copying"),
        env_example_vars: env_vars.into_iter().collect(),
    };

    debug!(
        "Extracted facts: {} api routes, {} pages, manifest={}",
        facts.api_routes.len(),
        facts.page_routes.len(),
        facts.manifest.is_some()
    );
    facts
}

/// Route handlers in the read set with their exported methods, sorted by path
pub fn extract_api_routes(fetched: &[FetchedFile]) -> Vec<ApiRoute> {
    let mut routes: BTreeMap<String, BTreeSet<&'static str>> = BTreeMap::new();

    for file in fetched.iter().filter(|f| is_api_route_handler(&f.path)) {
        let Some(api_path) = api_path_for(&file.path) else {
            continue;
        };
        let methods = routes.entry(api_path).or_default();
        methods.extend(exported_methods(&file.content));
    }

    routes
        .into_iter()
        .map(|(api_path, methods)| {
            let mut methods: Vec<&str> = methods.into_iter().collect();
            methods.sort_by_key(|m| HTTP_METHODS.iter().position(|known| known == m));
            ApiRoute {
                api_path,
                methods: methods.into_iter().map(String::from).collect(),
            }
        })
        .collect()
}

/// `src/app/api/(admin)/users/[id]/route.ts` -> `/api/users/[id]`
fn api_path_for(path: &str) -> Option<String> {
    let segments: Vec<&str> = path.split('/').collect();
    let api_idx = segments.iter().position(|s| *s == "api")?;
    let dirs = &segments[api_idx..segments.len() - 1];
    let url: Vec<&str> = dirs.iter().copied().filter(|s| !is_route_group(s)).collect();
    Some(format!("/{}", url.join("/")))
}

fn is_route_group(segment: &str) -> bool {
    segment.starts_with('(') && segment.ends_with(')')
}

fn exported_methods(content: &str) -> BTreeSet<&'static str> {
    let mut found = BTreeSet::new();

    for caps in EXPORTED_METHOD.captures_iter(content) {
        if let Some(m) = HTTP_METHODS.iter().find(|m| **m == &caps[1]) {
            found.insert(*m);
        }
    }

    // export { handler as GET, handler as POST }
    for caps in EXPORT_LIST.captures_iter(content) {
        for item in caps[1].split(',') {
            let exported = item.rsplit(" as ").next().unwrap_or(item).trim();
            if let Some(m) = HTTP_METHODS.iter().find(|m| **m == exported) {
                found.insert(*m);
            }
        }
    }

    found
}

/// App-router pages (`app/**/page.tsx`) as URL paths, sorted
pub fn extract_page_routes(files: &[RepoFile]) -> Vec<String> {
    let mut pages = BTreeSet::new();
    for file in files {
        let segments: Vec<&str> = file.path.split('/').collect();
        let Some((last, dirs)) = segments.split_last() else {
            continue;
        };
        if !last.starts_with("page.") {
            continue;
        }
        let Some(app_idx) = dirs.iter().position(|s| *s == "app") else {
            continue;
        };
        let url: Vec<&str> = dirs[app_idx + 1..]
            .iter()
            .copied()
            .filter(|s| !is_route_group(s))
            .collect();
        if url.first() == Some(&"api") {
            continue;
        }
        pages.insert(format!("/{}", url.join("/")));
    }
    pages.into_iter().collect()
}

/// Lenient `package.json` parse; invalid JSON yields `None`
pub fn parse_manifest(content: &str) -> Option<PackageManifest> {
    match serde_json::from_str::<PackageManifest>(content) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            debug!("package.json did not parse: {}", e);
            None
        }
    }
}

fn detect_package_manager(root_names: &BTreeSet<String>) -> PackageManager {
    if root_names.contains("pnpm-lock.yaml") {
        PackageManager::Pnpm
    } else if root_names.contains("yarn.lock") {
        PackageManager::Yarn
    } else if root_names.contains("bun.lockb") || root_names.contains("bun.lock") {
        PackageManager::Bun
    } else {
        PackageManager::Npm
    }
}

fn is_env_example(path: &str) -> bool {
    matches!(
        basename(path),
        ".env.example" | ".env.sample" | ".env.template" | ".env.local.example"
    )
}

fn parse_env_names(content: &str) -> Vec<String> {
    ENV_ASSIGNMENT
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listed(paths: &[&str]) -> Vec<RepoFile> {
        paths.iter().map(|p| RepoFile::new(*p, Some(1), *p)).collect()
    }

    fn fetched(path: &str, content: &str) -> FetchedFile {
        FetchedFile {
            path: path.to_string(),
            content: content.to_string(),
            truncated: false,
        }
    }

    #[test]
    fn test_top_level_counts() {
        let files = listed(&["src/a.ts", "src/b.ts", "docs/x.md", "package.json", "README.md"]);
        let summary = summarize(&RepoRef::new("o", "r", "main"), &files);
        assert_eq!(summary.repo_id, "o/r");
        assert_eq!(summary.total_files, 5);
        assert_eq!(summary.top_level[0], TopLevelEntry { name: ROOT_GROUP.to_string(), count: 2 });
        assert_eq!(summary.top_level[1], TopLevelEntry { name: "src".to_string(), count: 2 });
        assert_eq!(summary.top_level[2].name, "docs");
    }

    #[test]
    fn test_top_level_is_capped() {
        let paths: Vec<String> = (0..20).map(|i| format!("dir{:02}/f.ts", i)).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let summary = summarize(&RepoRef::new("o", "r", "main"), &listed(&refs));
        assert_eq!(summary.top_level.len(), MAX_TOP_LEVEL);
    }

    #[test]
    fn test_api_routes_and_methods() {
        let read = vec![
            fetched(
                "src/app/api/users/[id]/route.ts",
                "export async function GET() {}\nexport async function DELETE() {}\nexport async function GET_ALL() {}",
            ),
            fetched("app/api/(internal)/cron/sync/route.ts", "export const POST = handler;"),
            fetched("app/api/auth/route.ts", "const h = () => {};\nexport { h as GET, h as POST };"),
            fetched("app/users/route.ts", "export function GET() {}"),
        ];
        let routes = extract_api_routes(&read);
        assert_eq!(
            routes,
            vec![
                ApiRoute { api_path: "/api/auth".into(), methods: vec!["GET".into(), "POST".into()] },
                ApiRoute { api_path: "/api/cron/sync".into(), methods: vec!["POST".into()] },
                ApiRoute {
                    api_path: "/api/users/[id]".into(),
                    methods: vec!["GET".into(), "DELETE".into()]
                },
            ]
        );
        assert!(routes[1].is_cron());
    }

    #[test]
    fn test_page_routes() {
        let files = listed(&[
            "app/page.tsx",
            "app/(marketing)/pricing/page.tsx",
            "src/app/dashboard/[id]/page.tsx",
            "app/api/x/route.ts",
            "pages/index.tsx",
        ]);
        assert_eq!(
            extract_page_routes(&files),
            vec!["/", "/dashboard/[id]", "/pricing"]
        );
    }

    #[test]
    fn test_facts_from_listing_and_content() {
        let files = listed(&[
            "package.json",
            "pnpm-lock.yaml",
            "Dockerfile",
            "docker-compose.yml",
            "prisma/schema.prisma",
            "LICENSE",
            ".env.example",
        ]);
        let read = vec![
            fetched(
                "package.json",
                r#"{"name": "demo", "scripts": {"dev": "next dev"}, "dependencies": {"next": "14"}}"#,
            ),
            fetched(".env.example", "# comment\nDATABASE_URL=postgres://\nexport API_KEY=\n"),
        ];
        let facts = extract_facts(&files, &read);
        let manifest = facts.manifest.unwrap();
        assert_eq!(manifest.name.as_deref(), Some("demo"));
        assert!(manifest.has_dependency("next"));
        assert_eq!(facts.package_manager, PackageManager::Pnpm);
        assert!(facts.has_dockerfile && facts.has_compose && facts.has_prisma_schema);
        assert!(facts.has_license_file);
        assert_eq!(facts.env_example_vars, vec!["API_KEY", "DATABASE_URL"]);
    }

    #[test]
    fn test_invalid_manifest_is_none() {
        assert!(parse_manifest("{not json").is_none());
        assert!(parse_manifest(r#"{"scripts": {}}"#).is_some());
    }
}
