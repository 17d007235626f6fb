//! GitHub REST Host
//!
//! Repository access through GitHub's REST v3 API:
//! `git/trees/{ref}?recursive=1`, `git/blobs/{sha}` and `contents/{path}?ref=`.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::RepoHost;
use crate::config::HostConfig;
use crate::types::{DriftError, FileAtRef, RepoFile, RepoRef, Result};

const API_VERSION: &str = "2022-11-28";

/// GitHub API client with secure token handling
pub struct GitHubHost {
    /// Token stored securely - never exposed in logs or debug output
    token: Option<SecretString>,
    api_base: Url,
    client: reqwest::Client,
}

impl std::fmt::Debug for GitHubHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubHost")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base.as_str())
            .finish()
    }
}

impl GitHubHost {
    pub fn new(config: &HostConfig) -> Result<Self> {
        let token = config
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);

        let mut api_base = Url::parse(&config.api_base).map_err(|e| {
            DriftError::Config(format!("Invalid host api_base '{}': {}", config.api_base, e))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(DriftError::Config(format!(
                "Host api_base '{}' cannot be used as a base URL",
                config.api_base
            )));
        }
        // Url::join-free path building below expects no trailing slash
        let trimmed = api_base.path().trim_end_matches('/').to_string();
        api_base.set_path(&trimmed);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DriftError::HostTransport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            token,
            api_base,
            client,
        })
    }

    /// `{api_base}/repos/{owner}/{repo}/{segments...}` with each segment percent-encoded
    fn repo_url<'s>(&self, repo: &RepoRef, segments: impl IntoIterator<Item = &'s str>) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("repos")
                .push(&repo.owner)
                .push(&repo.repo)
                .extend(segments);
        }
        url
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }
        request
            .send()
            .await
            .map_err(|e| DriftError::HostTransport(e.to_string()))
    }

    async fn error_from(response: reqwest::Response, resource: String) -> DriftError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or(body);
        DriftError::Host {
            status,
            resource,
            message,
        }
    }

    async fn json<T: for<'de> Deserialize<'de>>(response: reqwest::Response, resource: &str) -> Result<T> {
        response.json().await.map_err(|e| DriftError::HostPayload {
            resource: resource.to_string(),
            message: e.to_string(),
        })
    }
}

/// Decode GitHub's line-wrapped base64 payloads
fn decode_base64(content: &str, resource: &str) -> Result<Vec<u8>> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64
        .decode(compact.as_bytes())
        .map_err(|e| DriftError::HostPayload {
            resource: resource.to_string(),
            message: format!("invalid base64 content: {}", e),
        })
}

#[async_trait]
impl RepoHost for GitHubHost {
    async fn list_tree(&self, repo: &RepoRef) -> Result<Vec<RepoFile>> {
        let mut url = self.repo_url(repo, ["git", "trees", repo.git_ref.as_str()]);
        url.query_pairs_mut().append_pair("recursive", "1");
        let resource = format!("tree {}", repo);

        debug!("Listing tree for {}", repo);
        let response = self.get(url).await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response, resource).await);
        }

        let tree: TreeResponse = Self::json(response, &resource).await?;
        if tree.truncated {
            warn!(
                "Tree listing for {} was truncated by the host; scanning {} entries",
                repo,
                tree.tree.len()
            );
        }

        Ok(tree
            .tree
            .into_iter()
            .filter(|entry| entry.entry_type == "blob")
            .map(|entry| RepoFile::new(entry.path, entry.size, entry.sha))
            .collect())
    }

    async fn get_blob(&self, repo: &RepoRef, handle: &str) -> Result<Vec<u8>> {
        let url = self.repo_url(repo, ["git", "blobs", handle]);
        let resource = format!("blob {} in {}", handle, repo.repo_id());

        let response = self.get(url).await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response, resource).await);
        }

        let blob: BlobResponse = Self::json(response, &resource).await?;
        match blob.encoding.as_str() {
            "base64" => decode_base64(&blob.content, &resource),
            "utf-8" | "utf8" => Ok(blob.content.into_bytes()),
            other => Err(DriftError::HostPayload {
                resource,
                message: format!("unsupported blob encoding '{}'", other),
            }),
        }
    }

    async fn get_file_at_ref(&self, repo: &RepoRef, path: &str) -> Result<FileAtRef> {
        let mut segments = vec!["contents"];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        let mut url = self.repo_url(repo, segments);
        url.query_pairs_mut().append_pair("ref", &repo.git_ref);
        let resource = format!("{} in {}", path, repo);

        let response = self.get(url).await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(FileAtRef::missing());
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response, resource).await);
        }

        // Directories come back as arrays; they are not files
        let body: serde_json::Value = Self::json(response, &resource).await?;
        let Ok(file) = serde_json::from_value::<ContentsResponse>(body) else {
            return Ok(FileAtRef::missing());
        };
        if file.entry_type != "file" {
            return Ok(FileAtRef::missing());
        }

        let bytes = decode_base64(&file.content, &resource)?;
        Ok(FileAtRef::found(String::from_utf8_lossy(&bytes)))
    }

    fn name(&self) -> &str {
        "github"
    }
}

// Response types

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    entry_type: String,
    sha: String,
    size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    content: String,
    encoding: String,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(rename = "type")]
    entry_type: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn host_for(server: &MockServer, token: Option<&str>) -> GitHubHost {
        GitHubHost::new(&HostConfig {
            api_base: server.uri(),
            token: token.map(String::from),
            ..HostConfig::default()
        })
        .unwrap()
    }

    fn repo() -> RepoRef {
        RepoRef::new("octo", "widgets", "main")
    }

    #[tokio::test]
    async fn test_list_tree_keeps_blobs_only() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/git/trees/main"))
            .and(query_param("recursive", "1"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sha": "abc",
                "truncated": false,
                "tree": [
                    {"path": "src", "type": "tree", "sha": "t1"},
                    {"path": "src/index.ts", "type": "blob", "sha": "b1", "size": 42},
                    {"path": "README.md", "type": "blob", "sha": "b2", "size": 7}
                ]
            })))
            .mount(&server)
            .await;

        let files = host_for(&server, Some("secret-token"))
            .list_tree(&repo())
            .await
            .unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0], RepoFile::new("src/index.ts", Some(42), "b1"));
    }

    #[tokio::test]
    async fn test_list_tree_propagates_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/git/trees/main"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "Not Found"})),
            )
            .mount(&server)
            .await;

        let err = host_for(&server, None).list_tree(&repo()).await.unwrap_err();
        match err {
            DriftError::Host { status, message, .. } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not Found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_get_blob_decodes_wrapped_base64() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/git/blobs/b1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": "aGVsbG8g\nd29ybGQ=\n",
                "encoding": "base64"
            })))
            .mount(&server)
            .await;

        let bytes = host_for(&server, None).get_blob(&repo(), "b1").await.unwrap();
        assert_eq!(bytes, b"hello world");
    }

    #[tokio::test]
    async fn test_get_file_at_ref() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/contents/docs/guide.md"))
            .and(query_param("ref", "main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "type": "file",
                "content": "IyBHdWlkZQ==",
                "encoding": "base64"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/contents/missing.md"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let host = host_for(&server, None);
        let found = host.get_file_at_ref(&repo(), "docs/guide.md").await.unwrap();
        assert_eq!(found, FileAtRef::found("# Guide"));

        let missing = host.get_file_at_ref(&repo(), "missing.md").await.unwrap();
        assert!(!missing.exists);
    }

    #[test]
    fn test_debug_redacts_token() {
        let host = GitHubHost::new(&HostConfig {
            token: Some("ghp_supersecret".to_string()),
            ..HostConfig::default()
        })
        .unwrap();
        let debug = format!("{:?}", host);
        assert!(!debug.contains("ghp_supersecret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
