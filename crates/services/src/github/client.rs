// GitHub REST API client

use crate::error::UpstreamError;
use mcp_base_core::{keys, ServiceConfig};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const GITHUB_API_BASE: &str = "https://api.github.com";

const SERVICE: &str = "GitHub";
const ACCEPT_JSON: &str = "application/vnd.github.v3+json";
const ACCEPT_DIFF: &str = "application/vnd.github.v3.diff";
const ACCEPT_TIMELINE: &str = "application/vnd.github.mockingbird-preview+json";

/// Authenticated GitHub client, built per call from the configuration object
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, UpstreamError> {
        let token = config.require(keys::GITHUB_TOKEN)?.to_string();
        let base_url = config
            .get(keys::GITHUB_API_URL)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(GITHUB_API_BASE)
            .trim_end_matches('/')
            .to_string();

        let client = Client::builder()
            .user_agent("mcp-base")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(UpstreamError::http(SERVICE))?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn send(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        accept: &str,
    ) -> Result<reqwest::Response, UpstreamError> {
        let url = self.url(endpoint);
        tracing::debug!(url = %url, "GitHub request");

        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, accept)
            .send()
            .await
            .map_err(UpstreamError::http(SERVICE))?;

        if !response.status().is_success() {
            return Err(UpstreamError::from_response(SERVICE, response).await);
        }

        Ok(response)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        accept: &str,
    ) -> Result<T, UpstreamError> {
        self.send(endpoint, query, accept)
            .await?
            .json()
            .await
            .map_err(UpstreamError::http(SERVICE))
    }

    /// Search for repositories
    pub async fn search_repositories(&self, query: &str) -> Result<SearchResult<Repository>, UpstreamError> {
        self.get("/search/repositories", &[("q", query), ("per_page", "10")], ACCEPT_JSON)
            .await
    }

    /// Search for code in a repository
    pub async fn search_code(
        &self,
        repository: &str,
        query: &str,
    ) -> Result<SearchResult<CodeSearchItem>, UpstreamError> {
        let q = format!("{} repo:{}", query, repository);
        self.get("/search/code", &[("q", q.as_str()), ("per_page", "20")], ACCEPT_JSON)
            .await
    }

    pub async fn get_repository(&self, repository: &str) -> Result<Repository, UpstreamError> {
        self.get(&format!("/repos/{}", repository), &[], ACCEPT_JSON).await
    }

    /// Raw contents entry; a file yields an object, a directory an array
    pub async fn get_contents(
        &self,
        repository: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<serde_json::Value, UpstreamError> {
        let endpoint = format!("/repos/{}/contents/{}", repository, path);
        match git_ref {
            Some(git_ref) => self.get(&endpoint, &[("ref", git_ref)], ACCEPT_JSON).await,
            None => self.get(&endpoint, &[], ACCEPT_JSON).await,
        }
    }

    pub async fn list_files(&self, repository: &str, path: &str) -> Result<Vec<FileEntry>, UpstreamError> {
        self.get(&format!("/repos/{}/contents/{}", repository, path), &[], ACCEPT_JSON)
            .await
    }

    pub async fn get_issue(&self, repository: &str, number: u64) -> Result<Issue, UpstreamError> {
        self.get(&format!("/repos/{}/issues/{}", repository, number), &[], ACCEPT_JSON)
            .await
    }

    pub async fn get_issue_timeline(
        &self,
        repository: &str,
        number: u64,
    ) -> Result<Vec<serde_json::Value>, UpstreamError> {
        self.get(
            &format!("/repos/{}/issues/{}/timeline", repository, number),
            &[],
            ACCEPT_TIMELINE,
        )
        .await
    }

    pub async fn get_pull_request(&self, repository: &str, number: u64) -> Result<PullRequest, UpstreamError> {
        self.get(&format!("/repos/{}/pulls/{}", repository, number), &[], ACCEPT_JSON)
            .await
    }

    pub async fn get_pull_request_diff(&self, repository: &str, number: u64) -> Result<String, UpstreamError> {
        self.send(&format!("/repos/{}/pulls/{}", repository, number), &[], ACCEPT_DIFF)
            .await?
            .text()
            .await
            .map_err(UpstreamError::http(SERVICE))
    }

    pub async fn get_commit(&self, repository: &str, sha: &str) -> Result<Commit, UpstreamError> {
        self.get(&format!("/repos/{}/commits/{}", repository, sha), &[], ACCEPT_JSON)
            .await
    }
}

// GitHub API types (only the fields the tools read)

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult<T> {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodeSearchItem {
    pub name: String,
    pub path: String,
    pub html_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub default_branch: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Login {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub user: Login,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignees: Vec<Login>,
    pub created_at: String,
    pub updated_at: String,
    pub html_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub user: Login,
    pub head: BranchRef,
    pub base: BranchRef,
    #[serde(default)]
    pub merged: bool,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changed_files: u64,
    pub html_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub commit: CommitDetail,
    #[serde(default)]
    pub stats: Option<serde_json::Value>,
    #[serde(default)]
    pub files: Vec<CommitFile>,
    pub html_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    pub author: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitFile {
    pub filename: String,
    pub status: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    pub patch: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> ServiceConfig {
        ServiceConfig::new()
            .with(keys::GITHUB_TOKEN, "ghp_test")
            .with(keys::GITHUB_API_URL, format!("{}/", server.uri()))
    }

    #[test]
    fn test_requires_token() {
        let err = GitHubClient::from_config(&ServiceConfig::new()).unwrap_err();
        assert_eq!(err.to_string(), "GITHUB_TOKEN is required");
    }

    #[test]
    fn test_default_base_url() {
        let client =
            GitHubClient::from_config(&ServiceConfig::new().with(keys::GITHUB_TOKEN, "t")).unwrap();
        assert_eq!(client.url("/repos/a/b"), "https://api.github.com/repos/a/b");
    }

    #[tokio::test]
    async fn test_search_sends_auth_and_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/repositories"))
            .and(query_param("q", "axum"))
            .and(query_param("per_page", "10"))
            .and(header("Authorization", "Bearer ghp_test"))
            .and(header("Accept", ACCEPT_JSON))
            .and(header("User-Agent", "mcp-base"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 1,
                "incomplete_results": false,
                "items": [{
                    "name": "axum",
                    "full_name": "tokio-rs/axum",
                    "description": "Web framework",
                    "html_url": "https://github.com/tokio-rs/axum",
                    "stargazers_count": 20000,
                    "language": "Rust"
                }]
            })))
            .mount(&server)
            .await;

        let client = GitHubClient::from_config(&config(&server)).unwrap();
        let result = client.search_repositories("axum").await.unwrap();
        assert_eq!(result.total_count, 1);
        assert_eq!(result.items[0].full_name, "tokio-rs/axum");
    }

    #[tokio::test]
    async fn test_search_code_scopes_to_repository() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/code"))
            .and(query_param("q", "Router repo:tokio-rs/axum"))
            .and(query_param("per_page", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 0,
                "items": []
            })))
            .mount(&server)
            .await;

        let client = GitHubClient::from_config(&config(&server)).unwrap();
        let result = client.search_code("tokio-rs/axum", "Router").await.unwrap();
        assert_eq!(result.total_count, 0);
        assert!(result.items.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/missing/repo"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let client = GitHubClient::from_config(&config(&server)).unwrap();
        let err = client.get_repository("missing/repo").await.unwrap_err();
        assert_eq!(err.to_string(), "GitHub API error (404): Not Found");
    }

    #[tokio::test]
    async fn test_pull_request_diff_uses_diff_media_type() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/o/r/pulls/3"))
            .and(header("Accept", ACCEPT_DIFF))
            .respond_with(ResponseTemplate::new(200).set_body_string("diff --git a/x b/x"))
            .mount(&server)
            .await;

        let client = GitHubClient::from_config(&config(&server)).unwrap();
        let diff = client.get_pull_request_diff("o/r", 3).await.unwrap();
        assert_eq!(diff, "diff --git a/x b/x");
    }
}
