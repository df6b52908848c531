// GitHub service: repository search, code exploration, issues and pull requests

mod client;

pub use client::{GitHubClient, GITHUB_API_BASE};

use crate::error::UpstreamError;
use crate::{parse_args, tool_descriptors, ToolSet};
use base64::Engine;
use mcp_base_core::{
    json_schema_number, json_schema_object, json_schema_string, keys, ContentItem, ServiceConfig,
    ServiceDescriptor, ToolDescriptor, ToolParams, ToolResult,
};
use serde::Deserialize;
use serde_json::json;

pub const SERVICE_NAME: &str = "github";

/// Timeline events kept in `get_issue` output
const TIMELINE_LIMIT: usize = 50;

pub fn service() -> ServiceDescriptor {
    ServiceDescriptor::new(
        SERVICE_NAME,
        "GitHub repository search, code exploration, issues, and pull requests",
    )
    .with_tools(tool_descriptors::<GitHubTool>())
    .with_config_schema(json_schema_object(
        json!({
            "GITHUB_TOKEN": json_schema_string("GitHub Personal Access Token"),
            "GITHUB_API_URL": json_schema_string("Optional API base URL (GitHub Enterprise)")
        }),
        vec![keys::GITHUB_TOKEN],
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubTool {
    FindRepo,
    SearchCode,
    GetFileContent,
    ListFiles,
    GetRepoInfo,
    GetIssue,
    GetPullRequest,
    GetCommit,
}

fn repository_schema() -> serde_json::Value {
    json_schema_string("Repository in \"owner/repo\" format")
}

#[derive(Debug, Deserialize)]
struct QueryArgs {
    query: String,
}

#[derive(Debug, Deserialize)]
struct SearchCodeArgs {
    repository: String,
    query: String,
}

#[derive(Debug, Deserialize)]
struct FileArgs {
    repository: String,
    path: String,
    #[serde(default, rename = "ref")]
    git_ref: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListFilesArgs {
    repository: String,
    #[serde(default)]
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepositoryArgs {
    repository: String,
}

#[derive(Debug, Deserialize)]
struct IssueArgs {
    repository: String,
    issue_number: u64,
}

#[derive(Debug, Deserialize)]
struct PullRequestArgs {
    repository: String,
    pull_number: u64,
}

#[derive(Debug, Deserialize)]
struct CommitArgs {
    repository: String,
    sha: String,
}

#[async_trait::async_trait]
impl ToolSet for GitHubTool {
    const ALL: &'static [Self] = &[
        Self::FindRepo,
        Self::SearchCode,
        Self::GetFileContent,
        Self::ListFiles,
        Self::GetRepoInfo,
        Self::GetIssue,
        Self::GetPullRequest,
        Self::GetCommit,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::FindRepo => "find_repo",
            Self::SearchCode => "search_code",
            Self::GetFileContent => "get_file_content",
            Self::ListFiles => "list_files",
            Self::GetRepoInfo => "get_repo_info",
            Self::GetIssue => "get_issue",
            Self::GetPullRequest => "get_pull_request",
            Self::GetCommit => "get_commit",
        }
    }

    fn descriptor(self) -> ToolDescriptor {
        let (description, schema) = match self {
            Self::FindRepo => (
                "Search GitHub to find repositories by name or keywords",
                json_schema_object(
                    json!({"query": json_schema_string("Search query for repository name or keywords")}),
                    vec!["query"],
                ),
            ),
            Self::SearchCode => (
                "Search for code within a specific GitHub repository",
                json_schema_object(
                    json!({
                        "repository": repository_schema(),
                        "query": json_schema_string("Code to search for: function names, class names, keywords")
                    }),
                    vec!["repository", "query"],
                ),
            ),
            Self::GetFileContent => (
                "Read the complete source code of a specific file",
                json_schema_object(
                    json!({
                        "repository": repository_schema(),
                        "path": json_schema_string("File path from repository root"),
                        "ref": json_schema_string("Optional branch, tag, or commit SHA")
                    }),
                    vec!["repository", "path"],
                ),
            ),
            Self::ListFiles => (
                "List files and folders in a repository directory",
                json_schema_object(
                    json!({
                        "repository": repository_schema(),
                        "path": {
                            "type": "string",
                            "description": "Directory path (empty for root)",
                            "default": ""
                        }
                    }),
                    vec!["repository"],
                ),
            ),
            Self::GetRepoInfo => (
                "Get metadata about a GitHub repository",
                json_schema_object(json!({"repository": repository_schema()}), vec!["repository"]),
            ),
            Self::GetIssue => (
                "Get detailed information about a GitHub issue with timeline",
                json_schema_object(
                    json!({
                        "repository": repository_schema(),
                        "issue_number": json_schema_number("The issue number")
                    }),
                    vec!["repository", "issue_number"],
                ),
            ),
            Self::GetPullRequest => (
                "Get detailed information about a pull request with diff",
                json_schema_object(
                    json!({
                        "repository": repository_schema(),
                        "pull_number": json_schema_number("The pull request number")
                    }),
                    vec!["repository", "pull_number"],
                ),
            ),
            Self::GetCommit => (
                "Get detailed information about a specific commit",
                json_schema_object(
                    json!({
                        "repository": repository_schema(),
                        "sha": json_schema_string("The commit SHA")
                    }),
                    vec!["repository", "sha"],
                ),
            ),
        };

        ToolDescriptor::new(self.name(), description, schema)
    }

    async fn run(self, params: ToolParams, config: &ServiceConfig) -> Result<ToolResult, UpstreamError> {
        let client = GitHubClient::from_config(config)?;

        match self {
            Self::FindRepo => {
                let args: QueryArgs = parse_args(params)?;
                let result = client.search_repositories(&args.query).await?;
                let repositories: Vec<_> = result
                    .items
                    .iter()
                    .map(|repo| {
                        json!({
                            "full_name": repo.full_name,
                            "description": repo.description,
                            "stars": repo.stargazers_count,
                            "language": repo.language,
                            "url": repo.html_url,
                        })
                    })
                    .collect();

                Ok(ToolResult::json(&json!({
                    "total_count": result.total_count,
                    "repositories": repositories,
                })))
            }
            Self::SearchCode => {
                let args: SearchCodeArgs = parse_args(params)?;
                let result = client.search_code(&args.repository, &args.query).await?;
                let matches: Vec<_> = result
                    .items
                    .iter()
                    .map(|item| json!({"path": item.path, "name": item.name, "url": item.html_url}))
                    .collect();

                Ok(ToolResult::json(&json!({
                    "total_count": result.total_count,
                    "matches": matches,
                })))
            }
            Self::GetFileContent => {
                let args: FileArgs = parse_args(params)?;
                let entry = client
                    .get_contents(&args.repository, &args.path, args.git_ref.as_deref())
                    .await?;
                decode_file_content(&entry).map(ToolResult::success)
            }
            Self::ListFiles => {
                let args: ListFilesArgs = parse_args(params)?;
                let path = args.path.unwrap_or_default();
                let files = client.list_files(&args.repository, &path).await?;
                let files: Vec<_> = files
                    .iter()
                    .map(|f| json!({"name": f.name, "type": f.kind, "path": f.path, "size": f.size}))
                    .collect();

                Ok(ToolResult::json(&files))
            }
            Self::GetRepoInfo => {
                let args: RepositoryArgs = parse_args(params)?;
                let repo = client.get_repository(&args.repository).await?;

                Ok(ToolResult::json(&json!({
                    "name": repo.name,
                    "full_name": repo.full_name,
                    "description": repo.description,
                    "stars": repo.stargazers_count,
                    "forks": repo.forks_count,
                    "language": repo.language,
                    "topics": repo.topics,
                    "default_branch": repo.default_branch,
                    "url": repo.html_url,
                    "created_at": repo.created_at,
                    "updated_at": repo.updated_at,
                })))
            }
            Self::GetIssue => {
                let args: IssueArgs = parse_args(params)?;
                let (issue, mut timeline) = futures::try_join!(
                    client.get_issue(&args.repository, args.issue_number),
                    client.get_issue_timeline(&args.repository, args.issue_number),
                )?;
                timeline.truncate(TIMELINE_LIMIT);

                Ok(ToolResult::json(&json!({
                    "number": issue.number,
                    "title": issue.title,
                    "body": issue.body,
                    "state": issue.state,
                    "author": issue.user.login,
                    "labels": issue.labels.iter().map(|l| l.name.as_str()).collect::<Vec<_>>(),
                    "assignees": issue.assignees.iter().map(|a| a.login.as_str()).collect::<Vec<_>>(),
                    "created_at": issue.created_at,
                    "updated_at": issue.updated_at,
                    "url": issue.html_url,
                    "timeline": timeline,
                })))
            }
            Self::GetPullRequest => {
                let args: PullRequestArgs = parse_args(params)?;
                let (pr, diff) = futures::try_join!(
                    client.get_pull_request(&args.repository, args.pull_number),
                    client.get_pull_request_diff(&args.repository, args.pull_number),
                )?;

                Ok(ToolResult::new(vec![
                    ContentItem::json(&json!({
                        "number": pr.number,
                        "title": pr.title,
                        "body": pr.body,
                        "state": pr.state,
                        "author": pr.user.login,
                        "head": pr.head.name,
                        "base": pr.base.name,
                        "merged": pr.merged,
                        "additions": pr.additions,
                        "deletions": pr.deletions,
                        "changed_files": pr.changed_files,
                        "url": pr.html_url,
                    })),
                    ContentItem::text(format!("\n--- Diff ---\n{}", diff)),
                ]))
            }
            Self::GetCommit => {
                let args: CommitArgs = parse_args(params)?;
                let commit = client.get_commit(&args.repository, &args.sha).await?;
                let files: Vec<_> = commit
                    .files
                    .iter()
                    .map(|f| {
                        json!({
                            "filename": f.filename,
                            "status": f.status,
                            "additions": f.additions,
                            "deletions": f.deletions,
                            "patch": f.patch,
                        })
                    })
                    .collect();

                Ok(ToolResult::json(&json!({
                    "sha": commit.sha,
                    "message": commit.commit.message,
                    "author": commit.commit.author,
                    "stats": commit.stats,
                    "files": files,
                    "url": commit.html_url,
                })))
            }
        }
    }
}

/// Decode a base64 contents entry into text
fn decode_file_content(entry: &serde_json::Value) -> Result<String, UpstreamError> {
    let unavailable = || UpstreamError::Unavailable("File content not available".to_string());

    let content = entry.get("content").and_then(|c| c.as_str()).ok_or_else(unavailable)?;
    if entry.get("encoding").and_then(|e| e.as_str()) != Some("base64") {
        return Err(unavailable());
    }

    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| UpstreamError::Unavailable(format!("File content is not valid base64: {}", e)))?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
