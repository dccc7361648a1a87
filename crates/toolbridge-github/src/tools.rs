//! Tool catalog and dispatch for the GitHub server.

use crate::api::GithubApi;
use crate::workflows::{self, require_str};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use toolbridge_mcp::protocol::{
    json_schema_array, json_schema_boolean, json_schema_enum, json_schema_number,
    json_schema_object, json_schema_string, with_default,
};
use toolbridge_mcp::{parse_args, CallToolResult, Tool, ToolCatalog, ToolSet};

fn default_branch() -> String {
    "main".to_string()
}

fn default_per_page() -> u32 {
    30
}

fn default_page() -> u32 {
    1
}

fn default_mode() -> String {
    "100644".to_string()
}

fn default_repo_type() -> String {
    "all".to_string()
}

fn default_sort() -> String {
    "created".to_string()
}

/// Page sizes are clamped into GitHub's accepted 1..=100 range instead of
/// being passed through or rejected.
fn clamp_per_page(value: u32) -> u32 {
    value.clamp(1, 100)
}

fn clamp_page(value: u32) -> u32 {
    value.max(1)
}

#[derive(Debug, Deserialize)]
struct CreateRepositoryArgs {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    auto_init: bool,
}

#[derive(Debug, Deserialize)]
struct SearchRepositoriesArgs {
    query: String,
    #[serde(default = "default_per_page")]
    per_page: u32,
    #[serde(default = "default_page")]
    page: u32,
}

#[derive(Debug, Deserialize)]
struct RepoArgs {
    owner: String,
    repo: String,
}

#[derive(Debug, Deserialize)]
struct CreateIssueArgs {
    owner: String,
    repo: String,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CreatePullRequestArgs {
    owner: String,
    repo: String,
    title: String,
    head: String,
    base: String,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListUserReposArgs {
    #[serde(rename = "type", default = "default_repo_type")]
    repo_type: String,
    #[serde(default = "default_sort")]
    sort: String,
    #[serde(default = "default_per_page")]
    per_page: u32,
}

#[derive(Debug, Deserialize)]
struct GetFileContentsArgs {
    owner: String,
    repo: String,
    path: String,
    #[serde(rename = "ref", default = "default_branch")]
    reference: String,
}

#[derive(Debug, Deserialize)]
struct CreateOrUpdateFileArgs {
    owner: String,
    repo: String,
    path: String,
    message: String,
    content: String,
    #[serde(default = "default_branch")]
    branch: String,
    #[serde(default)]
    sha: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileSpec {
    pub path: String,
    pub content: String,
    #[serde(default = "default_mode")]
    pub mode: String,
}

#[derive(Debug, Deserialize)]
pub struct PushFilesArgs {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    pub message: String,
    pub files: Vec<FileSpec>,
}

#[derive(Debug, Deserialize)]
pub struct CloneRepositoryArgs {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PullChangesArgs {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default)]
    pub since: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateBranchArgs {
    owner: String,
    repo: String,
    branch: String,
    #[serde(default = "default_branch")]
    from_branch: String,
}

#[derive(Debug, Deserialize)]
struct DeleteBranchArgs {
    owner: String,
    repo: String,
    branch: String,
}

#[derive(Debug, Deserialize)]
struct GetCommitsArgs {
    owner: String,
    repo: String,
    #[serde(default = "default_branch")]
    sha: String,
    #[serde(default = "default_per_page")]
    per_page: u32,
}

#[derive(Debug, Deserialize)]
struct GetCommitDiffArgs {
    owner: String,
    repo: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct CompareBranchesArgs {
    owner: String,
    repo: String,
    base: String,
    head: String,
}

#[derive(Debug, Deserialize)]
struct MergeBranchArgs {
    owner: String,
    repo: String,
    base: String,
    head: String,
    #[serde(default)]
    commit_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForkRepositoryArgs {
    owner: String,
    repo: String,
    #[serde(default)]
    organization: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SyncForkArgs {
    owner: String,
    repo: String,
    #[serde(default = "default_branch")]
    branch: String,
}

#[derive(Debug, Deserialize)]
struct DeleteFileArgs {
    owner: String,
    repo: String,
    path: String,
    message: String,
    #[serde(default = "default_branch")]
    branch: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct SearchCodeArgs {
    query: String,
    #[serde(default = "default_per_page")]
    per_page: u32,
}

#[derive(Debug, Deserialize)]
struct SetRepositoryTopicsArgs {
    owner: String,
    repo: String,
    topics: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GetIssueCommentsArgs {
    owner: String,
    repo: String,
    issue_number: u64,
    #[serde(default = "default_per_page")]
    per_page: u32,
}

#[derive(Debug, Deserialize)]
struct CreateIssueCommentArgs {
    owner: String,
    repo: String,
    issue_number: u64,
    body: String,
}

#[derive(Debug, Deserialize)]
struct AddIssueLabelsArgs {
    owner: String,
    repo: String,
    issue_number: u64,
    labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ListWorkflowRunsArgs {
    owner: String,
    repo: String,
    #[serde(default)]
    workflow_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default = "default_per_page")]
    per_page: u32,
}

/// Every tool this server exposes. The catalog is derived from [`Self::ALL`],
/// so a variant missing from either the catalog or the dispatch match cannot
/// slip through unnoticed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GithubTool {
    CreateRepository,
    SearchRepositories,
    GetRepository,
    CreateIssue,
    CreatePullRequest,
    ListUserRepos,
    GetFileContents,
    CreateOrUpdateFile,
    PushFiles,
    CloneRepository,
    PullChanges,
    CreateBranch,
    DeleteBranch,
    ListBranches,
    GetCommits,
    GetCommitDiff,
    CompareBranches,
    MergeBranch,
    ForkRepository,
    SyncFork,
    DeleteFile,
    SearchCode,
    GetRepositoryTopics,
    SetRepositoryTopics,
    GetIssueComments,
    CreateIssueComment,
    AddIssueLabels,
    ListWorkflowRuns,
}

impl GithubTool {
    pub const ALL: [GithubTool; 28] = [
        GithubTool::CreateRepository,
        GithubTool::SearchRepositories,
        GithubTool::GetRepository,
        GithubTool::CreateIssue,
        GithubTool::CreatePullRequest,
        GithubTool::ListUserRepos,
        GithubTool::GetFileContents,
        GithubTool::CreateOrUpdateFile,
        GithubTool::PushFiles,
        GithubTool::CloneRepository,
        GithubTool::PullChanges,
        GithubTool::CreateBranch,
        GithubTool::DeleteBranch,
        GithubTool::ListBranches,
        GithubTool::GetCommits,
        GithubTool::GetCommitDiff,
        GithubTool::CompareBranches,
        GithubTool::MergeBranch,
        GithubTool::ForkRepository,
        GithubTool::SyncFork,
        GithubTool::DeleteFile,
        GithubTool::SearchCode,
        GithubTool::GetRepositoryTopics,
        GithubTool::SetRepositoryTopics,
        GithubTool::GetIssueComments,
        GithubTool::CreateIssueComment,
        GithubTool::AddIssueLabels,
        GithubTool::ListWorkflowRuns,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GithubTool::CreateRepository => "create_repository",
            GithubTool::SearchRepositories => "search_repositories",
            GithubTool::GetRepository => "get_repository",
            GithubTool::CreateIssue => "create_issue",
            GithubTool::CreatePullRequest => "create_pull_request",
            GithubTool::ListUserRepos => "list_user_repos",
            GithubTool::GetFileContents => "get_file_contents",
            GithubTool::CreateOrUpdateFile => "create_or_update_file",
            GithubTool::PushFiles => "push_files",
            GithubTool::CloneRepository => "clone_repository",
            GithubTool::PullChanges => "pull_changes",
            GithubTool::CreateBranch => "create_branch",
            GithubTool::DeleteBranch => "delete_branch",
            GithubTool::ListBranches => "list_branches",
            GithubTool::GetCommits => "get_commits",
            GithubTool::GetCommitDiff => "get_commit_diff",
            GithubTool::CompareBranches => "compare_branches",
            GithubTool::MergeBranch => "merge_branch",
            GithubTool::ForkRepository => "fork_repository",
            GithubTool::SyncFork => "sync_fork",
            GithubTool::DeleteFile => "delete_file",
            GithubTool::SearchCode => "search_code",
            GithubTool::GetRepositoryTopics => "get_repository_topics",
            GithubTool::SetRepositoryTopics => "set_repository_topics",
            GithubTool::GetIssueComments => "get_issue_comments",
            GithubTool::CreateIssueComment => "create_issue_comment",
            GithubTool::AddIssueLabels => "add_issue_labels",
            GithubTool::ListWorkflowRuns => "list_workflow_runs",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().find(|tool| tool.name() == name).copied()
    }

    pub fn descriptor(&self) -> Tool {
        match self {
            GithubTool::CreateRepository => Tool::new(
                self.name(),
                "Create a new GitHub repository",
                json_schema_object(
                    &[
                        ("name", json_schema_string("Repository name")),
                        ("description", json_schema_string("Repository description")),
                        (
                            "private",
                            with_default(
                                json_schema_boolean("Whether the repository should be private"),
                                json!(false),
                            ),
                        ),
                        (
                            "auto_init",
                            with_default(
                                json_schema_boolean("Initialize with README"),
                                json!(false),
                            ),
                        ),
                    ],
                    &["name"],
                ),
            ),
            GithubTool::SearchRepositories => Tool::new(
                self.name(),
                "Search for GitHub repositories",
                json_schema_object(
                    &[
                        ("query", json_schema_string("Search query (GitHub search syntax)")),
                        (
                            "per_page",
                            with_default(
                                json_schema_number("Results per page (max 100)"),
                                json!(30),
                            ),
                        ),
                        ("page", with_default(json_schema_number("Page number"), json!(1))),
                    ],
                    &["query"],
                ),
            ),
            GithubTool::GetRepository => Tool::new(
                self.name(),
                "Get repository details",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                    ],
                    &["owner", "repo"],
                ),
            ),
            GithubTool::CreateIssue => Tool::new(
                self.name(),
                "Create a new issue",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        ("title", json_schema_string("Issue title")),
                        ("body", json_schema_string("Issue body")),
                        (
                            "labels",
                            json_schema_array("Issue labels", json!({ "type": "string" })),
                        ),
                    ],
                    &["owner", "repo", "title"],
                ),
            ),
            GithubTool::CreatePullRequest => Tool::new(
                self.name(),
                "Create a pull request",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        ("title", json_schema_string("PR title")),
                        ("head", json_schema_string("Branch to merge from")),
                        ("base", json_schema_string("Branch to merge into")),
                        ("body", json_schema_string("PR description")),
                    ],
                    &["owner", "repo", "title", "head", "base"],
                ),
            ),
            GithubTool::ListUserRepos => Tool::new(
                self.name(),
                "List repositories for the authenticated user",
                json_schema_object(
                    &[
                        (
                            "type",
                            with_default(
                                json_schema_enum(
                                    "Type of repositories to list",
                                    &["all", "owner", "public", "private", "member"],
                                ),
                                json!("all"),
                            ),
                        ),
                        (
                            "sort",
                            with_default(
                                json_schema_enum(
                                    "Sort order",
                                    &["created", "updated", "pushed", "full_name"],
                                ),
                                json!("created"),
                            ),
                        ),
                        (
                            "per_page",
                            with_default(json_schema_number("Results per page"), json!(30)),
                        ),
                    ],
                    &[],
                ),
            ),
            GithubTool::GetFileContents => Tool::new(
                self.name(),
                "Get contents of a file from a repository",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        ("path", json_schema_string("File path")),
                        (
                            "ref",
                            with_default(
                                json_schema_string("Branch/tag/commit ref"),
                                json!("main"),
                            ),
                        ),
                    ],
                    &["owner", "repo", "path"],
                ),
            ),
            GithubTool::CreateOrUpdateFile => Tool::new(
                self.name(),
                "Create or update a file in a repository",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        ("path", json_schema_string("File path")),
                        ("message", json_schema_string("Commit message")),
                        (
                            "content",
                            json_schema_string("File content (will be base64 encoded)"),
                        ),
                        (
                            "branch",
                            with_default(json_schema_string("Branch name"), json!("main")),
                        ),
                        (
                            "sha",
                            json_schema_string("SHA of file being updated (required for updates)"),
                        ),
                    ],
                    &["owner", "repo", "path", "message", "content"],
                ),
            ),
            GithubTool::PushFiles => Tool::new(
                self.name(),
                "Push multiple files to a repository in a single commit",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        (
                            "branch",
                            with_default(json_schema_string("Branch name"), json!("main")),
                        ),
                        ("message", json_schema_string("Commit message")),
                        (
                            "files",
                            json_schema_array(
                                "Array of files to commit",
                                json!({
                                    "type": "object",
                                    "properties": {
                                        "path": { "type": "string", "description": "File path" },
                                        "content": { "type": "string", "description": "File content" },
                                        "mode": {
                                            "type": "string",
                                            "description": "File mode (100644 for file, 100755 for executable, 040000 for directory)",
                                            "default": "100644",
                                        },
                                    },
                                    "required": ["path", "content"],
                                }),
                            ),
                        ),
                    ],
                    &["owner", "repo", "branch", "message", "files"],
                ),
            ),
            GithubTool::CloneRepository => Tool::new(
                self.name(),
                "Get all files from a repository (similar to git clone)",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        (
                            "branch",
                            with_default(json_schema_string("Branch to clone"), json!("main")),
                        ),
                        ("path", json_schema_string("Path prefix to filter files (optional)")),
                    ],
                    &["owner", "repo"],
                ),
            ),
            GithubTool::PullChanges => Tool::new(
                self.name(),
                "Get latest changes from remote (list of changed files)",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        (
                            "branch",
                            with_default(json_schema_string("Branch name"), json!("main")),
                        ),
                        ("since", json_schema_string("ISO 8601 date to get changes since")),
                    ],
                    &["owner", "repo"],
                ),
            ),
            GithubTool::CreateBranch => Tool::new(
                self.name(),
                "Create a new branch",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        ("branch", json_schema_string("New branch name")),
                        (
                            "from_branch",
                            with_default(json_schema_string("Source branch"), json!("main")),
                        ),
                    ],
                    &["owner", "repo", "branch"],
                ),
            ),
            GithubTool::DeleteBranch => Tool::new(
                self.name(),
                "Delete a branch",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        ("branch", json_schema_string("Branch to delete")),
                    ],
                    &["owner", "repo", "branch"],
                ),
            ),
            GithubTool::ListBranches => Tool::new(
                self.name(),
                "List all branches",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                    ],
                    &["owner", "repo"],
                ),
            ),
            GithubTool::GetCommits => Tool::new(
                self.name(),
                "Get commit history",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        (
                            "sha",
                            with_default(
                                json_schema_string("SHA or branch to list commits from"),
                                json!("main"),
                            ),
                        ),
                        (
                            "per_page",
                            with_default(
                                json_schema_number("Number of commits per page"),
                                json!(30),
                            ),
                        ),
                    ],
                    &["owner", "repo"],
                ),
            ),
            GithubTool::GetCommitDiff => Tool::new(
                self.name(),
                "Get diff for a specific commit",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        ("sha", json_schema_string("Commit SHA")),
                    ],
                    &["owner", "repo", "sha"],
                ),
            ),
            GithubTool::CompareBranches => Tool::new(
                self.name(),
                "Compare two branches",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        ("base", json_schema_string("Base branch")),
                        ("head", json_schema_string("Head branch")),
                    ],
                    &["owner", "repo", "base", "head"],
                ),
            ),
            GithubTool::MergeBranch => Tool::new(
                self.name(),
                "Merge one branch into another",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        ("base", json_schema_string("Base branch to merge into")),
                        ("head", json_schema_string("Head branch to merge from")),
                        ("commit_message", json_schema_string("Merge commit message")),
                    ],
                    &["owner", "repo", "base", "head"],
                ),
            ),
            GithubTool::ForkRepository => Tool::new(
                self.name(),
                "Fork a repository",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        (
                            "organization",
                            json_schema_string("Optional organization to fork to"),
                        ),
                    ],
                    &["owner", "repo"],
                ),
            ),
            GithubTool::SyncFork => Tool::new(
                self.name(),
                "Sync fork with upstream repository",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Fork owner")),
                        ("repo", json_schema_string("Fork repository name")),
                        (
                            "branch",
                            with_default(json_schema_string("Branch to sync"), json!("main")),
                        ),
                    ],
                    &["owner", "repo"],
                ),
            ),
            GithubTool::DeleteFile => Tool::new(
                self.name(),
                "Delete a file from repository",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        ("path", json_schema_string("File path to delete")),
                        ("message", json_schema_string("Commit message")),
                        (
                            "branch",
                            with_default(json_schema_string("Branch name"), json!("main")),
                        ),
                        ("sha", json_schema_string("SHA of file to delete")),
                    ],
                    &["owner", "repo", "path", "message", "sha"],
                ),
            ),
            GithubTool::SearchCode => Tool::new(
                self.name(),
                "Search for code in repositories",
                json_schema_object(
                    &[
                        ("query", json_schema_string("Search query")),
                        (
                            "per_page",
                            with_default(json_schema_number("Results per page"), json!(30)),
                        ),
                    ],
                    &["query"],
                ),
            ),
            GithubTool::GetRepositoryTopics => Tool::new(
                self.name(),
                "Get repository topics/tags",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                    ],
                    &["owner", "repo"],
                ),
            ),
            GithubTool::SetRepositoryTopics => Tool::new(
                self.name(),
                "Set repository topics/tags",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        (
                            "topics",
                            json_schema_array("Array of topics", json!({ "type": "string" })),
                        ),
                    ],
                    &["owner", "repo", "topics"],
                ),
            ),
            GithubTool::GetIssueComments => Tool::new(
                self.name(),
                "Get comments on an issue",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        ("issue_number", json_schema_number("Issue number")),
                        (
                            "per_page",
                            with_default(json_schema_number("Results per page"), json!(30)),
                        ),
                    ],
                    &["owner", "repo", "issue_number"],
                ),
            ),
            GithubTool::CreateIssueComment => Tool::new(
                self.name(),
                "Create a comment on an issue",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        ("issue_number", json_schema_number("Issue number")),
                        ("body", json_schema_string("Comment body")),
                    ],
                    &["owner", "repo", "issue_number", "body"],
                ),
            ),
            GithubTool::AddIssueLabels => Tool::new(
                self.name(),
                "Add labels to an issue",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        ("issue_number", json_schema_number("Issue number")),
                        (
                            "labels",
                            json_schema_array(
                                "Array of label names to add",
                                json!({ "type": "string" }),
                            ),
                        ),
                    ],
                    &["owner", "repo", "issue_number", "labels"],
                ),
            ),
            GithubTool::ListWorkflowRuns => Tool::new(
                self.name(),
                "List workflow runs for a repository",
                json_schema_object(
                    &[
                        ("owner", json_schema_string("Repository owner")),
                        ("repo", json_schema_string("Repository name")),
                        (
                            "workflow_id",
                            json_schema_string("Workflow ID or filename (optional)"),
                        ),
                        (
                            "status",
                            json_schema_enum(
                                "Filter by status",
                                &[
                                    "completed",
                                    "action_required",
                                    "cancelled",
                                    "failure",
                                    "neutral",
                                    "skipped",
                                    "stale",
                                    "success",
                                    "timed_out",
                                    "in_progress",
                                    "queued",
                                    "requested",
                                    "waiting",
                                ],
                            ),
                        ),
                        (
                            "per_page",
                            with_default(json_schema_number("Results per page"), json!(30)),
                        ),
                    ],
                    &["owner", "repo"],
                ),
            ),
        }
    }

    pub async fn execute(
        &self,
        api: &dyn GithubApi,
        arguments: Value,
    ) -> anyhow::Result<CallToolResult> {
        match self {
            GithubTool::CreateRepository => {
                let args: CreateRepositoryArgs = parse_args(arguments)?;
                let result = api
                    .create_repository(
                        &args.name,
                        args.description.as_deref(),
                        args.private,
                        args.auto_init,
                    )
                    .await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::SearchRepositories => {
                let args: SearchRepositoriesArgs = parse_args(arguments)?;
                let result = api
                    .search_repositories(
                        &args.query,
                        clamp_per_page(args.per_page),
                        clamp_page(args.page),
                    )
                    .await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::GetRepository => {
                let args: RepoArgs = parse_args(arguments)?;
                let result = api.get_repository(&args.owner, &args.repo).await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::CreateIssue => {
                let args: CreateIssueArgs = parse_args(arguments)?;
                let result = api
                    .create_issue(
                        &args.owner,
                        &args.repo,
                        &args.title,
                        args.body.as_deref(),
                        &args.labels,
                    )
                    .await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::CreatePullRequest => {
                let args: CreatePullRequestArgs = parse_args(arguments)?;
                let result = api
                    .create_pull_request(
                        &args.owner,
                        &args.repo,
                        &args.title,
                        &args.head,
                        &args.base,
                        args.body.as_deref(),
                    )
                    .await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::ListUserRepos => {
                let args: ListUserReposArgs = parse_args(arguments)?;
                let result = api
                    .list_user_repos(&args.repo_type, &args.sort, clamp_per_page(args.per_page))
                    .await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::GetFileContents => {
                let args: GetFileContentsArgs = parse_args(arguments)?;
                let result = api
                    .get_file_contents(&args.owner, &args.repo, &args.path, &args.reference)
                    .await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::CreateOrUpdateFile => {
                let args: CreateOrUpdateFileArgs = parse_args(arguments)?;
                let encoded = BASE64.encode(args.content.as_bytes());
                let result = api
                    .create_or_update_file(
                        &args.owner,
                        &args.repo,
                        &args.path,
                        &args.message,
                        &encoded,
                        &args.branch,
                        args.sha.as_deref(),
                    )
                    .await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::PushFiles => {
                let args: PushFilesArgs = parse_args(arguments)?;
                let result = workflows::push_files(api, &args).await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::CloneRepository => {
                let args: CloneRepositoryArgs = parse_args(arguments)?;
                let result = workflows::clone_repository(api, &args).await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::PullChanges => {
                let args: PullChangesArgs = parse_args(arguments)?;
                let result = workflows::pull_changes(api, &args).await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::CreateBranch => {
                let args: CreateBranchArgs = parse_args(arguments)?;
                let source = api
                    .get_ref(&args.owner, &args.repo, &format!("heads/{}", args.from_branch))
                    .await?;
                let sha = require_str(&source, "/object/sha")?;
                let result = api
                    .create_ref(
                        &args.owner,
                        &args.repo,
                        &format!("refs/heads/{}", args.branch),
                        &sha,
                    )
                    .await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::DeleteBranch => {
                let args: DeleteBranchArgs = parse_args(arguments)?;
                let result = api
                    .delete_ref(&args.owner, &args.repo, &format!("heads/{}", args.branch))
                    .await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::ListBranches => {
                let args: RepoArgs = parse_args(arguments)?;
                let result = api.list_branches(&args.owner, &args.repo, 100).await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::GetCommits => {
                let args: GetCommitsArgs = parse_args(arguments)?;
                let result = api
                    .list_commits(
                        &args.owner,
                        &args.repo,
                        &args.sha,
                        None,
                        clamp_per_page(args.per_page),
                    )
                    .await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::GetCommitDiff => {
                let args: GetCommitDiffArgs = parse_args(arguments)?;
                let result = api.get_commit(&args.owner, &args.repo, &args.sha).await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::CompareBranches => {
                let args: CompareBranchesArgs = parse_args(arguments)?;
                let result =
                    api.compare_commits(&args.owner, &args.repo, &args.base, &args.head).await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::MergeBranch => {
                let args: MergeBranchArgs = parse_args(arguments)?;
                let result = api
                    .merge_branch(
                        &args.owner,
                        &args.repo,
                        &args.base,
                        &args.head,
                        args.commit_message.as_deref(),
                    )
                    .await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::ForkRepository => {
                let args: ForkRepositoryArgs = parse_args(arguments)?;
                let result = api
                    .create_fork(&args.owner, &args.repo, args.organization.as_deref())
                    .await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::SyncFork => {
                let args: SyncForkArgs = parse_args(arguments)?;
                let repository = api.get_repository(&args.owner, &args.repo).await?;
                if repository.get("parent").map_or(true, Value::is_null) {
                    anyhow::bail!("Repository is not a fork");
                }
                let result = api.merge_upstream(&args.owner, &args.repo, &args.branch).await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::DeleteFile => {
                let args: DeleteFileArgs = parse_args(arguments)?;
                let result = api
                    .delete_file(
                        &args.owner,
                        &args.repo,
                        &args.path,
                        &args.message,
                        &args.sha,
                        &args.branch,
                    )
                    .await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::SearchCode => {
                let args: SearchCodeArgs = parse_args(arguments)?;
                let result =
                    api.search_code(&args.query, clamp_per_page(args.per_page)).await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::GetRepositoryTopics => {
                let args: RepoArgs = parse_args(arguments)?;
                let result = api.get_repository_topics(&args.owner, &args.repo).await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::SetRepositoryTopics => {
                let args: SetRepositoryTopicsArgs = parse_args(arguments)?;
                let result =
                    api.set_repository_topics(&args.owner, &args.repo, &args.topics).await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::GetIssueComments => {
                let args: GetIssueCommentsArgs = parse_args(arguments)?;
                let result = api
                    .list_issue_comments(
                        &args.owner,
                        &args.repo,
                        args.issue_number,
                        clamp_per_page(args.per_page),
                    )
                    .await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::CreateIssueComment => {
                let args: CreateIssueCommentArgs = parse_args(arguments)?;
                let result = api
                    .create_issue_comment(&args.owner, &args.repo, args.issue_number, &args.body)
                    .await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::AddIssueLabels => {
                let args: AddIssueLabelsArgs = parse_args(arguments)?;
                let result = api
                    .add_issue_labels(&args.owner, &args.repo, args.issue_number, &args.labels)
                    .await?;
                Ok(CallToolResult::json(&result))
            }
            GithubTool::ListWorkflowRuns => {
                let args: ListWorkflowRunsArgs = parse_args(arguments)?;
                let result = api
                    .list_workflow_runs(
                        &args.owner,
                        &args.repo,
                        args.workflow_id.as_deref(),
                        args.status.as_deref(),
                        clamp_per_page(args.per_page),
                    )
                    .await?;
                Ok(CallToolResult::json(&result))
            }
        }
    }
}

/// Dispatcher owning the backend handle for the lifetime of the process.
pub struct GithubToolSet {
    catalog: ToolCatalog,
    api: Arc<dyn GithubApi>,
}

impl GithubToolSet {
    pub fn new(api: Arc<dyn GithubApi>) -> Self {
        let catalog =
            ToolCatalog::new(GithubTool::ALL.iter().map(|tool| tool.descriptor()).collect());
        Self { catalog, api }
    }
}

#[async_trait]
impl ToolSet for GithubToolSet {
    fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    async fn call(&self, name: &str, arguments: Value) -> CallToolResult {
        let Some(tool) = GithubTool::from_name(name) else {
            return CallToolResult::error(format!("Unknown tool: {}", name));
        };
        match tool.execute(self.api.as_ref(), arguments).await {
            Ok(result) => result,
            Err(e) => CallToolResult::error(format!("{:#}", e)),
        }
    }
}
