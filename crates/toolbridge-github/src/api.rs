//! Backend seam for the GitHub REST API. Tool handlers and composite
//! workflows only ever talk to this trait, so tests can substitute a
//! recording double for the HTTP client.

use crate::error::GithubResult;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// One entry of a tree about to be created via `POST /git/trees`.
#[derive(Debug, Clone, Serialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub sha: String,
}

/// Typed surface over the GitHub endpoints this server uses. Methods return
/// the raw response body; callers decide how much of it to interpret.
#[async_trait]
pub trait GithubApi: Send + Sync {
    async fn create_repository(
        &self,
        name: &str,
        description: Option<&str>,
        private: bool,
        auto_init: bool,
    ) -> GithubResult<Value>;

    async fn search_repositories(
        &self,
        query: &str,
        per_page: u32,
        page: u32,
    ) -> GithubResult<Value>;

    async fn get_repository(&self, owner: &str, repo: &str) -> GithubResult<Value>;

    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: Option<&str>,
        labels: &[String],
    ) -> GithubResult<Value>;

    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        head: &str,
        base: &str,
        body: Option<&str>,
    ) -> GithubResult<Value>;

    async fn list_user_repos(
        &self,
        repo_type: &str,
        sort: &str,
        per_page: u32,
    ) -> GithubResult<Value>;

    async fn get_file_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> GithubResult<Value>;

    #[allow(clippy::too_many_arguments)]
    async fn create_or_update_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        message: &str,
        content_base64: &str,
        branch: &str,
        sha: Option<&str>,
    ) -> GithubResult<Value>;

    async fn delete_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        message: &str,
        sha: &str,
        branch: &str,
    ) -> GithubResult<Value>;

    /// `GET /git/trees/{tree_sha}`, optionally recursive.
    async fn get_tree(
        &self,
        owner: &str,
        repo: &str,
        tree_sha: &str,
        recursive: bool,
    ) -> GithubResult<Value>;

    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        since: Option<&str>,
        per_page: u32,
    ) -> GithubResult<Value>;

    /// `GET /commits/{ref}`: commit with file-level diff stats.
    async fn get_commit(&self, owner: &str, repo: &str, reference: &str) -> GithubResult<Value>;

    /// `GET /git/ref/{ref}` with a reference like `heads/main`.
    async fn get_ref(&self, owner: &str, repo: &str, reference: &str) -> GithubResult<Value>;

    /// `POST /git/refs` with a fully qualified reference like `refs/heads/x`.
    async fn create_ref(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
    ) -> GithubResult<Value>;

    async fn update_ref(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
    ) -> GithubResult<Value>;

    async fn delete_ref(&self, owner: &str, repo: &str, reference: &str) -> GithubResult<Value>;

    async fn list_branches(&self, owner: &str, repo: &str, per_page: u32) -> GithubResult<Value>;

    async fn compare_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> GithubResult<Value>;

    async fn merge_branch(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
        commit_message: Option<&str>,
    ) -> GithubResult<Value>;

    async fn create_fork(
        &self,
        owner: &str,
        repo: &str,
        organization: Option<&str>,
    ) -> GithubResult<Value>;

    async fn merge_upstream(&self, owner: &str, repo: &str, branch: &str) -> GithubResult<Value>;

    async fn search_code(&self, query: &str, per_page: u32) -> GithubResult<Value>;

    async fn get_repository_topics(&self, owner: &str, repo: &str) -> GithubResult<Value>;

    async fn set_repository_topics(
        &self,
        owner: &str,
        repo: &str,
        names: &[String],
    ) -> GithubResult<Value>;

    /// `POST /git/blobs` with base64-encoded content.
    async fn create_blob(
        &self,
        owner: &str,
        repo: &str,
        content_base64: &str,
    ) -> GithubResult<Value>;

    async fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        entries: &[TreeEntry],
        base_tree: &str,
    ) -> GithubResult<Value>;

    async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        message: &str,
        tree_sha: &str,
        parents: &[String],
    ) -> GithubResult<Value>;

    /// `GET /git/commits/{commit_sha}`: the raw git object, tree SHA included.
    async fn get_git_commit(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> GithubResult<Value>;

    async fn list_issue_comments(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        per_page: u32,
    ) -> GithubResult<Value>;

    async fn create_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> GithubResult<Value>;

    async fn add_issue_labels(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> GithubResult<Value>;

    async fn list_workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        workflow_id: Option<&str>,
        status: Option<&str>,
        per_page: u32,
    ) -> GithubResult<Value>;
}
