//! Scripted in-memory backend for dispatcher and workflow tests.
//!
//! Records every call with its arguments so tests can assert ordering, and
//! answers with canned Git object SHAs (`abc123` head, `blobN`, `tree1`,
//! `commit1`) that the workflow tests pin down.

use crate::api::{GithubApi, TreeEntry};
use crate::error::{GithubError, GithubResult};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub struct MockGithub {
    pub calls: Mutex<Vec<(String, Value)>>,
    tree: Vec<Value>,
    commits: Vec<Value>,
    content_errors: HashSet<String>,
    fail_with: Mutex<HashMap<String, String>>,
    blob_counter: AtomicUsize,
    repository: Mutex<Value>,
}

impl MockGithub {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            tree: Vec::new(),
            commits: Vec::new(),
            content_errors: HashSet::new(),
            fail_with: Mutex::new(HashMap::new()),
            blob_counter: AtomicUsize::new(0),
            repository: Mutex::new(json!({ "id": 1, "full_name": "octo/demo" })),
        }
    }

    pub fn with_tree(mut self, entries: Vec<Value>) -> Self {
        self.tree = entries;
        self
    }

    pub fn with_commits(mut self, commits: Vec<Value>) -> Self {
        self.commits = commits;
        self
    }

    pub fn with_content_error(mut self, path: &str) -> Self {
        self.content_errors.insert(path.to_string());
        self
    }

    /// Make one method fail with an HTTP 500 carrying `message`.
    pub fn fail(&self, method: &str, message: &str) {
        self.fail_with.lock().unwrap().insert(method.to_string(), message.to_string());
    }

    pub fn set_repository(&self, repository: Value) {
        *self.repository.lock().unwrap() = repository;
    }

    fn record(&self, method: &str, args: Value) -> GithubResult<()> {
        self.calls.lock().unwrap().push((method.to_string(), args));
        if let Some(message) = self.fail_with.lock().unwrap().get(method) {
            return Err(GithubError::Api { status: 500, message: message.clone() });
        }
        Ok(())
    }
}

#[async_trait]
impl GithubApi for MockGithub {
    async fn create_repository(
        &self,
        name: &str,
        description: Option<&str>,
        private: bool,
        auto_init: bool,
    ) -> GithubResult<Value> {
        self.record(
            "create_repository",
            json!({
                "name": name,
                "description": description,
                "private": private,
                "auto_init": auto_init,
            }),
        )?;
        Ok(json!({ "id": 1, "name": name }))
    }

    async fn search_repositories(
        &self,
        query: &str,
        per_page: u32,
        page: u32,
    ) -> GithubResult<Value> {
        self.record(
            "search_repositories",
            json!({ "query": query, "per_page": per_page, "page": page }),
        )?;
        Ok(json!({ "total_count": 0, "items": [] }))
    }

    async fn get_repository(&self, owner: &str, repo: &str) -> GithubResult<Value> {
        self.record("get_repository", json!({ "owner": owner, "repo": repo }))?;
        Ok(self.repository.lock().unwrap().clone())
    }

    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: Option<&str>,
        labels: &[String],
    ) -> GithubResult<Value> {
        self.record(
            "create_issue",
            json!({
                "owner": owner,
                "repo": repo,
                "title": title,
                "body": body,
                "labels": labels,
            }),
        )?;
        Ok(json!({ "number": 1 }))
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        head: &str,
        base: &str,
        body: Option<&str>,
    ) -> GithubResult<Value> {
        self.record(
            "create_pull_request",
            json!({
                "owner": owner,
                "repo": repo,
                "title": title,
                "head": head,
                "base": base,
                "body": body,
            }),
        )?;
        Ok(json!({ "number": 1 }))
    }

    async fn list_user_repos(
        &self,
        repo_type: &str,
        sort: &str,
        per_page: u32,
    ) -> GithubResult<Value> {
        self.record(
            "list_user_repos",
            json!({ "type": repo_type, "sort": sort, "per_page": per_page }),
        )?;
        Ok(json!([]))
    }

    async fn get_file_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> GithubResult<Value> {
        self.record(
            "get_file_contents",
            json!({ "owner": owner, "repo": repo, "path": path, "ref": reference }),
        )?;
        if self.content_errors.contains(path) {
            return Err(GithubError::Api { status: 404, message: "Not Found".to_string() });
        }
        Ok(json!({
            "path": path,
            "sha": format!("sha-{}", path),
            "content": BASE64.encode(format!("contents of {}", path)),
            "encoding": "base64",
        }))
    }

    async fn create_or_update_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        message: &str,
        content_base64: &str,
        branch: &str,
        sha: Option<&str>,
    ) -> GithubResult<Value> {
        self.record(
            "create_or_update_file",
            json!({
                "owner": owner,
                "repo": repo,
                "path": path,
                "message": message,
                "content": content_base64,
                "branch": branch,
                "sha": sha,
            }),
        )?;
        Ok(json!({ "content": { "path": path } }))
    }

    async fn delete_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        message: &str,
        sha: &str,
        branch: &str,
    ) -> GithubResult<Value> {
        self.record(
            "delete_file",
            json!({
                "owner": owner,
                "repo": repo,
                "path": path,
                "message": message,
                "sha": sha,
                "branch": branch,
            }),
        )?;
        Ok(json!({ "commit": { "sha": "del1" } }))
    }

    async fn get_tree(
        &self,
        owner: &str,
        repo: &str,
        tree_sha: &str,
        recursive: bool,
    ) -> GithubResult<Value> {
        self.record(
            "get_tree",
            json!({ "owner": owner, "repo": repo, "tree_sha": tree_sha, "recursive": recursive }),
        )?;
        Ok(json!({ "sha": "tree-root", "tree": self.tree, "truncated": false }))
    }

    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        since: Option<&str>,
        per_page: u32,
    ) -> GithubResult<Value> {
        self.record(
            "list_commits",
            json!({
                "owner": owner,
                "repo": repo,
                "sha": sha,
                "since": since,
                "per_page": per_page,
            }),
        )?;
        Ok(Value::Array(self.commits.clone()))
    }

    async fn get_commit(&self, owner: &str, repo: &str, reference: &str) -> GithubResult<Value> {
        self.record(
            "get_commit",
            json!({ "owner": owner, "repo": repo, "reference": reference }),
        )?;
        Ok(json!({
            "sha": reference,
            "files": [
                { "filename": "src/lib.rs", "status": "modified", "additions": 1, "deletions": 0 }
            ],
        }))
    }

    async fn get_ref(&self, owner: &str, repo: &str, reference: &str) -> GithubResult<Value> {
        self.record("get_ref", json!({ "owner": owner, "repo": repo, "ref": reference }))?;
        Ok(json!({ "ref": format!("refs/{}", reference), "object": { "sha": "abc123" } }))
    }

    async fn create_ref(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
    ) -> GithubResult<Value> {
        self.record(
            "create_ref",
            json!({ "owner": owner, "repo": repo, "ref": reference, "sha": sha }),
        )?;
        Ok(json!({ "ref": reference, "object": { "sha": sha } }))
    }

    async fn update_ref(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
    ) -> GithubResult<Value> {
        self.record(
            "update_ref",
            json!({ "owner": owner, "repo": repo, "ref": reference, "sha": sha }),
        )?;
        Ok(json!({ "ref": format!("refs/{}", reference), "object": { "sha": sha } }))
    }

    async fn delete_ref(&self, owner: &str, repo: &str, reference: &str) -> GithubResult<Value> {
        self.record("delete_ref", json!({ "owner": owner, "repo": repo, "ref": reference }))?;
        Ok(Value::Null)
    }

    async fn list_branches(&self, owner: &str, repo: &str, per_page: u32) -> GithubResult<Value> {
        self.record(
            "list_branches",
            json!({ "owner": owner, "repo": repo, "per_page": per_page }),
        )?;
        Ok(json!([]))
    }

    async fn compare_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> GithubResult<Value> {
        self.record(
            "compare_commits",
            json!({ "owner": owner, "repo": repo, "base": base, "head": head }),
        )?;
        Ok(json!({ "status": "ahead", "files": [] }))
    }

    async fn merge_branch(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
        commit_message: Option<&str>,
    ) -> GithubResult<Value> {
        self.record(
            "merge_branch",
            json!({
                "owner": owner,
                "repo": repo,
                "base": base,
                "head": head,
                "commit_message": commit_message,
            }),
        )?;
        Ok(json!({ "sha": "merge1" }))
    }

    async fn create_fork(
        &self,
        owner: &str,
        repo: &str,
        organization: Option<&str>,
    ) -> GithubResult<Value> {
        self.record(
            "create_fork",
            json!({ "owner": owner, "repo": repo, "organization": organization }),
        )?;
        Ok(json!({ "full_name": "me/demo" }))
    }

    async fn merge_upstream(&self, owner: &str, repo: &str, branch: &str) -> GithubResult<Value> {
        self.record(
            "merge_upstream",
            json!({ "owner": owner, "repo": repo, "branch": branch }),
        )?;
        Ok(json!({ "merge_type": "fast-forward" }))
    }

    async fn search_code(&self, query: &str, per_page: u32) -> GithubResult<Value> {
        self.record("search_code", json!({ "query": query, "per_page": per_page }))?;
        Ok(json!({ "total_count": 0, "items": [] }))
    }

    async fn get_repository_topics(&self, owner: &str, repo: &str) -> GithubResult<Value> {
        self.record("get_repository_topics", json!({ "owner": owner, "repo": repo }))?;
        Ok(json!({ "names": [] }))
    }

    async fn set_repository_topics(
        &self,
        owner: &str,
        repo: &str,
        names: &[String],
    ) -> GithubResult<Value> {
        self.record(
            "set_repository_topics",
            json!({ "owner": owner, "repo": repo, "names": names }),
        )?;
        Ok(json!({ "names": names }))
    }

    async fn create_blob(
        &self,
        owner: &str,
        repo: &str,
        content_base64: &str,
    ) -> GithubResult<Value> {
        self.record(
            "create_blob",
            json!({ "owner": owner, "repo": repo, "content": content_base64 }),
        )?;
        let n = self.blob_counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(json!({ "sha": format!("blob{}", n) }))
    }

    async fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        entries: &[TreeEntry],
        base_tree: &str,
    ) -> GithubResult<Value> {
        self.record(
            "create_tree",
            json!({ "owner": owner, "repo": repo, "tree": entries, "base_tree": base_tree }),
        )?;
        Ok(json!({ "sha": "tree1" }))
    }

    async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        message: &str,
        tree_sha: &str,
        parents: &[String],
    ) -> GithubResult<Value> {
        self.record(
            "create_commit",
            json!({
                "owner": owner,
                "repo": repo,
                "message": message,
                "tree": tree_sha,
                "parents": parents,
            }),
        )?;
        Ok(json!({ "sha": "commit1" }))
    }

    async fn get_git_commit(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> GithubResult<Value> {
        self.record(
            "get_git_commit",
            json!({ "owner": owner, "repo": repo, "commit_sha": commit_sha }),
        )?;
        Ok(json!({ "sha": commit_sha, "tree": { "sha": "tree0" } }))
    }

    async fn list_issue_comments(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        per_page: u32,
    ) -> GithubResult<Value> {
        self.record(
            "list_issue_comments",
            json!({
                "owner": owner,
                "repo": repo,
                "issue_number": issue_number,
                "per_page": per_page,
            }),
        )?;
        Ok(json!([]))
    }

    async fn create_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> GithubResult<Value> {
        self.record(
            "create_issue_comment",
            json!({ "owner": owner, "repo": repo, "issue_number": issue_number, "body": body }),
        )?;
        Ok(json!({ "id": 1 }))
    }

    async fn add_issue_labels(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> GithubResult<Value> {
        self.record(
            "add_issue_labels",
            json!({
                "owner": owner,
                "repo": repo,
                "issue_number": issue_number,
                "labels": labels,
            }),
        )?;
        Ok(json!([]))
    }

    async fn list_workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        workflow_id: Option<&str>,
        status: Option<&str>,
        per_page: u32,
    ) -> GithubResult<Value> {
        self.record(
            "list_workflow_runs",
            json!({
                "owner": owner,
                "repo": repo,
                "workflow_id": workflow_id,
                "status": status,
                "per_page": per_page,
            }),
        )?;
        Ok(json!({ "total_count": 0, "workflow_runs": [] }))
    }
}
