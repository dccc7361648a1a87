//! Multi-request Git data workflows.
//!
//! These combine several REST calls into one tool invocation: committing a
//! batch of files through the low-level Git database endpoints, snapshotting
//! a whole tree, and expanding a commit list into per-commit file changes.

use crate::api::{GithubApi, TreeEntry};
use crate::tools::{CloneRepositoryArgs, PullChangesArgs, PushFilesArgs};
use anyhow::anyhow;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use futures::future::{join_all, try_join_all};
use serde_json::{json, Value};
use tracing::debug;

/// Pull a string out of a response body, erroring on any missing or
/// non-string node so a malformed reply fails the whole workflow early.
pub(crate) fn require_str(value: &Value, pointer: &str) -> anyhow::Result<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Unexpected response shape: missing {}", pointer))
}

/// Commit several files to a branch in a single commit.
///
/// Runs the Git database sequence: resolve the branch ref, read its commit
/// to get the base tree, upload one blob per file, build the new tree,
/// create the commit, then move the ref. Any failing step aborts the rest;
/// already-created blobs and trees are left behind unreferenced, which is
/// how the Git data API expects dangling objects to be handled (gc server
/// side). The final response is the updated ref.
pub async fn push_files(api: &dyn GithubApi, args: &PushFilesArgs) -> anyhow::Result<Value> {
    let reference = format!("heads/{}", args.branch);

    let head = api.get_ref(&args.owner, &args.repo, &reference).await?;
    let latest_commit_sha = require_str(&head, "/object/sha")?;

    let commit = api.get_git_commit(&args.owner, &args.repo, &latest_commit_sha).await?;
    let base_tree_sha = require_str(&commit, "/tree/sha")?;

    debug!(
        files = args.files.len(),
        branch = %args.branch,
        "uploading blobs on top of {}",
        latest_commit_sha
    );

    let blobs: Vec<TreeEntry> = try_join_all(args.files.iter().map(|file| async move {
        let encoded = BASE64.encode(file.content.as_bytes());
        let blob = api.create_blob(&args.owner, &args.repo, &encoded).await?;
        Ok::<TreeEntry, anyhow::Error>(TreeEntry {
            path: file.path.clone(),
            mode: file.mode.clone(),
            entry_type: "blob".to_string(),
            sha: require_str(&blob, "/sha")?,
        })
    }))
    .await?;

    let tree = api.create_tree(&args.owner, &args.repo, &blobs, &base_tree_sha).await?;
    let tree_sha = require_str(&tree, "/sha")?;

    let new_commit = api
        .create_commit(
            &args.owner,
            &args.repo,
            &args.message,
            &tree_sha,
            &[latest_commit_sha.clone()],
        )
        .await?;
    let new_commit_sha = require_str(&new_commit, "/sha")?;

    Ok(api.update_ref(&args.owner, &args.repo, &reference, &new_commit_sha).await?)
}

/// Fetch every file reachable from a branch, like a shallow `git clone`.
///
/// Lists the tree recursively, keeps the blobs (optionally narrowed to a
/// path prefix), then fetches all contents concurrently. A file that fails
/// to download becomes an `{path, error}` entry instead of failing the
/// whole snapshot.
pub async fn clone_repository(
    api: &dyn GithubApi,
    args: &CloneRepositoryArgs,
) -> anyhow::Result<Value> {
    let tree = api.get_tree(&args.owner, &args.repo, &args.branch, true).await?;

    let mut paths: Vec<String> = tree
        .pointer("/tree")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter(|entry| entry.pointer("/type").and_then(Value::as_str) == Some("blob"))
                .filter_map(|entry| entry.pointer("/path").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if let Some(prefix) = &args.path {
        paths.retain(|path| path.starts_with(prefix.as_str()));
    }

    debug!(files = paths.len(), branch = %args.branch, "downloading repository snapshot");

    let files = join_all(paths.iter().map(|path| async move {
        match api.get_file_contents(&args.owner, &args.repo, path, &args.branch).await {
            Ok(data) => json!({
                "path": path,
                "content": decode_content(&data),
                "sha": data.pointer("/sha").and_then(Value::as_str),
            }),
            Err(e) => json!({ "path": path, "error": e.to_string() }),
        }
    }))
    .await;

    Ok(json!({ "files": files }))
}

/// List commits on a branch and expand each into its changed files.
pub async fn pull_changes(api: &dyn GithubApi, args: &PullChangesArgs) -> anyhow::Result<Value> {
    let commits = api
        .list_commits(&args.owner, &args.repo, &args.branch, args.since.as_deref(), 100)
        .await?;

    let commit_list = commits.as_array().cloned().unwrap_or_default();

    let changes = try_join_all(commit_list.iter().map(|commit| async move {
        let sha = require_str(commit, "/sha")?;
        let detail = api.get_commit(&args.owner, &args.repo, &sha).await?;

        let files: Vec<Value> = detail
            .pointer("/files")
            .and_then(Value::as_array)
            .map(|files| {
                files
                    .iter()
                    .map(|file| {
                        json!({
                            "path": file.pointer("/filename").and_then(Value::as_str),
                            "status": file.pointer("/status").and_then(Value::as_str),
                            "additions": file.pointer("/additions"),
                            "deletions": file.pointer("/deletions"),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok::<Value, anyhow::Error>(json!({
            "sha": sha,
            "message": commit.pointer("/commit/message"),
            "author": commit.pointer("/commit/author/name"),
            "date": commit.pointer("/commit/author/date"),
            "files": files,
        }))
    }))
    .await?;

    Ok(json!({ "commits": changes }))
}

/// Contents responses carry base64 with embedded newlines; strip the
/// whitespace before decoding and treat the result as UTF-8 text.
fn decode_content(data: &Value) -> String {
    let raw = data.pointer("/content").and_then(Value::as_str).unwrap_or_default();
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    match BASE64.decode(compact.as_bytes()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => raw.to_string(),
    }
}
