use crate::api::{GithubApi, TreeEntry};
use crate::config::GithubConfig;
use crate::error::{GithubError, GithubResult};
use async_trait::async_trait;
use reqwest::{header, Method};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reqwest-backed [`GithubApi`] implementation.
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> GithubResult<Self> {
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| {
                GithubError::InvalidConfig(
                    "GITHUB_TOKEN contains characters not allowed in a header".to_string(),
                )
            })?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            header::HeaderValue::from_static("2022-11-28"),
        );

        let http = reqwest::Client::builder()
            .user_agent(concat!("toolbridge-github/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { http, base_url: config.api_url.trim_end_matches('/').to_string() })
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> GithubResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
                .unwrap_or_else(|| {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                });
            return Err(GithubError::Api { status: status.as_u16(), message });
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn repo_path(owner: &str, repo: &str) -> String {
        format!("/repos/{}/{}", urlencoding::encode(owner), urlencoding::encode(repo))
    }
}

/// Percent-encode a path segment-wise, leaving the separators intact.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl GithubApi for GithubClient {
    async fn create_repository(
        &self,
        name: &str,
        description: Option<&str>,
        private: bool,
        auto_init: bool,
    ) -> GithubResult<Value> {
        let mut body = json!({ "name": name, "private": private, "auto_init": auto_init });
        if let Some(description) = description {
            body["description"] = json!(description);
        }
        self.request(Method::POST, "/user/repos", &[], Some(body)).await
    }

    async fn search_repositories(
        &self,
        query: &str,
        per_page: u32,
        page: u32,
    ) -> GithubResult<Value> {
        let params = [
            ("q", query.to_string()),
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ];
        self.request(Method::GET, "/search/repositories", &params, None).await
    }

    async fn get_repository(&self, owner: &str, repo: &str) -> GithubResult<Value> {
        self.request(Method::GET, &Self::repo_path(owner, repo), &[], None).await
    }

    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: Option<&str>,
        labels: &[String],
    ) -> GithubResult<Value> {
        let mut payload = json!({ "title": title });
        if let Some(body) = body {
            payload["body"] = json!(body);
        }
        if !labels.is_empty() {
            payload["labels"] = json!(labels);
        }
        let path = format!("{}/issues", Self::repo_path(owner, repo));
        self.request(Method::POST, &path, &[], Some(payload)).await
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
        let mut payload = json!({ "title": title, "head": head, "base": base });
        if let Some(body) = body {
            payload["body"] = json!(body);
        }
        let path = format!("{}/pulls", Self::repo_path(owner, repo));
        self.request(Method::POST, &path, &[], Some(payload)).await
    }

    async fn list_user_repos(
        &self,
        repo_type: &str,
        sort: &str,
        per_page: u32,
    ) -> GithubResult<Value> {
        let params = [
            ("type", repo_type.to_string()),
            ("sort", sort.to_string()),
            ("per_page", per_page.to_string()),
        ];
        self.request(Method::GET, "/user/repos", &params, None).await
    }

    async fn get_file_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> GithubResult<Value> {
        let url_path =
            format!("{}/contents/{}", Self::repo_path(owner, repo), encode_path(path));
        let params = [("ref", reference.to_string())];
        self.request(Method::GET, &url_path, &params, None).await
    }

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
    ) -> GithubResult<Value> {
        let mut payload =
            json!({ "message": message, "content": content_base64, "branch": branch });
        if let Some(sha) = sha {
            payload["sha"] = json!(sha);
        }
        let url_path =
            format!("{}/contents/{}", Self::repo_path(owner, repo), encode_path(path));
        self.request(Method::PUT, &url_path, &[], Some(payload)).await
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
        let payload = json!({ "message": message, "sha": sha, "branch": branch });
        let url_path =
            format!("{}/contents/{}", Self::repo_path(owner, repo), encode_path(path));
        self.request(Method::DELETE, &url_path, &[], Some(payload)).await
    }

    async fn get_tree(
        &self,
        owner: &str,
        repo: &str,
        tree_sha: &str,
        recursive: bool,
    ) -> GithubResult<Value> {
        let path =
            format!("{}/git/trees/{}", Self::repo_path(owner, repo), encode_path(tree_sha));
        let params: &[(&str, String)] =
            if recursive { &[("recursive", String::from("true"))] } else { &[] };
        self.request(Method::GET, &path, params, None).await
    }

    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        since: Option<&str>,
        per_page: u32,
    ) -> GithubResult<Value> {
        let mut params = vec![("sha", sha.to_string()), ("per_page", per_page.to_string())];
        if let Some(since) = since {
            params.push(("since", since.to_string()));
        }
        let path = format!("{}/commits", Self::repo_path(owner, repo));
        self.request(Method::GET, &path, &params, None).await
    }

    async fn get_commit(&self, owner: &str, repo: &str, reference: &str) -> GithubResult<Value> {
        let path =
            format!("{}/commits/{}", Self::repo_path(owner, repo), encode_path(reference));
        self.request(Method::GET, &path, &[], None).await
    }

    async fn get_ref(&self, owner: &str, repo: &str, reference: &str) -> GithubResult<Value> {
        let path = format!("{}/git/ref/{}", Self::repo_path(owner, repo), encode_path(reference));
        self.request(Method::GET, &path, &[], None).await
    }

    async fn create_ref(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
    ) -> GithubResult<Value> {
        let path = format!("{}/git/refs", Self::repo_path(owner, repo));
        let payload = json!({ "ref": reference, "sha": sha });
        self.request(Method::POST, &path, &[], Some(payload)).await
    }

    async fn update_ref(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
    ) -> GithubResult<Value> {
        let path =
            format!("{}/git/refs/{}", Self::repo_path(owner, repo), encode_path(reference));
        self.request(Method::PATCH, &path, &[], Some(json!({ "sha": sha }))).await
    }

    async fn delete_ref(&self, owner: &str, repo: &str, reference: &str) -> GithubResult<Value> {
        let path =
            format!("{}/git/refs/{}", Self::repo_path(owner, repo), encode_path(reference));
        self.request(Method::DELETE, &path, &[], None).await
    }

    async fn list_branches(&self, owner: &str, repo: &str, per_page: u32) -> GithubResult<Value> {
        let path = format!("{}/branches", Self::repo_path(owner, repo));
        let params = [("per_page", per_page.to_string())];
        self.request(Method::GET, &path, &params, None).await
    }

    async fn compare_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> GithubResult<Value> {
        let path = format!(
            "{}/compare/{}...{}",
            Self::repo_path(owner, repo),
            encode_path(base),
            encode_path(head)
        );
        self.request(Method::GET, &path, &[], None).await
    }

    async fn merge_branch(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
        commit_message: Option<&str>,
    ) -> GithubResult<Value> {
        let mut payload = json!({ "base": base, "head": head });
        if let Some(message) = commit_message {
            payload["commit_message"] = json!(message);
        }
        let path = format!("{}/merges", Self::repo_path(owner, repo));
        self.request(Method::POST, &path, &[], Some(payload)).await
    }

    async fn create_fork(
        &self,
        owner: &str,
        repo: &str,
        organization: Option<&str>,
    ) -> GithubResult<Value> {
        let path = format!("{}/forks", Self::repo_path(owner, repo));
        let payload = organization.map(|org| json!({ "organization": org }));
        self.request(Method::POST, &path, &[], payload).await
    }

    async fn merge_upstream(&self, owner: &str, repo: &str, branch: &str) -> GithubResult<Value> {
        let path = format!("{}/merge-upstream", Self::repo_path(owner, repo));
        self.request(Method::POST, &path, &[], Some(json!({ "branch": branch }))).await
    }

    async fn search_code(&self, query: &str, per_page: u32) -> GithubResult<Value> {
        let params = [("q", query.to_string()), ("per_page", per_page.to_string())];
        self.request(Method::GET, "/search/code", &params, None).await
    }

    async fn get_repository_topics(&self, owner: &str, repo: &str) -> GithubResult<Value> {
        let path = format!("{}/topics", Self::repo_path(owner, repo));
        self.request(Method::GET, &path, &[], None).await
    }

    async fn set_repository_topics(
        &self,
        owner: &str,
        repo: &str,
        names: &[String],
    ) -> GithubResult<Value> {
        let path = format!("{}/topics", Self::repo_path(owner, repo));
        self.request(Method::PUT, &path, &[], Some(json!({ "names": names }))).await
    }

    async fn create_blob(
        &self,
        owner: &str,
        repo: &str,
        content_base64: &str,
    ) -> GithubResult<Value> {
        let path = format!("{}/git/blobs", Self::repo_path(owner, repo));
        let payload = json!({ "content": content_base64, "encoding": "base64" });
        self.request(Method::POST, &path, &[], Some(payload)).await
    }

    async fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        entries: &[TreeEntry],
        base_tree: &str,
    ) -> GithubResult<Value> {
        let path = format!("{}/git/trees", Self::repo_path(owner, repo));
        let payload = json!({ "tree": entries, "base_tree": base_tree });
        self.request(Method::POST, &path, &[], Some(payload)).await
    }

    async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        message: &str,
        tree_sha: &str,
        parents: &[String],
    ) -> GithubResult<Value> {
        let path = format!("{}/git/commits", Self::repo_path(owner, repo));
        let payload = json!({ "message": message, "tree": tree_sha, "parents": parents });
        self.request(Method::POST, &path, &[], Some(payload)).await
    }

    async fn get_git_commit(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> GithubResult<Value> {
        let path =
            format!("{}/git/commits/{}", Self::repo_path(owner, repo), encode_path(commit_sha));
        self.request(Method::GET, &path, &[], None).await
    }

    async fn list_issue_comments(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        per_page: u32,
    ) -> GithubResult<Value> {
        let path = format!("{}/issues/{}/comments", Self::repo_path(owner, repo), issue_number);
        let params = [("per_page", per_page.to_string())];
        self.request(Method::GET, &path, &params, None).await
    }

    async fn create_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> GithubResult<Value> {
        let path = format!("{}/issues/{}/comments", Self::repo_path(owner, repo), issue_number);
        self.request(Method::POST, &path, &[], Some(json!({ "body": body }))).await
    }

    async fn add_issue_labels(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> GithubResult<Value> {
        let path = format!("{}/issues/{}/labels", Self::repo_path(owner, repo), issue_number);
        self.request(Method::POST, &path, &[], Some(json!({ "labels": labels }))).await
    }

    async fn list_workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        workflow_id: Option<&str>,
        status: Option<&str>,
        per_page: u32,
    ) -> GithubResult<Value> {
        let mut params = vec![("per_page", per_page.to_string())];
        if let Some(status) = status {
            params.push(("status", status.to_string()));
        }
        // A workflow id narrows the listing to that workflow's endpoint
        let path = match workflow_id {
            Some(workflow_id) => format!(
                "{}/actions/workflows/{}/runs",
                Self::repo_path(owner, repo),
                urlencoding::encode(workflow_id)
            ),
            None => format!("{}/actions/runs", Self::repo_path(owner, repo)),
        };
        self.request(Method::GET, &path, &params, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> GithubClient {
        let config =
            GithubConfig { token: "test-token".to_string(), api_url: server.base_url() };
        GithubClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn sends_auth_header_and_query_params() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search/repositories")
                .header("authorization", "Bearer test-token")
                .header("accept", "application/vnd.github+json")
                .query_param("q", "rust mcp")
                .query_param("per_page", "30")
                .query_param("page", "1");
            then.status(200).json_body(serde_json::json!({ "total_count": 0, "items": [] }));
        });

        let client = client_for(&server);
        let result = client.search_repositories("rust mcp", 30, 1).await.unwrap();

        mock.assert();
        assert_eq!(result["total_count"], 0);
    }

    #[tokio::test]
    async fn maps_error_bodies_to_api_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/missing");
            then.status(404).json_body(
                serde_json::json!({ "message": "Not Found", "documentation_url": "https://docs.github.com" }),
            );
        });

        let client = client_for(&server);
        let err = client.get_repository("octo", "missing").await.unwrap_err();

        assert_eq!(err.to_string(), "Not Found (HTTP 404)");
    }

    #[tokio::test]
    async fn empty_responses_decode_to_null() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(DELETE).path("/repos/octo/demo/git/refs/heads/stale");
            then.status(204);
        });

        let client = client_for(&server);
        let result = client.delete_ref("octo", "demo", "heads/stale").await.unwrap();

        mock.assert();
        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn encodes_path_segments_but_not_separators() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/repos/octo/demo/contents/src%20dir/main.rs")
                .query_param("ref", "main");
            then.status(200).json_body(serde_json::json!({ "content": "", "sha": "s" }));
        });

        let client = client_for(&server);
        client.get_file_contents("octo", "demo", "src dir/main.rs", "main").await.unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn workflow_id_switches_to_the_per_workflow_endpoint() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/repos/octo/demo/actions/workflows/ci.yml/runs")
                .query_param("per_page", "30")
                .query_param("status", "completed");
            then.status(200).json_body(serde_json::json!({ "total_count": 0, "workflow_runs": [] }));
        });

        let client = client_for(&server);
        client
            .list_workflow_runs("octo", "demo", Some("ci.yml"), Some("completed"), 30)
            .await
            .unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn create_or_update_file_sends_expected_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT).path("/repos/octo/demo/contents/a.txt").json_body(
                serde_json::json!({
                    "message": "Add a.txt",
                    "content": "aGVsbG8=",
                    "branch": "main",
                }),
            );
            then.status(201).json_body(serde_json::json!({ "content": { "sha": "new" } }));
        });

        let client = client_for(&server);
        client
            .create_or_update_file("octo", "demo", "a.txt", "Add a.txt", "aGVsbG8=", "main", None)
            .await
            .unwrap();

        mock.assert();
    }
}
