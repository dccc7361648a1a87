use anyhow::{bail, Result};

const DEFAULT_API_URL: &str = "https://api.github.com";

/// Environment-derived settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub token: String,
    pub api_url: String,
}

impl GithubConfig {
    pub fn from_env() -> Result<Self> {
        let token = match std::env::var("GITHUB_TOKEN") {
            Ok(token) if !token.trim().is_empty() => token,
            _ => bail!("GITHUB_TOKEN environment variable is required"),
        };

        let api_url = std::env::var("GITHUB_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self { token, api_url: api_url.trim_end_matches('/').to_string() })
    }
}
