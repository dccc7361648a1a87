//! GitHub REST adapter: repository, branch, file, issue and workflow tools,
//! including the composite Git database workflows (multi-file push, tree
//! snapshot, commit fan-out).

pub mod api;
pub mod client;
pub mod config;
pub mod error;
#[cfg(test)]
mod mock;
pub mod tools;
pub mod workflows;

pub use api::{GithubApi, TreeEntry};
pub use client::GithubClient;
pub use config::GithubConfig;
pub use error::{GithubError, GithubResult};
pub use tools::{GithubTool, GithubToolSet};
