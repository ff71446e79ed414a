use serde::{Deserialize, Serialize};

use crate::domain::branch::short_branch_name;
use crate::error::Result;

/// A single commit carried by a push notification
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Commit {
    #[serde(rename = "id")]
    pub sha: String,
    pub message: String,
}

impl Commit {
    pub fn new(sha: impl Into<String>, message: impl Into<String>) -> Self {
        Commit {
            sha: sha.into(),
            message: message.into(),
        }
    }

    /// First line of the commit message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }
}

/// Repository metadata attached to a push notification
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RepositoryInfo {
    pub full_name: String,
    pub default_branch: String,
}

impl RepositoryInfo {
    pub fn new(full_name: impl Into<String>, default_branch: impl Into<String>) -> Self {
        RepositoryInfo {
            full_name: full_name.into(),
            default_branch: default_branch.into(),
        }
    }
}

/// One push notification, decoded from a push webhook payload.
///
/// Commits are ordered oldest to newest, as delivered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PushEvent {
    #[serde(rename = "ref")]
    pub reference: String,
    pub repository: RepositoryInfo,
    #[serde(default)]
    pub commits: Vec<Commit>,
    #[serde(rename = "after", default)]
    pub head_commit_sha: String,
}

impl PushEvent {
    pub fn new(
        reference: impl Into<String>,
        repository: RepositoryInfo,
        commits: Vec<Commit>,
        head_commit_sha: impl Into<String>,
    ) -> Self {
        PushEvent {
            reference: reference.into(),
            repository,
            commits,
            head_commit_sha: head_commit_sha.into(),
        }
    }

    /// Decode a push payload from JSON
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Pushed branch without the `refs/heads/` prefix
    pub fn branch(&self) -> &str {
        short_branch_name(&self.reference)
    }

    pub fn default_branch(&self) -> &str {
        &self.repository.default_branch
    }

    /// Commit messages in delivery order
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.commits.iter().map(|c| c.message.as_str())
    }
}
