// ABOUTME: CI provenance read from the process environment.
// ABOUTME: Repository, commit, actor, API base, and deployment id for notifications.

use serde::Serialize;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// `owner/repo` split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub owner: String,
    pub repo: String,
}

impl Repository {
    pub fn parse(slug: &str) -> Option<Self> {
        let (owner, repo) = slug.split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

/// Where and by whom the deployment was triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub repository: Option<Repository>,
    pub commit: Option<String>,
    pub actor: Option<String>,
    pub api_url: String,
    pub deployment_id: Option<u64>,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            repository: None,
            commit: None,
            actor: None,
            api_url: DEFAULT_API_URL.to_string(),
            deployment_id: None,
        }
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Provenance {
    /// Read the variables a CI runner exports for every job.
    pub fn from_env() -> Self {
        let deployment_id = var("GITHUB_DEPLOYMENT_ID").and_then(|id| match id.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::debug!("Ignoring non-numeric GITHUB_DEPLOYMENT_ID: {}", id);
                None
            }
        });

        Self {
            repository: var("GITHUB_REPOSITORY").and_then(|slug| Repository::parse(&slug)),
            commit: var("GITHUB_SHA"),
            actor: var("GITHUB_ACTOR"),
            api_url: var("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            deployment_id,
        }
    }
}
