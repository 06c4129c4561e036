// ABOUTME: Deployment status updates against the GitHub REST API.
// ABOUTME: Needs a repository and a deployment id from the CI environment.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use snafu::ResultExt;

use super::error::{NotifyError, RequestSnafu, ensure_accepted};
use super::provenance::Repository;
use super::{Notice, NotifyChannel};

const CHANNEL: &str = "github";
const USER_AGENT: &str = concat!("keel/", env!("CARGO_PKG_VERSION"));

pub struct GitHubStatusChannel {
    client: Client,
    token: SecretString,
    api_url: String,
    repository: Repository,
    deployment_id: u64,
}

#[derive(Debug, Serialize)]
pub struct StatusRequest<'a> {
    pub state: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_url: Option<&'a str>,
    pub environment: &'a str,
    pub description: String,
}

impl GitHubStatusChannel {
    pub fn new(
        client: Client,
        token: SecretString,
        api_url: &str,
        repository: Repository,
        deployment_id: u64,
    ) -> Self {
        Self {
            client,
            token,
            api_url: api_url.trim_end_matches('/').to_string(),
            repository,
            deployment_id,
        }
    }

    pub fn statuses_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/deployments/{}/statuses",
            self.api_url, self.repository.owner, self.repository.repo, self.deployment_id
        )
    }

    pub fn request<'a>(&self, notice: &'a Notice) -> StatusRequest<'a> {
        let state = notice.deployment_state();
        StatusRequest {
            state,
            environment_url: notice.outcome().map(|o| o.deployment_url.as_str()),
            environment: &notice.environment,
            description: format!("Deployment {} for {}", state, notice.application),
        }
    }
}

#[async_trait]
impl NotifyChannel for GitHubStatusChannel {
    fn name(&self) -> &'static str {
        CHANNEL
    }

    async fn send(&self, notice: &Notice) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.statuses_url())
            .bearer_auth(self.token.expose_secret())
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .json(&self.request(notice))
            .send()
            .await
            .context(RequestSnafu { channel: CHANNEL })?;
        ensure_accepted(CHANNEL, response).await?;

        tracing::debug!(
            "Deployment {} status set to {}",
            self.deployment_id,
            notice.deployment_state()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::DeploymentEvent;

    #[test]
    fn statuses_url_joins_api_base() {
        let channel = GitHubStatusChannel::new(
            Client::new(),
            SecretString::from("t".to_string()),
            "https://github.example.com/api/v3/",
            Repository::parse("acme/shop").unwrap(),
            7,
        );

        assert_eq!(
            channel.statuses_url(),
            "https://github.example.com/api/v3/repos/acme/shop/deployments/7/statuses"
        );
    }

    #[test]
    fn request_describes_state() {
        let channel = GitHubStatusChannel::new(
            Client::new(),
            SecretString::from("t".to_string()),
            "https://api.github.com",
            Repository::parse("acme/shop").unwrap(),
            7,
        );
        let notice = Notice {
            event: DeploymentEvent::Started,
            application: "shop".to_string(),
            environment: "prod".to_string(),
        };

        let request = channel.request(&notice);

        assert_eq!(request.state, "pending");
        assert_eq!(request.description, "Deployment pending for shop");
        assert_eq!(request.environment_url, None);
    }
}
