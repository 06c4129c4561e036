// ABOUTME: Generic JSON webhook notifications.
// ABOUTME: Posts a camelCase status payload with timestamp and CI provenance.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde::Serialize;
use snafu::ResultExt;
use url::Url;

use super::error::{NotifyError, RequestSnafu, ensure_accepted};
use super::provenance::{Provenance, Repository};
use super::{Notice, NotifyChannel};

const CHANNEL: &str = "webhook";

pub struct WebhookChannel {
    client: Client,
    url: Url,
    provenance: Provenance,
}

/// Body posted to the webhook.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload<'a> {
    pub status: &'a str,
    pub application: &'a str,
    pub environment: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    pub message: String,
    pub timestamp: String,
    pub repository: Option<&'a Repository>,
    pub commit: Option<&'a str>,
    pub actor: Option<&'a str>,
}

impl WebhookChannel {
    pub fn new(client: Client, url: Url, provenance: Provenance) -> Self {
        Self {
            client,
            url,
            provenance,
        }
    }

    pub fn payload<'a>(&'a self, notice: &'a Notice) -> WebhookPayload<'a> {
        let outcome = notice.outcome();
        WebhookPayload {
            status: notice.status(),
            application: &notice.application,
            environment: &notice.environment,
            deployment_url: outcome.map(|o| o.deployment_url.as_str()),
            deployment_id: outcome.map(|o| o.deployment_id.as_str()),
            error: notice.error(),
            message: notice.message(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            repository: self.provenance.repository.as_ref(),
            commit: self.provenance.commit.as_deref(),
            actor: self.provenance.actor.as_deref(),
        }
    }
}

#[async_trait]
impl NotifyChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        CHANNEL
    }

    async fn send(&self, notice: &Notice) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&self.payload(notice))
            .send()
            .await
            .context(RequestSnafu { channel: CHANNEL })?;
        ensure_accepted(CHANNEL, response).await?;

        tracing::debug!("Webhook notification sent to {}", self.url);
        Ok(())
    }
}
