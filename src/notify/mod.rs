// ABOUTME: Best-effort deployment notifications fanned out to every configured channel.
// ABOUTME: Channel failures are logged and returned, never propagated into the deployment result.

mod error;
mod event;
mod github;
mod provenance;
mod slack;
mod webhook;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

use crate::config::{ConfigLayer, DeploymentConfig};
use crate::error::Result;

pub use error::NotifyError;
pub use event::{DeploymentEvent, Notice};
pub use github::{GitHubStatusChannel, StatusRequest};
pub use provenance::{DEFAULT_API_URL, Provenance, Repository};
pub use slack::{SLACK_API_URL, SlackChannel};
pub use webhook::{WebhookChannel, WebhookPayload};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A destination for deployment notices.
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, notice: &Notice) -> std::result::Result<(), NotifyError>;
}

/// Dispatches each event to all channels concurrently.
pub struct Notifier {
    application: String,
    environment: String,
    channels: Vec<Box<dyn NotifyChannel>>,
}

impl Notifier {
    /// A notifier with no channels; every event is a no-op.
    pub fn new(application: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            environment: environment.into(),
            channels: Vec::new(),
        }
    }

    /// Enable every channel the configuration and CI environment fully describe.
    pub fn from_config(config: &DeploymentConfig, provenance: Provenance) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let mut notifier = Self::new(
            config.application.to_string(),
            config.environment.to_string(),
        );

        if let Some(slack) = &config.notifications.slack {
            notifier = notifier.with_channel(SlackChannel::new(
                client.clone(),
                slack.token.clone(),
                slack.channel.clone(),
            ));
        }

        if !config.github_token.expose_secret().is_empty() {
            match (&provenance.repository, provenance.deployment_id) {
                (Some(repository), Some(deployment_id)) => {
                    notifier = notifier.with_channel(GitHubStatusChannel::new(
                        client.clone(),
                        config.github_token.clone(),
                        &provenance.api_url,
                        repository.clone(),
                        deployment_id,
                    ));
                }
                _ => tracing::debug!(
                    "No repository or deployment id in environment, skipping deployment status"
                ),
            }
        }

        if let Some(url) = &config.notifications.webhook {
            notifier = notifier.with_channel(WebhookChannel::new(client, url.clone(), provenance));
        }

        Ok(notifier)
    }

    /// Best-effort channels for a layer that failed validation.
    ///
    /// Only the webhook and Slack settings are used, and only when they are
    /// complete and well formed; GitHub statuses need a validated token.
    pub fn from_layer(layer: &ConfigLayer, provenance: Provenance) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let present = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let mut notifier = Self::new(
            present(&layer.application).unwrap_or_else(|| "unknown".to_string()),
            present(&layer.environment).unwrap_or_else(|| "unknown".to_string()),
        );

        if let (Some(token), Some(channel)) =
            (present(&layer.slack_token), present(&layer.slack_channel))
        {
            notifier = notifier.with_channel(SlackChannel::new(
                client.clone(),
                SecretString::from(token),
                channel,
            ));
        }

        if let Some(raw) = present(&layer.notification_webhook) {
            match Url::parse(&raw) {
                Ok(url) => {
                    notifier = notifier.with_channel(WebhookChannel::new(client, url, provenance));
                }
                Err(e) => tracing::debug!("Skipping malformed webhook URL {}: {}", raw, e),
            }
        }

        Ok(notifier)
    }

    pub fn with_channel(mut self, channel: impl NotifyChannel + 'static) -> Self {
        self.channels.push(Box::new(channel));
        self
    }

    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Send `event` everywhere and return the failures for the caller to report.
    pub async fn notify(&self, event: DeploymentEvent) -> Vec<NotifyError> {
        if self.channels.is_empty() {
            return Vec::new();
        }

        let notice = Notice {
            event,
            application: self.application.clone(),
            environment: self.environment.clone(),
        };

        let results = join_all(self.channels.iter().map(|c| c.send(&notice))).await;

        results
            .into_iter()
            .filter_map(|r| r.err())
            .collect()
    }
}
