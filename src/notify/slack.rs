// ABOUTME: Chat notifications through the Slack chat.postMessage API.
// ABOUTME: Bearer-token POST with a colored attachment per lifecycle event.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use super::error::{NotifyError, RejectedSnafu, RequestSnafu, ensure_accepted};
use super::{Notice, NotifyChannel};

pub const SLACK_API_URL: &str = "https://slack.com/api/chat.postMessage";

const CHANNEL: &str = "slack";
const FOOTER: &str = "keel";

pub struct SlackChannel {
    client: Client,
    endpoint: String,
    token: SecretString,
    channel: String,
}

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    attachments: [Attachment<'a>; 1],
}

#[derive(Serialize)]
struct Attachment<'a> {
    color: &'a str,
    text: &'a str,
    footer: &'a str,
    ts: i64,
}

/// The API answers 200 even for rejected messages; `ok` carries the verdict.
#[derive(Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackChannel {
    pub fn new(client: Client, token: SecretString, channel: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: SLACK_API_URL.to_string(),
            token,
            channel: channel.into(),
        }
    }

    /// Post somewhere other than the public API.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl NotifyChannel for SlackChannel {
    fn name(&self) -> &'static str {
        CHANNEL
    }

    async fn send(&self, notice: &Notice) -> Result<(), NotifyError> {
        let text = notice.message();
        let body = PostMessage {
            channel: &self.channel,
            attachments: [Attachment {
                color: notice.color(),
                text: &text,
                footer: FOOTER,
                ts: chrono::Utc::now().timestamp(),
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.token.expose_secret())
            .json(&body)
            .send()
            .await
            .context(RequestSnafu { channel: CHANNEL })?;
        let response = ensure_accepted(CHANNEL, response).await?;

        let status = response.status().as_u16();
        let raw = response
            .text()
            .await
            .context(RequestSnafu { channel: CHANNEL })?;
        if let Ok(reply) = serde_json::from_str::<ApiReply>(&raw)
            && !reply.ok
        {
            return RejectedSnafu {
                channel: CHANNEL,
                status,
                body: reply.error.unwrap_or_else(|| raw.clone()),
            }
            .fail();
        }

        tracing::debug!("Slack notification sent to {}", self.channel);
        Ok(())
    }
}
