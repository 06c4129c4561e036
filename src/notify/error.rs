// ABOUTME: Notification channel errors with SNAFU context selectors.
// ABOUTME: Both variants name the channel so the failure can be reported as a warning.

use snafu::Snafu;

/// A single channel failed to deliver a notification.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum NotifyError {
    #[snafu(display("{channel} notification failed: {source}"))]
    Request {
        channel: &'static str,
        source: reqwest::Error,
    },

    #[snafu(display("{channel} notification rejected with HTTP {status}: {body}"))]
    Rejected {
        channel: &'static str,
        status: u16,
        body: String,
    },
}

impl NotifyError {
    pub fn channel(&self) -> &'static str {
        match self {
            NotifyError::Request { channel, .. } | NotifyError::Rejected { channel, .. } => channel,
        }
    }
}

/// Turn a non-2xx response into `NotifyError::Rejected`, keeping the body text.
pub(crate) async fn ensure_accepted(
    channel: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, NotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    RejectedSnafu {
        channel,
        status: status.as_u16(),
        body,
    }
    .fail()
}
