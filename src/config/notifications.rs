// ABOUTME: Notification channel settings.
// ABOUTME: Webhook URL and chat credentials; each channel is enabled only when fully configured.

use secrecy::SecretString;
use url::Url;

#[derive(Debug, Default)]
pub struct NotificationConfig {
    pub webhook: Option<Url>,
    pub slack: Option<SlackSettings>,
}

#[derive(Debug)]
pub struct SlackSettings {
    pub token: SecretString,
    pub channel: String,
}
