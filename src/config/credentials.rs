// ABOUTME: Cloud credentials forwarded to the function deployer's tool.
// ABOUTME: Key and secret are only usable as a pair.

use secrecy::{ExposeSecret, SecretString};

#[derive(Debug, Default)]
pub struct CloudCredentials {
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<SecretString>,
}

impl CloudCredentials {
    /// Access key id and secret, only when both are present.
    pub fn key_pair(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.expose_secret())),
            _ => None,
        }
    }
}
