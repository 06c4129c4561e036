// ABOUTME: Opaque per-attempt deployment identifiers.
// ABOUTME: Generated as `{app}-{unixMillis}` for deploys and `rollback-{unixMillis}` for rollbacks.

use chrono::Utc;
use serde::{Serialize, Serializer};
use std::fmt;

use super::ResourceName;

/// Identifier of a single deploy or rollback attempt.
#[must_use = "IDs identify deployment attempts and should not be ignored"]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DeploymentId(String);

impl DeploymentId {
    /// Identifier for a new deployment of `app`.
    pub fn generate(app: &ResourceName) -> Self {
        Self(format!("{}-{}", app, Utc::now().timestamp_millis()))
    }

    /// Identifier for a rollback attempt.
    pub fn rollback() -> Self {
        Self(format!("rollback-{}", Utc::now().timestamp_millis()))
    }

    /// The empty identifier carried by failure outcomes.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for DeploymentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}
