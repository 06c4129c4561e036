// ABOUTME: Normalized result of a deploy or rollback action.
// ABOUTME: Created fresh by each operation and never mutated afterwards.

use serde::Serialize;

use crate::types::DeploymentId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentOutcome {
    pub success: bool,
    pub deployment_id: DeploymentId,
    pub deployment_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Platform handle for a later rollback, such as the container name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
}

impl DeploymentOutcome {
    pub fn succeeded(deployment_id: DeploymentId, deployment_url: impl Into<String>) -> Self {
        Self {
            success: true,
            deployment_id,
            deployment_url: deployment_url.into(),
            error: None,
            container_name: None,
        }
    }

    /// Failure-shaped outcome: empty identifier and URL.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            deployment_id: DeploymentId::empty(),
            deployment_url: String::new(),
            error: Some(error.into()),
            container_name: None,
        }
    }

    pub fn with_container(self, name: impl Into<String>) -> Self {
        Self {
            container_name: Some(name.into()),
            ..self
        }
    }
}
