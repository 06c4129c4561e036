// ABOUTME: Deployment lifecycle events and the notice rendered for each channel.
// ABOUTME: Maps an event to its status word, chat color, and deployment-status state.

use crate::deploy::DeploymentOutcome;

/// A point in the deployment lifecycle worth telling someone about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentEvent {
    Started,
    Succeeded(DeploymentOutcome),
    Failed(String),
}

/// An event addressed to one application and environment.
#[derive(Debug, Clone)]
pub struct Notice {
    pub event: DeploymentEvent,
    pub application: String,
    pub environment: String,
}

impl Notice {
    /// Status word used in webhook payloads.
    pub fn status(&self) -> &'static str {
        match self.event {
            DeploymentEvent::Started => "started",
            DeploymentEvent::Succeeded(_) => "success",
            DeploymentEvent::Failed(_) => "failed",
        }
    }

    /// Attachment color understood by chat clients.
    pub fn color(&self) -> &'static str {
        match self.event {
            DeploymentEvent::Started => "warning",
            DeploymentEvent::Succeeded(_) => "good",
            DeploymentEvent::Failed(_) => "danger",
        }
    }

    /// State for the source-control deployment status API.
    pub fn deployment_state(&self) -> &'static str {
        match self.event {
            DeploymentEvent::Started => "pending",
            DeploymentEvent::Succeeded(_) => "success",
            DeploymentEvent::Failed(_) => "failure",
        }
    }

    pub fn outcome(&self) -> Option<&DeploymentOutcome> {
        match &self.event {
            DeploymentEvent::Succeeded(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.event {
            DeploymentEvent::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        let (app, env) = (&self.application, &self.environment);
        match &self.event {
            DeploymentEvent::Started => format!("🚀 Deployment started for {app} to {env}"),
            DeploymentEvent::Succeeded(outcome) => format!(
                "✅ Deployment successful for {app} to {env}\nURL: {}",
                outcome.deployment_url
            ),
            DeploymentEvent::Failed(error) => {
                format!("❌ Deployment failed for {app} to {env}\nError: {error}")
            }
        }
    }
}
