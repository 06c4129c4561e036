// ABOUTME: Error types for deployer operations.
// ABOUTME: Covers configuration, pre-flight, deploy, rollback, and platform selection failures.

use crate::config::Platform;
use crate::process::ProcessError;

/// Errors raised by a deployer. The coordinator turns all of them into failed outcomes.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Configuration(String),

    /// The platform's tool cannot be invoked.
    #[error("{tool} is not available or not configured: {reason}")]
    ToolUnavailable { tool: &'static str, reason: String },

    /// The referenced image, manifest, or config does not resolve.
    #[error("{0}")]
    ArtifactNotFound(String),

    /// The platform action failed.
    #[error("{platform} deployment failed: {message}")]
    Deployment { platform: Platform, message: String },

    /// No previous state could be restored.
    #[error("{platform} rollback failed: {message}")]
    Rollback { platform: Platform, message: String },

    /// The requested platform kind is not known.
    #[error("Unsupported deployment type: {0}")]
    UnsupportedPlatform(String),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    Configuration,
    ToolUnavailable,
    ArtifactNotFound,
    Deployment,
    Rollback,
    UnsupportedPlatform,
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::Configuration(_) => DeployErrorKind::Configuration,
            DeployError::ToolUnavailable { .. } => DeployErrorKind::ToolUnavailable,
            DeployError::ArtifactNotFound(_) => DeployErrorKind::ArtifactNotFound,
            DeployError::Deployment { .. } => DeployErrorKind::Deployment,
            DeployError::Rollback { .. } => DeployErrorKind::Rollback,
            DeployError::UnsupportedPlatform(_) => DeployErrorKind::UnsupportedPlatform,
        }
    }

    pub(crate) fn deployment(platform: Platform, source: ProcessError) -> Self {
        DeployError::Deployment {
            platform,
            message: source.to_string(),
        }
    }

    pub(crate) fn rollback(platform: Platform, message: impl Into<String>) -> Self {
        DeployError::Rollback {
            platform,
            message: message.into(),
        }
    }

    pub(crate) fn tool_unavailable(tool: &'static str, reason: impl ToString) -> Self {
        DeployError::ToolUnavailable {
            tool,
            reason: reason.to_string(),
        }
    }
}

/// Extension trait for converting process errors to deploy errors.
pub trait ProcessErrorExt<T> {
    /// Map a failed platform command to `DeployError::Deployment`.
    fn deploy_step(self, platform: Platform) -> Result<T, DeployError>;

    /// Map a failed platform command to `DeployError::Rollback`.
    fn rollback_step(self, platform: Platform) -> Result<T, DeployError>;
}

impl<T> ProcessErrorExt<T> for Result<T, ProcessError> {
    fn deploy_step(self, platform: Platform) -> Result<T, DeployError> {
        self.map_err(|e| DeployError::deployment(platform, e))
    }

    fn rollback_step(self, platform: Platform) -> Result<T, DeployError> {
        self.map_err(|e| DeployError::rollback(platform, e.to_string()))
    }
}
