// ABOUTME: Application-wide error types for keel.
// ABOUTME: Uses thiserror; every variant is fatal for the current invocation.

use std::path::PathBuf;
use thiserror::Error;

use crate::deploy::DeployError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Configuration validation failed: {}", join(.0))]
    InvalidConfig(Vec<String>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error("Deployment failed: {0}")]
    DeploymentFailed(String),

    #[error("{}", health_failure(.reason, .rollback))]
    HealthCheckFailed {
        reason: String,
        rollback: RollbackStatus,
    },

    #[error("Rollback failed: {0}")]
    RollbackFailed(String),
}

/// What happened to the rollback after a failed health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackStatus {
    /// Rollback on failure is turned off.
    Disabled,
    /// The previous version was restored.
    Completed,
    /// Rollback was attempted and failed.
    Failed(String),
}

fn join(errors: &[String]) -> String {
    errors.join(", ")
}

fn health_failure(reason: &str, rollback: &RollbackStatus) -> String {
    match rollback {
        RollbackStatus::Disabled => format!("Health check failed: {reason}"),
        RollbackStatus::Completed => {
            format!("Health check failed and rollback completed: {reason}")
        }
        RollbackStatus::Failed(e) => {
            format!("Health check failed: {reason}; rollback failed: {e}")
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
