// ABOUTME: Top-level deployment sequence: notify, deploy, verify, roll back, notify.
// ABOUTME: Converts outcomes and verdicts into the fatal errors the CLI reports.

use std::sync::Arc;

use crate::config::DeploymentConfig;
use crate::deploy::{DeploymentCoordinator, DeploymentOutcome};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result, RollbackStatus};
use crate::health::{HealthVerdict, HealthVerifier, MAX_RETRIES_EXCEEDED};
use crate::notify::{DeploymentEvent, Notifier};
use crate::process::CommandRunner;

/// A deployment that shipped and passed health verification.
#[derive(Debug, Clone)]
pub struct DeploymentReport {
    pub outcome: DeploymentOutcome,
    pub health: HealthVerdict,
}

/// Everything one invocation needs, wired once.
pub struct Pipeline {
    config: Arc<DeploymentConfig>,
    coordinator: DeploymentCoordinator,
    verifier: HealthVerifier,
    notifier: Notifier,
}

impl Pipeline {
    pub fn new(
        config: Arc<DeploymentConfig>,
        runner: Arc<dyn CommandRunner>,
        notifier: Notifier,
    ) -> Result<Self> {
        let coordinator = DeploymentCoordinator::new(config.clone(), runner);
        let verifier = HealthVerifier::new(config.health_check.clone())?;
        Ok(Self::from_parts(config, coordinator, verifier, notifier))
    }

    pub fn from_parts(
        config: Arc<DeploymentConfig>,
        coordinator: DeploymentCoordinator,
        verifier: HealthVerifier,
        notifier: Notifier,
    ) -> Self {
        Self {
            config,
            coordinator,
            verifier,
            notifier,
        }
    }

    pub fn coordinator(&self) -> &DeploymentCoordinator {
        &self.coordinator
    }

    /// Run a full deployment.
    ///
    /// A failed health check is fatal even when the rollback restores the
    /// previous version.
    pub async fn execute(&self, diag: &mut Diagnostics) -> Result<DeploymentReport> {
        self.notify(DeploymentEvent::Started, diag).await;

        let result = self.run(diag).await;

        let event = match &result {
            Ok(report) => DeploymentEvent::Succeeded(report.outcome.clone()),
            Err(e) => DeploymentEvent::Failed(e.to_string()),
        };
        self.notify(event, diag).await;

        result
    }

    async fn run(&self, diag: &mut Diagnostics) -> Result<DeploymentReport> {
        tracing::info!(
            "Deploying {} to {} on {}",
            self.config.application,
            self.config.environment,
            self.coordinator.platform()
        );

        let outcome = self.coordinator.deploy(diag).await;
        if !outcome.success {
            let message = outcome
                .error
                .unwrap_or_else(|| "Unknown deployment error".to_string());
            return Err(Error::DeploymentFailed(message));
        }
        tracing::info!("Deployment {} completed", outcome.deployment_id);

        let health = self.verifier.check().await;
        if health.healthy {
            return Ok(DeploymentReport { outcome, health });
        }

        let reason = health
            .error
            .unwrap_or_else(|| MAX_RETRIES_EXCEEDED.to_string());
        let rollback = if self.config.rollback_on_failure {
            tracing::warn!("Health check failed, initiating rollback: {}", reason);
            let restored = self.coordinator.rollback().await;
            if restored.success {
                RollbackStatus::Completed
            } else {
                RollbackStatus::Failed(restored.error.unwrap_or_default())
            }
        } else {
            RollbackStatus::Disabled
        };

        Err(Error::HealthCheckFailed { reason, rollback })
    }

    /// Restore the previous version on request.
    pub async fn rollback(&self) -> Result<DeploymentOutcome> {
        let outcome = self.coordinator.rollback().await;
        if outcome.success {
            Ok(outcome)
        } else {
            Err(Error::RollbackFailed(
                outcome
                    .error
                    .unwrap_or_else(|| "Unknown rollback error".to_string()),
            ))
        }
    }

    async fn notify(&self, event: DeploymentEvent, diag: &mut Diagnostics) {
        for failure in self.notifier.notify(event).await {
            diag.warn(Warning::from(failure));
        }
    }
}
