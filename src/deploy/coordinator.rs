// ABOUTME: Deployment coordinator sequencing validate, deploy, and post-deploy.
// ABOUTME: Normalizes every deployer error into a failed outcome.

use std::sync::Arc;

use crate::config::{DeploymentConfig, Platform};
use crate::diagnostics::{Diagnostics, Warning};
use crate::process::CommandRunner;

use super::{DeployError, Deployer, DeploymentOutcome, deployer_for};

/// Owns the platform deployer for one request.
///
/// The deployer is chosen once at construction; callers only see outcomes.
pub struct DeploymentCoordinator {
    deployer: Box<dyn Deployer>,
}

impl DeploymentCoordinator {
    pub fn new(config: Arc<DeploymentConfig>, runner: Arc<dyn CommandRunner>) -> Self {
        Self::with_deployer(deployer_for(config, runner))
    }

    pub fn with_deployer(deployer: Box<dyn Deployer>) -> Self {
        Self { deployer }
    }

    pub fn platform(&self) -> Platform {
        self.deployer.platform()
    }

    /// Validate, deploy, then run advisory cleanup.
    ///
    /// Cleanup failures are recorded as warnings and never change the outcome.
    pub async fn deploy(&self, diag: &mut Diagnostics) -> DeploymentOutcome {
        match self.try_deploy(diag).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("{} deployment failed: {}", self.platform(), e);
                DeploymentOutcome::failed(e.to_string())
            }
        }
    }

    async fn try_deploy(&self, diag: &mut Diagnostics) -> Result<DeploymentOutcome, DeployError> {
        tracing::info!("Validating {} deployment", self.platform());
        self.deployer.validate().await?;

        tracing::info!("Deploying to {}", self.platform());
        let outcome = self.deployer.deploy().await?;

        if let Err(e) = self.deployer.post_deploy().await {
            diag.warn(Warning::cleanup(format!(
                "Post-deployment cleanup skipped: {}",
                e
            )));
        }

        Ok(outcome)
    }

    /// Restore the previous known-good state.
    pub async fn rollback(&self) -> DeploymentOutcome {
        tracing::info!("Rolling back {} deployment", self.platform());
        match self.deployer.rollback().await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Rollback failed: {}", e);
                DeploymentOutcome::failed(e.to_string())
            }
        }
    }

    /// Run pre-flight checks only.
    pub async fn preflight(&self) -> Result<(), DeployError> {
        self.deployer.validate().await
    }
}
