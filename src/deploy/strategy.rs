// ABOUTME: The Deployer capability contract shared by every platform.
// ABOUTME: Picks the platform implementation once, from the configured artifact.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{DeploymentConfig, Platform};
use crate::process::CommandRunner;

use super::{ClusterDeployer, ContainerDeployer, DeployError, DeploymentOutcome, FunctionDeployer};

/// Platform-specific deployment strategy.
///
/// All platforms expose the same four operations and the same outcome shape,
/// so callers never branch on the platform after construction.
#[async_trait]
pub trait Deployer: Send + Sync {
    /// The platform this deployer drives.
    fn platform(&self) -> Platform;

    /// Pre-flight checks: artifact reference present, tool invocable, artifact resolvable.
    async fn validate(&self) -> Result<(), DeployError>;

    /// Ship the artifact and report where it can be reached.
    async fn deploy(&self) -> Result<DeploymentOutcome, DeployError>;

    /// Restore the previous known-good state.
    async fn rollback(&self) -> Result<DeploymentOutcome, DeployError>;

    /// Advisory cleanup after a deploy. Callers treat failures as warnings.
    async fn post_deploy(&self) -> Result<(), DeployError>;
}

/// Build the deployer for the configured platform.
pub fn deployer_for(
    config: Arc<DeploymentConfig>,
    runner: Arc<dyn CommandRunner>,
) -> Box<dyn Deployer> {
    match config.platform() {
        Platform::Container => Box::new(ContainerDeployer::new(config, runner)),
        Platform::Cluster => Box::new(ClusterDeployer::new(config, runner)),
        Platform::Function => Box::new(FunctionDeployer::new(config, runner)),
    }
}
