// ABOUTME: Container platform deployer driving the docker CLI.
// ABOUTME: Keeps one rollback generation by renaming the running instance to `{app}-{env}-backup`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Artifact, DeploymentConfig, Platform};
use crate::process::{CommandRunner, CommandSpec};
use crate::types::DeploymentId;

use super::error::ProcessErrorExt;
use super::{DeployError, Deployer, DeploymentOutcome};

/// Suffix of the stopped previous instance kept for rollback.
pub const BACKUP_SUFFIX: &str = "-backup";

/// Label marking containers started for an instance name.
pub const INSTANCE_LABEL: &str = "keel.instance";

const PLATFORM: Platform = Platform::Container;

/// Deploys a single container named `{app}-{env}`.
///
/// There is no metadata store: the previous version is found again purely by
/// the backup naming convention, so a rollback works from a fresh process.
pub struct ContainerDeployer {
    config: Arc<DeploymentConfig>,
    runner: Arc<dyn CommandRunner>,
}

fn docker<I, S>(args: I) -> CommandSpec
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    CommandSpec::new("docker", args)
}

impl ContainerDeployer {
    pub fn new(config: Arc<DeploymentConfig>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub fn container_name(&self) -> String {
        self.config.instance_name()
    }

    pub fn backup_name(&self) -> String {
        format!("{}{}", self.container_name(), BACKUP_SUFFIX)
    }

    fn image(&self) -> Result<&str, DeployError> {
        match &self.config.artifact {
            Artifact::Container { image } if !image.trim().is_empty() => Ok(image),
            _ => Err(DeployError::Configuration(
                "Docker image is required for container deployment".to_string(),
            )),
        }
    }

    async fn exists(&self, name: &str) -> bool {
        self.runner
            .run_checked(&docker(["container", "inspect", name]))
            .await
            .is_ok()
    }

    /// Move the running instance aside as the backup and stop it.
    async fn retire_existing(&self, name: &str) {
        if !self.exists(name).await {
            tracing::info!("No existing container {} to stop", name);
            return;
        }

        let backup = self.backup_name();
        // Only one generation is kept; an older backup would block the rename.
        let _ = self
            .runner
            .run(&docker(["rm", "-f", backup.as_str()]))
            .await;

        if let Err(e) = self
            .runner
            .run_checked(&docker(["rename", name, backup.as_str()]))
            .await
        {
            tracing::warn!("Failed to rename {} to {}: {}", name, backup, e);
            return;
        }

        match self
            .runner
            .run_checked(&docker(["stop", backup.as_str()]))
            .await
        {
            Ok(_) => tracing::info!("Previous container kept as {}", backup),
            Err(e) => tracing::warn!("Failed to stop previous container {}: {}", backup, e),
        }
    }
}

#[async_trait]
impl Deployer for ContainerDeployer {
    fn platform(&self) -> Platform {
        PLATFORM
    }

    async fn validate(&self) -> Result<(), DeployError> {
        let image = self.image()?;

        self.runner
            .run_checked(&docker(["--version"]))
            .await
            .map_err(|e| DeployError::tool_unavailable("docker", e))?;

        self.runner
            .run_checked(&docker(["image", "inspect", image]))
            .await
            .map_err(|_| {
                DeployError::ArtifactNotFound(format!("Docker image {} not found or invalid", image))
            })?;

        tracing::info!("Docker image {} validated", image);
        Ok(())
    }

    async fn deploy(&self) -> Result<DeploymentOutcome, DeployError> {
        let image = self.image()?;
        let deployment_id = DeploymentId::generate(&self.config.application);
        let name = self.container_name();

        self.retire_existing(&name).await;

        let label = format!("{}={}", INSTANCE_LABEL, name);
        let ports = self.config.container.port_mapping();
        self.runner
            .run_checked(&docker([
                "run",
                "-d",
                "--name",
                name.as_str(),
                "--restart",
                "unless-stopped",
                "--label",
                label.as_str(),
                "-p",
                ports.as_str(),
                image,
            ]))
            .await
            .deploy_step(PLATFORM)?;

        tracing::info!("Container {} started successfully", name);

        Ok(
            DeploymentOutcome::succeeded(deployment_id, self.config.container.local_url())
                .with_container(name),
        )
    }

    async fn rollback(&self) -> Result<DeploymentOutcome, DeployError> {
        let name = self.container_name();
        let backup = self.backup_name();

        if !self.exists(&backup).await {
            return Err(DeployError::rollback(
                PLATFORM,
                format!("no backup container {} to restore", backup),
            ));
        }

        // The current instance may already be gone; only the restore must succeed.
        let _ = self.runner.run(&docker(["stop", name.as_str()])).await;
        let _ = self.runner.run(&docker(["rm", name.as_str()])).await;

        self.runner
            .run_checked(&docker(["start", backup.as_str()]))
            .await
            .rollback_step(PLATFORM)?;
        self.runner
            .run_checked(&docker(["rename", backup.as_str(), name.as_str()]))
            .await
            .rollback_step(PLATFORM)?;

        tracing::info!("Rollback completed: {} restored from {}", name, backup);

        Ok(
            DeploymentOutcome::succeeded(DeploymentId::rollback(), self.config.container.local_url())
                .with_container(name),
        )
    }

    async fn post_deploy(&self) -> Result<(), DeployError> {
        // Every keel-managed container carries the label key, including other
        // instances' backups, so only unmanaged stopped containers are pruned.
        let filter = format!("label!={}", INSTANCE_LABEL);
        self.runner
            .run_checked(&docker(["container", "prune", "-f", "--filter", filter.as_str()]))
            .await
            .deploy_step(PLATFORM)?;

        tracing::info!("Cleaned up old containers");
        Ok(())
    }
}
