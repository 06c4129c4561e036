// ABOUTME: Function-as-a-service deployer driving the serverless CLI.
// ABOUTME: Credentials reach the child process only; rollback is reported as unsupported.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::config::{Artifact, DeploymentConfig, Platform};
use crate::process::{CommandRunner, CommandSpec};
use crate::types::DeploymentId;

use super::error::ProcessErrorExt;
use super::{DeployError, Deployer, DeploymentOutcome};

/// Domain used for the conventional endpoint when the tool output has none.
pub const PROVIDER_DOMAIN: &str = "amazonaws.com";

/// Diagnostic carried by every function rollback outcome.
pub const ROLLBACK_UNSUPPORTED: &str =
    "Serverless rollback not implemented - manual intervention required";

const PLATFORM: Platform = Platform::Function;

/// Deploys a function stack for stage `{env}`.
pub struct FunctionDeployer {
    config: Arc<DeploymentConfig>,
    runner: Arc<dyn CommandRunner>,
}

fn serverless<I, S>(args: I) -> CommandSpec
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    CommandSpec::new("serverless", args)
}

impl FunctionDeployer {
    pub fn new(config: Arc<DeploymentConfig>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    fn function_config(&self) -> Result<&Path, DeployError> {
        match &self.config.artifact {
            Artifact::Function { config } if !config.as_os_str().is_empty() => Ok(config),
            _ => Err(DeployError::Configuration(
                "Serverless config is required for function deployment".to_string(),
            )),
        }
    }

    pub fn conventional_url(&self) -> String {
        format!("https://{}.{}", self.config.instance_name(), PROVIDER_DOMAIN)
    }

    fn deploy_command(&self, config_path: &Path) -> CommandSpec {
        let path = config_path.to_string_lossy().into_owned();
        let stage = self.config.environment.to_string();
        let mut spec = serverless([
            "deploy",
            "--config",
            path.as_str(),
            "--stage",
            stage.as_str(),
            "--verbose",
        ]);

        let credentials = &self.config.credentials;
        if let Some((key_id, secret)) = credentials.key_pair() {
            spec = spec
                .env("AWS_ACCESS_KEY_ID", key_id)
                .env("AWS_SECRET_ACCESS_KEY", secret);
        }
        if let Some(region) = &credentials.region {
            spec = spec.env("AWS_REGION", region);
        }
        spec
    }
}

/// First HTTPS endpoint printed by the deploy command.
pub fn endpoint_from_output(output: &str) -> Option<String> {
    output
        .split_whitespace()
        .find(|token| token.starts_with("https://"))
        .map(|token| token.trim_end_matches([',', ';', ')', '"', '\'']).to_string())
}

#[async_trait]
impl Deployer for FunctionDeployer {
    fn platform(&self) -> Platform {
        PLATFORM
    }

    async fn validate(&self) -> Result<(), DeployError> {
        let config_path = self.function_config()?;

        self.runner
            .run_checked(&serverless(["--version"]))
            .await
            .map_err(|e| DeployError::tool_unavailable("serverless", e))?;
        tracing::info!("Serverless framework validated");

        if !tokio::fs::try_exists(config_path).await.unwrap_or(false) {
            return Err(DeployError::ArtifactNotFound(format!(
                "Serverless config file not found: {}",
                config_path.display()
            )));
        }

        Ok(())
    }

    async fn deploy(&self) -> Result<DeploymentOutcome, DeployError> {
        let config_path = self.function_config()?;
        let deployment_id = DeploymentId::generate(&self.config.application);

        let output = self
            .runner
            .run_checked(&self.deploy_command(config_path))
            .await
            .deploy_step(PLATFORM)?;
        tracing::info!("Serverless deployment completed successfully");

        let url = endpoint_from_output(&output.stdout).unwrap_or_else(|| {
            tracing::debug!("No endpoint in serverless output, using conventional URL");
            self.conventional_url()
        });

        Ok(DeploymentOutcome::succeeded(deployment_id, url))
    }

    async fn rollback(&self) -> Result<DeploymentOutcome, DeployError> {
        tracing::warn!("{}", ROLLBACK_UNSUPPORTED);
        Ok(DeploymentOutcome::failed(ROLLBACK_UNSUPPORTED))
    }

    async fn post_deploy(&self) -> Result<(), DeployError> {
        tracing::info!("Serverless post-deployment tasks completed");
        Ok(())
    }
}
