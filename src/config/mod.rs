// ABOUTME: Configuration types, loading, and validation for a deployment request.
// ABOUTME: Builds the immutable DeploymentConfig from merged file and CLI layers.

mod artifact;
mod container;
mod credentials;
mod deserialize;
mod healthcheck;
mod layer;
mod notifications;
mod platform;

pub use artifact::Artifact;
pub use container::{ContainerSettings, DEFAULT_CONTAINER_PORT, DEFAULT_HOST_PORT};
pub use credentials::CloudCredentials;
pub use healthcheck::{
    DEFAULT_HEALTH_TIMEOUT_SECS, DEFAULT_RETRY_DELAY, HealthCheckConfig, MAX_HEALTH_TIMEOUT_SECS,
    MIN_HEALTH_TIMEOUT_SECS, timeout_in_range,
};
pub use layer::{CONFIG_FILENAME, CONFIG_FILENAME_ALT, CONFIG_FILENAME_DIR, ConfigLayer};
pub use notifications::{NotificationConfig, SlackSettings};
pub use platform::Platform;

use crate::error::{Error, Result};
use crate::types::ResourceName;
use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// A validated deployment request. Built once per invocation and never mutated.
#[derive(Debug)]
pub struct DeploymentConfig {
    pub application: ResourceName,
    pub environment: ResourceName,
    pub artifact: Artifact,
    pub github_token: SecretString,
    pub health_check: Option<HealthCheckConfig>,
    pub rollback_on_failure: bool,
    pub notifications: NotificationConfig,
    pub credentials: CloudCredentials,
    pub container: ContainerSettings,
}

impl DeploymentConfig {
    /// Minimal valid config for `artifact`, used as a starting point by callers and tests.
    pub fn new(application: ResourceName, environment: ResourceName, artifact: Artifact) -> Self {
        DeploymentConfig {
            application,
            environment,
            artifact,
            github_token: SecretString::from(String::new()),
            health_check: None,
            rollback_on_failure: true,
            notifications: NotificationConfig::default(),
            credentials: CloudCredentials::default(),
            container: ContainerSettings::default(),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_layer(ConfigLayer::from_yaml(yaml)?)
    }

    pub fn platform(&self) -> Platform {
        self.artifact.platform()
    }

    /// `{app}-{env}`, the name shared by container instances and function stacks.
    pub fn instance_name(&self) -> String {
        format!("{}-{}", self.application, self.environment)
    }

    /// Validate a merged layer, reporting every problem at once.
    pub fn from_layer(layer: ConfigLayer) -> Result<Self> {
        let layer = layer.normalized();
        let mut errors = Vec::new();

        let environment = required(&mut errors, layer.environment, "Environment is required");
        let platform = required(&mut errors, layer.platform, "Platform is required");
        let application =
            required(&mut errors, layer.application, "Application name is required");
        let github_token = required(&mut errors, layer.github_token, "GitHub token is required");

        let platform = platform.and_then(|p| match p.parse::<Platform>() {
            Ok(platform) => Some(platform),
            Err(e) => {
                errors.push(e.to_string());
                None
            }
        });

        let artifact = platform.and_then(|platform| {
            select_artifact(
                &mut errors,
                platform,
                layer.image,
                layer.manifest,
                layer.function_config,
            )
        });

        let environment = environment.and_then(|e| {
            validated_name(
                &mut errors,
                &e,
                "Environment name can only contain alphanumeric characters, hyphens, and underscores",
            )
        });
        let application = application.and_then(|a| {
            validated_name(
                &mut errors,
                &a,
                "Application name can only contain alphanumeric characters, hyphens, and underscores",
            )
        });

        if let Some(secs) = layer.health_check_timeout
            && !timeout_in_range(secs)
        {
            errors.push(format!(
                "Health check timeout must be between {} and {} seconds",
                MIN_HEALTH_TIMEOUT_SECS, MAX_HEALTH_TIMEOUT_SECS
            ));
        }

        let health_url = layer
            .health_check_url
            .and_then(|u| validated_url(&mut errors, &u, "Health check URL is not valid"));
        let webhook = layer.notification_webhook.and_then(|u| {
            validated_url(&mut errors, &u, "Notification webhook URL is not valid")
        });

        let (Some(application), Some(environment), Some(artifact), Some(github_token)) =
            (application, environment, artifact, github_token)
        else {
            return Err(Error::InvalidConfig(errors));
        };
        if !errors.is_empty() {
            return Err(Error::InvalidConfig(errors));
        }

        let health_check = health_url.map(|url| {
            HealthCheckConfig::new(url)
                .timeout(Duration::from_secs(
                    layer
                        .health_check_timeout
                        .unwrap_or(DEFAULT_HEALTH_TIMEOUT_SECS),
                ))
                .retry_delay(layer.health_check_retry_delay.unwrap_or(DEFAULT_RETRY_DELAY))
        });

        let slack = match (layer.slack_token, layer.slack_channel) {
            (Some(token), Some(channel)) => Some(SlackSettings {
                token: SecretString::from(token),
                channel,
            }),
            _ => None,
        };

        let defaults = ContainerSettings::default();

        Ok(DeploymentConfig {
            application,
            environment,
            artifact,
            github_token: SecretString::from(github_token),
            health_check,
            rollback_on_failure: layer.rollback_on_failure.unwrap_or(true),
            notifications: NotificationConfig { webhook, slack },
            credentials: CloudCredentials {
                region: layer.aws_region,
                access_key_id: layer.aws_access_key_id,
                secret_access_key: layer.aws_secret_access_key.map(SecretString::from),
            },
            container: ContainerSettings {
                host_port: layer.host_port.unwrap_or(defaults.host_port),
                container_port: layer.container_port.unwrap_or(defaults.container_port),
            },
        })
    }
}

fn required(errors: &mut Vec<String>, value: Option<String>, message: &str) -> Option<String> {
    if value.is_none() {
        errors.push(message.to_string());
    }
    value
}

fn validated_name(errors: &mut Vec<String>, value: &str, message: &str) -> Option<ResourceName> {
    match ResourceName::new(value) {
        Ok(name) => Some(name),
        Err(_) => {
            errors.push(message.to_string());
            None
        }
    }
}

fn validated_url(errors: &mut Vec<String>, value: &str, message: &str) -> Option<Url> {
    match Url::parse(value) {
        Ok(url) => Some(url),
        Err(_) => {
            errors.push(message.to_string());
            None
        }
    }
}

/// Pick the artifact reference for `platform`; any other reference is a mistake.
fn select_artifact(
    errors: &mut Vec<String>,
    platform: Platform,
    image: Option<String>,
    manifest: Option<String>,
    function_config: Option<String>,
) -> Option<Artifact> {
    let mut stray = |field: &str, value: &Option<String>, owner: Platform| {
        if value.is_some() && owner != platform {
            errors.push(format!(
                "Artifact reference '{}' does not apply to {} deployment",
                field, platform
            ));
        }
    };
    stray("image", &image, Platform::Container);
    stray("manifest", &manifest, Platform::Cluster);
    stray("function_config", &function_config, Platform::Function);

    let artifact = match platform {
        Platform::Container => image.map(|image| Artifact::Container { image }),
        Platform::Cluster => manifest.map(|m| Artifact::Cluster {
            manifest: PathBuf::from(m),
        }),
        Platform::Function => function_config.map(|c| Artifact::Function {
            config: PathBuf::from(c),
        }),
    };

    if artifact.is_none() {
        errors.push(match platform {
            Platform::Container => "Docker image is required for container deployment",
            Platform::Cluster => "Kubernetes manifest is required for cluster deployment",
            Platform::Function => "Serverless config is required for function deployment",
        }
        .to_string());
    }

    artifact
}
