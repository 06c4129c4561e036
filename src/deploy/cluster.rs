// ABOUTME: Orchestrated-cluster deployer driving kubectl.
// ABOUTME: Applies the manifest, waits for the rollout, and rolls back with `rollout undo`.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::{Artifact, DeploymentConfig, Platform};
use crate::process::{CommandRunner, CommandSpec, ProcessError};
use crate::types::DeploymentId;

use super::error::ProcessErrorExt;
use super::{DeployError, Deployer, DeploymentOutcome};

/// Bound on waiting for a rollout to become ready.
pub const ROLLOUT_TIMEOUT: &str = "300s";

/// Cluster-internal DNS suffix used to derive the service URL.
pub const CLUSTER_DOMAIN: &str = "svc.cluster.local";

/// Replica-set revisions retained by cleanup: the current one and one to roll back to.
pub const KEPT_REVISIONS: usize = 2;

const REVISION_ANNOTATION: &str = "deployment.kubernetes.io/revision";
const PLATFORM: Platform = Platform::Cluster;

/// Deploys the workload `deployment/{app}` from a manifest file.
pub struct ClusterDeployer {
    config: Arc<DeploymentConfig>,
    runner: Arc<dyn CommandRunner>,
}

fn kubectl<I, S>(args: I) -> CommandSpec
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    CommandSpec::new("kubectl", args)
}

impl ClusterDeployer {
    pub fn new(config: Arc<DeploymentConfig>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    fn manifest(&self) -> Result<&Path, DeployError> {
        match &self.config.artifact {
            Artifact::Cluster { manifest } if !manifest.as_os_str().is_empty() => Ok(manifest),
            _ => Err(DeployError::Configuration(
                "Kubernetes manifest is required for cluster deployment".to_string(),
            )),
        }
    }

    fn workload(&self) -> String {
        format!("deployment/{}", self.config.application)
    }

    pub fn service_url(&self) -> String {
        format!(
            "http://{}.{}.{}",
            self.config.application, self.config.environment, CLUSTER_DOMAIN
        )
    }

    async fn wait_for_rollout(&self) -> Result<(), ProcessError> {
        let workload = self.workload();
        let timeout = format!("--timeout={}", ROLLOUT_TIMEOUT);
        self.runner
            .run_checked(&kubectl([
                "rollout",
                "status",
                workload.as_str(),
                timeout.as_str(),
            ]))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl Deployer for ClusterDeployer {
    fn platform(&self) -> Platform {
        PLATFORM
    }

    async fn validate(&self) -> Result<(), DeployError> {
        let manifest = self.manifest()?;

        self.runner
            .run_checked(&kubectl(["version", "--client"]))
            .await
            .map_err(|e| DeployError::tool_unavailable("kubectl", e))?;
        tracing::info!("kubectl validated");

        if !tokio::fs::try_exists(manifest).await.unwrap_or(false) {
            return Err(DeployError::ArtifactNotFound(format!(
                "Kubernetes manifest file not found: {}",
                manifest.display()
            )));
        }

        Ok(())
    }

    async fn deploy(&self) -> Result<DeploymentOutcome, DeployError> {
        let manifest = self.manifest()?;
        let deployment_id = DeploymentId::generate(&self.config.application);

        let manifest_arg = manifest.to_string_lossy().into_owned();
        self.runner
            .run_checked(&kubectl(["apply", "-f", manifest_arg.as_str()]))
            .await
            .deploy_step(PLATFORM)?;
        tracing::info!("Kubernetes manifest applied successfully");

        self.wait_for_rollout().await.deploy_step(PLATFORM)?;
        tracing::info!("{} is ready", self.workload());

        Ok(DeploymentOutcome::succeeded(deployment_id, self.service_url()))
    }

    async fn rollback(&self) -> Result<DeploymentOutcome, DeployError> {
        let workload = self.workload();

        self.runner
            .run_checked(&kubectl(["rollout", "undo", workload.as_str()]))
            .await
            .rollback_step(PLATFORM)?;
        self.wait_for_rollout().await.rollback_step(PLATFORM)?;

        tracing::info!("Kubernetes rollback completed successfully");

        Ok(DeploymentOutcome::succeeded(
            DeploymentId::rollback(),
            self.service_url(),
        ))
    }

    async fn post_deploy(&self) -> Result<(), DeployError> {
        let selector = format!("app={}", self.config.application);
        let output = self
            .runner
            .run_checked(&kubectl(["get", "rs", "-l", selector.as_str(), "-o", "json"]))
            .await
            .deploy_step(PLATFORM)?;

        if output.stdout.trim().is_empty() {
            tracing::debug!("Replica set listing was empty");
            return Ok(());
        }

        let list: ReplicaSetList =
            serde_json::from_str(&output.stdout).map_err(|e| DeployError::Deployment {
                platform: PLATFORM,
                message: format!("unreadable replica set listing: {}", e),
            })?;

        let stale = stale_replica_sets(list);
        if stale.is_empty() {
            tracing::debug!("No old replica sets to clean up");
            return Ok(());
        }

        let mut args = vec!["delete".to_string(), "rs".to_string()];
        args.extend(stale.iter().cloned());
        self.runner
            .run_checked(&kubectl(args))
            .await
            .deploy_step(PLATFORM)?;

        tracing::info!("Cleaned up {} old replica set(s)", stale.len());
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ReplicaSetList {
    #[serde(default)]
    items: Vec<ReplicaSet>,
}

#[derive(Debug, Deserialize)]
struct ReplicaSet {
    metadata: ReplicaSetMetadata,
    #[serde(default)]
    spec: ReplicaSetSpec,
}

#[derive(Debug, Deserialize)]
struct ReplicaSetMetadata {
    name: String,
    #[serde(default)]
    annotations: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct ReplicaSetSpec {
    replicas: Option<u32>,
}

impl ReplicaSet {
    fn revision(&self) -> u64 {
        self.metadata
            .annotations
            .get(REVISION_ANNOTATION)
            .and_then(|r| r.parse().ok())
            .unwrap_or(0)
    }
}

/// Scaled-down replica sets older than the retained revisions.
fn stale_replica_sets(list: ReplicaSetList) -> Vec<String> {
    let mut items = list.items;
    items.sort_by_key(|rs| std::cmp::Reverse(rs.revision()));
    items
        .into_iter()
        .skip(KEPT_REVISIONS)
        .filter(|rs| rs.spec.replicas == Some(0))
        .map(|rs| rs.metadata.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::DeployErrorKind;
    use crate::process::{CommandOutput, ScriptedRunner};
    use crate::types::ResourceName;
    use std::path::PathBuf;

    fn deployer_with(runner: Arc<ScriptedRunner>, manifest: &str) -> ClusterDeployer {
        let config = DeploymentConfig::new(
            ResourceName::new("shop").unwrap(),
            ResourceName::new("prod").unwrap(),
            Artifact::Cluster {
                manifest: PathBuf::from(manifest),
            },
        );
        ClusterDeployer::new(Arc::new(config), runner)
    }

    #[tokio::test]
    async fn validate_names_missing_manifest_path() {
        let runner = Arc::new(ScriptedRunner::new());
        let err = deployer_with(runner, "/nonexistent/k8s/shop.yml")
            .validate()
            .await
            .unwrap_err();

        assert_eq!(err.kind(), DeployErrorKind::ArtifactNotFound);
        assert_eq!(
            err.to_string(),
            "Kubernetes manifest file not found: /nonexistent/k8s/shop.yml"
        );
    }

    #[tokio::test]
    async fn validate_reports_missing_kubectl() {
        let runner = Arc::new(ScriptedRunner::new().missing("kubectl"));
        let err = deployer_with(runner, "shop.yml").validate().await.unwrap_err();
        assert_eq!(err.kind(), DeployErrorKind::ToolUnavailable);
    }

    #[tokio::test]
    async fn validate_passes_with_existing_manifest() {
        let manifest = tempfile::NamedTempFile::new().unwrap();
        let runner = Arc::new(ScriptedRunner::new());
        deployer_with(runner.clone(), manifest.path().to_str().unwrap())
            .validate()
            .await
            .unwrap();

        assert_eq!(runner.command_lines(), vec!["kubectl version --client"]);
    }

    #[tokio::test]
    async fn deploy_applies_and_waits_for_rollout() {
        let runner = Arc::new(ScriptedRunner::new());
        let outcome = deployer_with(runner.clone(), "k8s/shop.yml")
            .deploy()
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.deployment_url, "http://shop.prod.svc.cluster.local");
        assert_eq!(
            runner.command_lines(),
            vec![
                "kubectl apply -f k8s/shop.yml",
                "kubectl rollout status deployment/shop --timeout=300s",
            ]
        );
    }

    #[tokio::test]
    async fn rollout_timeout_fails_deploy() {
        let runner = Arc::new(
            ScriptedRunner::new().fail("kubectl rollout status", "timed out waiting for the condition"),
        );
        let err = deployer_with(runner, "k8s/shop.yml").deploy().await.unwrap_err();

        assert_eq!(err.kind(), DeployErrorKind::Deployment);
        assert!(err.to_string().contains("timed out waiting"));
    }

    #[tokio::test]
    async fn rollback_undoes_and_waits() {
        let runner = Arc::new(ScriptedRunner::new());
        let outcome = deployer_with(runner.clone(), "k8s/shop.yml")
            .rollback()
            .await
            .unwrap();

        assert!(outcome.deployment_id.as_str().starts_with("rollback-"));
        assert_eq!(
            runner.command_lines(),
            vec![
                "kubectl rollout undo deployment/shop",
                "kubectl rollout status deployment/shop --timeout=300s",
            ]
        );
    }

    #[tokio::test]
    async fn rollback_without_history_is_a_rollback_error() {
        let runner = Arc::new(
            ScriptedRunner::new().fail("kubectl rollout undo", "no rollout history found"),
        );
        let err = deployer_with(runner, "k8s/shop.yml").rollback().await.unwrap_err();

        assert_eq!(err.kind(), DeployErrorKind::Rollback);
        assert!(err.to_string().contains("no rollout history found"));
    }

    fn replica_set(name: &str, revision: u64, replicas: u32) -> serde_json::Value {
        serde_json::json!({
            "metadata": {
                "name": name,
                "annotations": { "deployment.kubernetes.io/revision": revision.to_string() }
            },
            "spec": { "replicas": replicas }
        })
    }

    #[tokio::test]
    async fn cleanup_deletes_scaled_down_sets_beyond_rollback_generation() {
        let listing = serde_json::json!({
            "items": [
                replica_set("shop-1", 1, 0),
                replica_set("shop-4", 4, 3),
                replica_set("shop-2", 2, 0),
                replica_set("shop-3", 3, 0),
            ]
        });
        let runner = Arc::new(
            ScriptedRunner::new().respond("kubectl get rs", CommandOutput::ok(listing.to_string())),
        );

        deployer_with(runner.clone(), "k8s/shop.yml")
            .post_deploy()
            .await
            .unwrap();

        assert_eq!(
            runner.command_lines(),
            vec![
                "kubectl get rs -l app=shop -o json",
                "kubectl delete rs shop-2 shop-1",
            ]
        );
    }

    #[tokio::test]
    async fn cleanup_with_nothing_stale_deletes_nothing() {
        let listing = serde_json::json!({
            "items": [replica_set("shop-2", 2, 3), replica_set("shop-1", 1, 0)]
        });
        let runner = Arc::new(
            ScriptedRunner::new().respond("kubectl get rs", CommandOutput::ok(listing.to_string())),
        );

        deployer_with(runner.clone(), "k8s/shop.yml")
            .post_deploy()
            .await
            .unwrap();

        assert_eq!(runner.calls().len(), 1);
    }
}
