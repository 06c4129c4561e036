// ABOUTME: End-to-end tests for the deployment pipeline.
// ABOUTME: Scripted platform tools, a mock HTTP server for health and notifications.

mod support;

use keel::config::{Artifact, ConfigLayer, DeploymentConfig, HealthCheckConfig};
use keel::deploy::ROLLBACK_UNSUPPORTED;
use keel::diagnostics::{Diagnostics, WarningKind};
use keel::error::{Error, RollbackStatus};
use keel::notify::{Notifier, Provenance, WebhookChannel};
use keel::pipeline::Pipeline;
use keel::process::{CommandRunner, ScriptedRunner};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A server that answers every request with `status`.
async fn serve(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

async fn posted_bodies(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.body_json().unwrap())
        .collect()
}

fn webhook_notifier(server: &MockServer) -> Notifier {
    Notifier::new("shop", "prod").with_channel(WebhookChannel::new(
        reqwest::Client::new(),
        Url::parse(&format!("{}/hook", server.uri())).unwrap(),
        Provenance::default(),
    ))
}

fn with_health(mut config: DeploymentConfig, url: &str) -> DeploymentConfig {
    config.health_check = Some(
        HealthCheckConfig::new(Url::parse(url).unwrap())
            .timeout(Duration::from_secs(30))
            .retry_delay(Duration::ZERO),
    );
    config
}

fn container_artifact() -> Artifact {
    Artifact::Container {
        image: "shop:1.4.2".to_string(),
    }
}

fn pipeline(config: DeploymentConfig, runner: Arc<ScriptedRunner>, notifier: Notifier) -> Pipeline {
    let runner: Arc<dyn CommandRunner> = runner;
    Pipeline::new(Arc::new(config), runner, notifier).unwrap()
}

fn silent() -> Notifier {
    Notifier::new("shop", "prod")
}

#[tokio::test]
async fn container_deploy_without_health_check_succeeds() {
    support::init_tracing();
    let runner = Arc::new(ScriptedRunner::new());
    let mut diag = Diagnostics::default();

    let report = pipeline(support::config(container_artifact()), runner.clone(), silent())
        .execute(&mut diag)
        .await
        .unwrap();

    assert!(report.outcome.success);
    assert_eq!(report.outcome.deployment_url, "http://localhost:80");
    assert!(report.health.healthy);
    assert_eq!(report.health.attempts, 0);
    assert!(!diag.has_warnings());
}

#[tokio::test]
async fn unhealthy_deploy_rolls_back_and_still_fails() {
    let health = serve(500).await;
    let runner = Arc::new(ScriptedRunner::new());
    let config = with_health(
        support::config(container_artifact()),
        &format!("{}/health", health.uri()),
    );

    let err = pipeline(config, runner.clone(), silent())
        .execute(&mut Diagnostics::default())
        .await
        .unwrap_err();

    match &err {
        Error::HealthCheckFailed { reason, rollback } => {
            assert!(reason.contains("HTTP 500"));
            assert_eq!(*rollback, RollbackStatus::Completed);
        }
        other => panic!("expected health check failure, got {other:?}"),
    }
    assert!(err.to_string().starts_with("Health check failed and rollback completed"));
    assert_eq!(health.received_requests().await.unwrap().len(), 5);
    assert!(
        runner
            .command_lines()
            .contains(&"docker rename shop-prod-backup shop-prod".to_string())
    );
}

#[tokio::test]
async fn unhealthy_deploy_without_rollback_policy() {
    let health = serve(503).await;
    let runner = Arc::new(ScriptedRunner::new());
    let mut config = with_health(support::config(container_artifact()), &health.uri());
    config.rollback_on_failure = false;

    let err = pipeline(config, runner.clone(), silent())
        .execute(&mut Diagnostics::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::HealthCheckFailed {
            rollback: RollbackStatus::Disabled,
            ..
        }
    ));
    assert!(
        !runner
            .command_lines()
            .iter()
            .any(|l| l.starts_with("docker start"))
    );
}

#[tokio::test]
async fn function_rollback_failure_is_reported() {
    let health = serve(500).await;
    let runner = Arc::new(ScriptedRunner::new());
    let dir = tempfile::tempdir().unwrap();
    let function = dir.path().join("serverless.yml");
    std::fs::write(&function, "service: shop\n").unwrap();
    let config = with_health(
        support::config(Artifact::Function { config: function }),
        &health.uri(),
    );

    let err = pipeline(config, runner, silent())
        .execute(&mut Diagnostics::default())
        .await
        .unwrap_err();

    match err {
        Error::HealthCheckFailed {
            rollback: RollbackStatus::Failed(message),
            ..
        } => assert_eq!(message, ROLLBACK_UNSUPPORTED),
        other => panic!("expected failed rollback, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_manifest_stops_before_deploy() {
    let runner = Arc::new(ScriptedRunner::new());
    let config = support::config(Artifact::Cluster {
        manifest: PathBuf::from("/does/not/exist/deployment.yml"),
    });

    let err = pipeline(config, runner.clone(), silent())
        .execute(&mut Diagnostics::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DeploymentFailed(_)));
    assert!(err.to_string().starts_with("Deployment failed: "));
    assert!(err.to_string().contains("/does/not/exist/deployment.yml"));
    assert_eq!(runner.command_lines(), vec!["kubectl version --client"]);
}

#[test]
fn invalid_environment_name_never_reaches_a_deployer() {
    let layer = ConfigLayer {
        environment: Some("invalid env name!".to_string()),
        platform: Some("container".to_string()),
        application: Some("shop".to_string()),
        github_token: Some("ghp_x".to_string()),
        image: Some("shop:1".to_string()),
        ..Default::default()
    };

    let err = DeploymentConfig::from_layer(layer).err().unwrap();

    assert!(err.to_string().contains(
        "Environment name can only contain alphanumeric characters, hyphens, and underscores"
    ));
}

#[tokio::test]
async fn notifications_bracket_the_deployment() {
    let hook = serve(200).await;
    let notifier = webhook_notifier(&hook);

    pipeline(
        support::config(container_artifact()),
        Arc::new(ScriptedRunner::new()),
        notifier,
    )
    .execute(&mut Diagnostics::default())
    .await
    .unwrap();

    let statuses: Vec<serde_json::Value> = posted_bodies(&hook)
        .await
        .into_iter()
        .map(|body| body["status"].clone())
        .collect();
    assert_eq!(statuses, vec!["started", "success"]);
}

#[tokio::test]
async fn failure_notification_carries_error() {
    let hook = serve(200).await;
    let notifier = webhook_notifier(&hook);
    let runner = Arc::new(ScriptedRunner::new().fail("docker run", "no space left on device"));

    pipeline(support::config(container_artifact()), runner, notifier)
        .execute(&mut Diagnostics::default())
        .await
        .unwrap_err();

    let bodies = posted_bodies(&hook).await;
    assert_eq!(bodies.len(), 2);
    let body = &bodies[1];
    assert_eq!(body["status"], "failed");
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("no space left on device")
    );
}

#[tokio::test]
async fn rejected_notifications_do_not_change_the_result() {
    let hook = serve(500).await;
    let notifier = webhook_notifier(&hook);
    let mut diag = Diagnostics::default();

    let report = pipeline(
        support::config(container_artifact()),
        Arc::new(ScriptedRunner::new()),
        notifier,
    )
    .execute(&mut diag)
    .await
    .unwrap();

    assert!(report.outcome.success);
    assert_eq!(diag.warnings().len(), 2);
    assert!(
        diag.warnings()
            .iter()
            .all(|w| w.kind == WarningKind::Notification)
    );
}

#[tokio::test]
async fn manual_rollback_without_backup_fails() {
    let runner = Arc::new(ScriptedRunner::new().fail(
        "docker container inspect shop-prod-backup",
        "No such container",
    ));

    let err = pipeline(support::config(container_artifact()), runner, silent())
        .rollback()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RollbackFailed(_)));
    assert!(err.to_string().contains("shop-prod-backup"));
}
