// ABOUTME: Deploy command implementation.
// ABOUTME: Runs the deployment pipeline and publishes CI step outputs.

use keel::config::{ConfigLayer, DeploymentConfig};
use keel::deploy::DeploymentCoordinator;
use keel::diagnostics::{Diagnostics, Warning};
use keel::error::{Error, Result};
use keel::health::HealthVerifier;
use keel::notify::{DeploymentEvent, Notifier, Provenance};
use keel::output::{Output, StepOutputs};
use keel::pipeline::{DeploymentReport, Pipeline};
use keel::process::{CommandRunner, ScriptedRunner, SystemRunner};
use std::path::Path;
use std::sync::Arc;

use super::file_layer;
use crate::cli::Settings;

/// Deploy and report the result to the calling CI step.
pub async fn deploy(
    config_path: Option<&Path>,
    settings: Settings,
    dry_run: bool,
    mut output: Output,
) -> Result<()> {
    output.start_timer();

    let flags = settings.into_layer();
    let result = match file_layer(config_path) {
        Ok(file) => {
            let layer = file.merge(flags);
            match DeploymentConfig::from_layer(layer.clone()) {
                Ok(config) => run(Arc::new(config), dry_run, &output).await,
                Err(e) => Err(announce_failure(&layer, e, dry_run, &output).await),
            }
        }
        Err(e) => Err(announce_failure(&flags, e, dry_run, &output).await),
    };

    let step_outputs = match &result {
        Ok(report) => StepOutputs::success(&report.outcome),
        Err(e) => StepOutputs::failure(&e.to_string()),
    };
    if !dry_run && let Err(e) = step_outputs.publish() {
        tracing::warn!("Could not write step outputs: {}", e);
    }

    let report = result?;
    output.success(&format!(
        "Deployed {} at {}",
        report.outcome.deployment_id, report.outcome.deployment_url
    ));
    Ok(())
}

/// Send a failure notice from whatever channels `layer` describes, then hand back `err`.
async fn announce_failure(
    layer: &ConfigLayer,
    err: Error,
    dry_run: bool,
    output: &Output,
) -> Error {
    if dry_run {
        return err;
    }

    let notifier = match Notifier::from_layer(layer, Provenance::from_env()) {
        Ok(notifier) => notifier,
        Err(e) => {
            tracing::warn!("Could not send failure notification: {}", e);
            return err;
        }
    };
    for failure in notifier.notify(DeploymentEvent::Failed(err.to_string())).await {
        output.warning(&Warning::from(failure).message);
    }
    err
}

async fn run(
    config: Arc<DeploymentConfig>,
    dry_run: bool,
    output: &Output,
) -> Result<DeploymentReport> {
    let mut diag = Diagnostics::default();

    output.progress(&format!(
        "Deploying {} to {} ({})",
        config.application,
        config.environment,
        config.platform()
    ));

    let result = if dry_run {
        dry_run_deploy(config, output, &mut diag).await
    } else {
        let notifier = Notifier::from_config(&config, Provenance::from_env())?;
        let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
        Pipeline::new(config, runner, notifier)?
            .execute(&mut diag)
            .await
    };

    // Emit collected warnings
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    result
}

/// Walk the pipeline against a recording runner; no health checks or notifications.
async fn dry_run_deploy(
    config: Arc<DeploymentConfig>,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<DeploymentReport> {
    let recorder = Arc::new(ScriptedRunner::new());
    let runner: Arc<dyn CommandRunner> = recorder.clone();
    let notifier = Notifier::new(
        config.application.to_string(),
        config.environment.to_string(),
    );

    let pipeline = Pipeline::from_parts(
        config.clone(),
        DeploymentCoordinator::new(config, runner),
        HealthVerifier::new(None)?,
        notifier,
    );
    let result = pipeline.execute(diag).await;

    for line in recorder.command_lines() {
        output.progress(&format!("  → {line}"));
    }

    result
}
